use crate::animation::{Ease, Position, ScrollTrigger, Timeline, Tween};
use crate::camera::CameraView;
use crate::dom::{Document, DomEvent, ElementRef};
use crate::scroll::ScrollAnimator;
use glamx::Vec3;
use web_time::Instant;

const POSITION: usize = 0;
const TARGET: usize = 1;

struct ViewSection {
    element: ElementRef,
    trigger: ScrollTrigger,
    timeline: Timeline<Vec3>,
}

/// Moves a camera through a sequence of views as the page scrolls.
///
/// Each view is bound to a page section. While that section scrolls from its top
/// reaching the top of the viewport to its bottom reaching it, the camera travels from
/// the previous view to this one. Before the first section starts, the camera stays at
/// the initial view.
pub struct CameraPathAnimator {
    initial: CameraView,
    sections: Vec<ViewSection>,
    view: CameraView,
    dirty: bool,
}

impl CameraPathAnimator {
    /// Duration of a view's tweens inside its timeline.
    pub const DURATION: f32 = 0.5;

    pub fn new(initial: CameraView) -> Self {
        CameraPathAnimator {
            initial,
            sections: Vec::new(),
            view: initial,
            dirty: false,
        }
    }

    /// The class naming the section of the view at index `key`.
    pub fn section_selector(key: usize) -> String {
        format!(".js-webgi-camera-view-{}", key)
    }

    /// Binds each of `views` to its `.js-webgi-camera-view-{index}` section. Views without
    /// a section are skipped.
    pub fn from_document(
        document: &dyn Document,
        initial: CameraView,
        views: &[CameraView],
    ) -> Self {
        let mut result = CameraPathAnimator::new(initial);

        for (key, view) in views.iter().enumerate() {
            match document.query_selector(&Self::section_selector(key)) {
                Some(section) => result.add_view(section, *view),
                None => log::debug!("No section for camera view {}.", key),
            }
        }

        result.measure(document);
        let _ = result.on_scroll(document.scroll_y());
        result
    }

    /// Appends a view reached at the end of `section`.
    pub fn add_view(&mut self, section: ElementRef, view: CameraView) {
        let from = self
            .sections
            .last()
            .map(|s| end_view(&s.timeline))
            .unwrap_or(self.initial);

        let mut timeline = Timeline::new();
        let _ = timeline.add_label("start");
        let tween = |from: Vec3, to: Vec3| {
            Tween::new(from, to, Self::DURATION).with_ease(Ease::PowerOut(1))
        };
        let _ = timeline.add(
            POSITION,
            tween(from.position, view.position),
            Position::Label("start".to_string()),
        );
        let _ = timeline.add(
            TARGET,
            tween(from.target, view.target),
            Position::Label("start".to_string()),
        );

        let trigger = match ScrollTrigger::parse("top top", "bottom top") {
            Ok(trigger) => trigger,
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        };

        self.sections.push(ViewSection {
            element: section,
            trigger,
            timeline,
        });
    }

    pub fn num_views(&self) -> usize {
        self.sections.len()
    }

    /// The current camera view.
    pub fn view(&self) -> CameraView {
        self.view
    }

    /// Recomputes the section ranges from the page layout.
    pub fn measure(&mut self, document: &dyn Document) {
        let scroll_y = document.scroll_y();
        let (_, viewport_height) = document.viewport_size();

        for section in &mut self.sections {
            let rect = section.element.bounding_rect();
            section
                .trigger
                .measure(rect.top + scroll_y, rect.height, viewport_height);
        }
    }

    /// Applies a new scroll position. The last section that has started drives the
    /// camera. Returns `true` if the view changed.
    pub fn on_scroll(&mut self, scroll_y: f32) -> bool {
        let mut view = self.initial;

        for section in &mut self.sections {
            let _ = section.trigger.update(scroll_y);
            let progress = section.trigger.progress();

            if progress > 0.0 {
                section.timeline.seek(progress);
                view = current_view(&section.timeline, view);
            }
        }

        if view != self.view {
            self.view = view;
            self.dirty = true;
            true
        } else {
            false
        }
    }
}

fn current_view(timeline: &Timeline<Vec3>, fallback: CameraView) -> CameraView {
    let time = timeline.time();
    CameraView {
        position: timeline.sample(POSITION, time).unwrap_or(fallback.position),
        target: timeline.sample(TARGET, time).unwrap_or(fallback.target),
    }
}

fn end_view(timeline: &Timeline<Vec3>) -> CameraView {
    let end = timeline.duration();
    CameraView {
        position: timeline.sample(POSITION, end).unwrap_or_default(),
        target: timeline.sample(TARGET, end).unwrap_or_default(),
    }
}

impl ScrollAnimator for CameraPathAnimator {
    fn handle_event(&mut self, event: &DomEvent, document: &dyn Document, _: Instant) {
        match event {
            DomEvent::Scroll => {
                let _ = self.on_scroll(document.scroll_y());
            }
            DomEvent::Resize => {
                self.measure(document);
                let _ = self.on_scroll(document.scroll_y());
            }
            _ => {}
        }
    }

    fn update(&mut self, _: Instant) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
