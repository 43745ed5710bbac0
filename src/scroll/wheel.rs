use crate::animation::{Animated, Ease};
use crate::dom::{Document, DomEvent, ElementRef};
use crate::scroll::{LoaderFade, ScrollAnimator};
use web_time::Instant;

/// Turns wheel input into a stepped progress.
///
/// Wheel events only record a direction. Once per frame, if any wheel event arrived since
/// the previous frame, the step moves by one in that direction. The step never leaves
/// `[0, step_max]`.
///
/// ```
/// # use showroom::scroll::WheelStepper;
/// let mut stepper = WheelStepper::new(1000);
/// stepper.on_wheel(-3.0);
/// assert_eq!(stepper.frame(), None); // already at the top
///
/// stepper.on_wheel(12.0);
/// stepper.on_wheel(8.0);
/// assert_eq!(stepper.frame(), Some(0.001)); // one step per frame, not per event
/// assert_eq!(stepper.frame(), None);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WheelStepper {
    counter: u64,
    prev_counter: u64,
    direction: i8,
    step: u32,
    step_max: u32,
}

impl Default for WheelStepper {
    fn default() -> Self {
        WheelStepper::new(WheelStepper::DEFAULT_STEP_MAX)
    }
}

impl WheelStepper {
    pub const DEFAULT_STEP_MAX: u32 = 1000;

    pub fn new(step_max: u32) -> Self {
        WheelStepper {
            counter: 0,
            prev_counter: 0,
            direction: 1,
            step: 0,
            step_max,
        }
    }

    /// Records a wheel event. A zero delta keeps the previous direction.
    pub fn on_wheel(&mut self, delta_y: f32) {
        self.counter += 1;

        if delta_y > 0.0 {
            self.direction = 1;
        } else if delta_y < 0.0 {
            self.direction = -1;
        }
    }

    /// Advances by one step if the wheel moved since the last frame. Returns the new
    /// progress if the step changed.
    pub fn frame(&mut self) -> Option<f32> {
        let moved = self.counter != self.prev_counter;
        self.prev_counter = self.counter;

        if !moved {
            return None;
        }

        let step = if self.direction > 0 {
            (self.step + 1).min(self.step_max)
        } else {
            self.step.saturating_sub(1)
        };

        if step == self.step {
            return None;
        }

        self.step = step;
        Some(self.progress())
    }

    #[inline]
    pub fn step(&self) -> u32 {
        self.step
    }

    #[inline]
    pub fn step_max(&self) -> u32 {
        self.step_max
    }

    /// `step / step_max`, in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.step_max == 0 {
            0.0
        } else {
            self.step as f32 / self.step_max as f32
        }
    }
}

/// Translates a container of full-height sections with the wheel.
///
/// The container moves up by `progress * 100` percent of its height, easing to each new
/// position over 0.3 s.
#[derive(Debug)]
pub struct ContainerScroller {
    stepper: WheelStepper,
    container: ElementRef,
    y_percent: Animated<f32>,
    loader: Option<LoaderFade>,
}

impl ContainerScroller {
    pub const CONTAINER_SELECTOR: &'static str = ".js-spline-sections";
    pub const DURATION: f32 = 0.3;

    pub fn new(container: ElementRef, stepper: WheelStepper) -> Self {
        ContainerScroller {
            stepper,
            container,
            y_percent: Animated::new(0.0),
            loader: None,
        }
    }

    /// Binds to the `.js-spline-sections` container, if the page has one, and to its
    /// `.js-spline-loader` overlay.
    pub fn from_document(document: &dyn Document) -> Option<Self> {
        let container = document.query_selector(Self::CONTAINER_SELECTOR)?;
        let mut scroller = ContainerScroller::new(container, WheelStepper::default());
        scroller.loader = LoaderFade::from_document(document);
        Some(scroller)
    }

    pub fn loader(&self) -> Option<&LoaderFade> {
        self.loader.as_ref()
    }

    pub fn stepper(&self) -> &WheelStepper {
        &self.stepper
    }

    /// The current translation, in percent of the container height.
    pub fn y_percent(&self) -> f32 {
        *self.y_percent.value()
    }
}

impl ScrollAnimator for ContainerScroller {
    fn handle_event(&mut self, event: &DomEvent, _: &dyn Document, _: Instant) {
        if let DomEvent::Wheel { delta_y } = event {
            self.stepper.on_wheel(*delta_y);
        }
    }

    fn mark_loaded(&mut self, player: usize, now: Instant) {
        if let Some(loader) = &mut self.loader {
            loader.mark_loaded(player, now);
        }
    }

    fn update(&mut self, now: Instant) -> bool {
        let loader = self
            .loader
            .as_mut()
            .map_or(false, |loader| loader.update(now));

        if let Some(progress) = self.stepper.frame() {
            self.y_percent
                .animate_to(-progress * 100.0, Self::DURATION, Ease::PowerOut(0), now);
        }

        if !self.y_percent.update(now) {
            return loader;
        }

        self.container.set_style(
            "transform",
            &format!("translate(0%, {}%)", self.y_percent.value()),
        );
        true
    }
}
