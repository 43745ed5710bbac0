use crate::animation::{Ease, Position, ScrollTrigger, Timeline, Tween};
use crate::dom::{Document, DomEvent, ElementRef};
use crate::error::ConfigError;
use crate::scroll::{
    AnimationPlayer, LoaderFade, PlayerStyle, ScrollAnimator, StyleVars, MODEL_SELECTOR, SECTION_SELECTOR,
};
use web_time::Instant;

/// `[from, to]` keyframes, as authored in `data-in` and `data-out`.
pub type Keyframes = [StyleVars; 2];

struct KeyframeSection {
    element: ElementRef,
    player: usize,
    trigger: ScrollTrigger,
    timeline: Timeline<PlayerStyle>,
}

/// Scrubs per-section keyframe animations of animation players with the scroll position.
///
/// Every section animates one player in, then out, while it crosses the viewport (from
/// its top reaching the viewport bottom to its bottom reaching the viewport top). The
/// animation follows the scroll position directly. The first player starts visible and
/// the others start hidden.
pub struct KeyframeSectionAnimator<P> {
    players: Vec<P>,
    sections: Vec<KeyframeSection>,
    dirty: bool,
    loader: Option<LoaderFade>,
}

impl<P: AnimationPlayer> KeyframeSectionAnimator<P> {
    pub const IN_DURATION: f32 = 0.4;
    pub const OUT_DURATION: f32 = 0.4;
    pub const OUT_DELAY: f32 = 0.2;

    pub fn new(mut players: Vec<P>) -> Self {
        for (i, player) in players.iter_mut().enumerate() {
            if i == 0 {
                player.set_style(&PlayerStyle::default());
            } else {
                player.set_style(&PlayerStyle::hidden());
            }
        }

        KeyframeSectionAnimator {
            players,
            sections: Vec::new(),
            dirty: false,
            loader: None,
        }
    }

    /// Binds the `.js-spline-model` players of the page to its `.js-spline-model-section`
    /// sections, which name their player with a 1-based `data-model` and carry their
    /// keyframes in `data-in` and `data-out`.
    ///
    /// Sections with missing or malformed attributes are skipped with a warning. The
    /// `.js-spline-loader` overlay, if any, fades out once the first player has loaded.
    /// Returns `None` if the page has no player or no section.
    pub fn from_document(
        document: &dyn Document,
        make_player: impl FnMut(ElementRef) -> P,
    ) -> Option<Self> {
        let models = document.query_selector_all(MODEL_SELECTOR);
        let sections = document.query_selector_all(SECTION_SELECTOR);

        if models.is_empty() || sections.is_empty() {
            return None;
        }

        let mut result = KeyframeSectionAnimator::new(models.into_iter().map(make_player).collect());
        result.loader = LoaderFade::from_document(document);

        for section in sections {
            match parse_section(&section) {
                Ok((player, animation_in, animation_out)) => {
                    result.add_section(section, player, animation_in, animation_out)
                }
                Err(e) => log::warn!("Skipping keyframe section: {}", e),
            }
        }

        result.measure(document);
        result.on_scroll(document.scroll_y());
        Some(result)
    }

    /// Adds a section animating the player at index `player` with the given in and out
    /// keyframes.
    pub fn add_section(
        &mut self,
        element: ElementRef,
        player: usize,
        animation_in: Keyframes,
        animation_out: Keyframes,
    ) {
        let Some(base) = self.players.get(player).map(|p| p.style()) else {
            log::warn!("Ignoring a section bound to missing player {}.", player + 1);
            return;
        };

        let in_from = animation_in[0].apply(&base);
        let in_to = animation_in[1].apply(&in_from);
        let out_from = animation_out[0].apply(&in_to);
        let out_to = animation_out[1].apply(&out_from);

        let mut timeline = Timeline::new();
        let _ = timeline.add(
            0,
            Tween::new(in_from, in_to, Self::IN_DURATION).with_ease(Ease::PowerOut(0)),
            Position::End,
        );
        let _ = timeline.add(
            0,
            Tween::new(out_from, out_to, Self::OUT_DURATION)
                .with_delay(Self::OUT_DELAY)
                .with_ease(Ease::PowerIn(0)),
            Position::End,
        );

        let trigger = match ScrollTrigger::parse("top bottom", "bottom top") {
            Ok(trigger) => trigger,
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        };

        self.sections.push(KeyframeSection {
            element,
            player,
            trigger,
            timeline,
        });
    }

    pub fn player(&self, index: usize) -> Option<&P> {
        self.players.get(index)
    }

    pub fn loader(&self) -> Option<&LoaderFade> {
        self.loader.as_ref()
    }

    pub fn num_sections(&self) -> usize {
        self.sections.len()
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

    /// Applies a new scroll position. Sections whose progress changed render their
    /// timeline onto their player, in document order.
    pub fn on_scroll(&mut self, scroll_y: f32) {
        for section in &mut self.sections {
            let before = section.trigger.progress();
            let _ = section.trigger.update(scroll_y);
            let progress = section.trigger.progress();

            if progress != before {
                section.timeline.seek(progress);
                if let Some((_, style)) = section.timeline.values().into_iter().next() {
                    self.players[section.player].set_style(&style);
                    self.dirty = true;
                }
            }
        }
    }
}

fn parse_section(section: &ElementRef) -> Result<(usize, Keyframes, Keyframes), ConfigError> {
    let attribute = |name: &str| {
        section
            .attribute(name)
            .ok_or_else(|| ConfigError::MissingAttribute {
                element: SECTION_SELECTOR.to_string(),
                attribute: name.to_string(),
            })
    };

    let player = attribute("data-model")?
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|m| m.checked_sub(1))
        .ok_or_else(|| ConfigError::MissingAttribute {
            element: SECTION_SELECTOR.to_string(),
            attribute: "data-model".to_string(),
        })?;

    let animation_in: Keyframes = serde_json::from_str(&attribute("data-in")?)?;
    let animation_out: Keyframes = serde_json::from_str(&attribute("data-out")?)?;
    Ok((player, animation_in, animation_out))
}

impl<P: AnimationPlayer> ScrollAnimator for KeyframeSectionAnimator<P> {
    fn handle_event(&mut self, event: &DomEvent, document: &dyn Document, _: Instant) {
        match event {
            DomEvent::Scroll => self.on_scroll(document.scroll_y()),
            DomEvent::Resize => {
                self.measure(document);
                self.on_scroll(document.scroll_y());
            }
            _ => {}
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
        std::mem::take(&mut self.dirty) || loader
    }
}
