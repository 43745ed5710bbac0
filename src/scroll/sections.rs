use crate::animation::{Animated, Ease, Edge, ScrollTrigger, TriggerEvent, TriggerPosition};
use crate::dom::{Document, DomEvent, ElementRef};
use crate::scroll::{
    AnimationPlayer, LoaderFade, PlayerStyle, ScrollAnimator, Transition, MODEL_SELECTOR, SECTION_SELECTOR,
};
use web_time::Instant;

const START: TriggerPosition = TriggerPosition::new(Edge::Top, Edge::Center);
const END: TriggerPosition = TriggerPosition::new(Edge::Bottom, Edge::Center);

struct PlayerSlot<P> {
    player: P,
    enter: Transition,
    leave: Transition,
    style: Animated<PlayerStyle>,
}

struct Section {
    element: ElementRef,
    player: usize,
    trigger: ScrollTrigger,
}

/// Shows one animation player at a time, following the page sections in view.
///
/// Each section is bound to one player, and several sections may share a player. A
/// section becomes current when its top passes the middle of the viewport and stops
/// being current when its bottom does. Entering the section of another player plays the
/// leave transition of the current player and the enter transition of the new one.
/// Entering the section of the player already shown does nothing.
pub struct SectionAnimator<P> {
    players: Vec<PlayerSlot<P>>,
    sections: Vec<Section>,
    active: Option<usize>,
    loader: Option<LoaderFade>,
}

impl<P: AnimationPlayer> SectionAnimator<P> {
    /// Creates an animator over `players`, all initially hidden.
    pub fn new(players: Vec<(P, Transition, Transition)>) -> Self {
        let players = players
            .into_iter()
            .map(|(mut player, enter, leave)| {
                player.set_style(&PlayerStyle::hidden());
                PlayerSlot {
                    player,
                    enter,
                    leave,
                    style: Animated::new(PlayerStyle::hidden()),
                }
            })
            .collect();

        SectionAnimator {
            players,
            sections: Vec::new(),
            active: None,
            loader: None,
        }
    }

    /// Binds the `.js-spline-model` players of the page to its `.js-spline-model-section`
    /// sections.
    ///
    /// Players read their transitions from `data-in` and `data-out`. A section shows the
    /// player given by its 1-based `data-model` attribute, or the player with its own
    /// index. The `.js-spline-loader` overlay, if any, fades out once the first player has
    /// loaded. Returns `None` if the page has no player or no section.
    pub fn from_document(
        document: &dyn Document,
        mut make_player: impl FnMut(ElementRef) -> P,
    ) -> Option<Self> {
        let models = document.query_selector_all(MODEL_SELECTOR);
        let sections = document.query_selector_all(SECTION_SELECTOR);

        if models.is_empty() || sections.is_empty() {
            return None;
        }

        let players = models
            .into_iter()
            .map(|model| {
                let enter = Transition::from_name(model.attribute("data-in").as_deref());
                let leave = Transition::from_name(model.attribute("data-out").as_deref());
                (make_player(model), enter, leave)
            })
            .collect();

        let mut result =
            SectionAnimator::new(players).with_loader(LoaderFade::from_document(document));
        for (i, section) in sections.into_iter().enumerate() {
            let player = section
                .attribute("data-model")
                .and_then(|m| m.trim().parse::<usize>().ok())
                .and_then(|m| m.checked_sub(1))
                .unwrap_or(i);
            result.add_section(section, player);
        }

        result.measure(document);
        Some(result)
    }

    pub fn with_loader(mut self, loader: Option<LoaderFade>) -> Self {
        self.loader = loader;
        self
    }

    pub fn loader(&self) -> Option<&LoaderFade> {
        self.loader.as_ref()
    }

    /// Binds `element` to the player at index `player`. Sections of unknown players are
    /// ignored.
    pub fn add_section(&mut self, element: ElementRef, player: usize) {
        if player >= self.players.len() {
            log::warn!("Ignoring a section bound to missing player {}.", player + 1);
            return;
        }

        self.sections.push(Section {
            element,
            player,
            trigger: ScrollTrigger::new(START, END),
        });
    }

    /// The index of the player currently shown.
    #[inline]
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn player(&self, index: usize) -> Option<&P> {
        self.players.get(index).map(|slot| &slot.player)
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    /// Shows `player`. Returns `false`, and starts nothing, if it is already shown.
    pub fn enter(&mut self, player: usize, now: Instant) -> bool {
        if self.active == Some(player) || player >= self.players.len() {
            return false;
        }

        if let Some(previous) = self.active {
            let _ = self.leave(previous, now);
        }

        let slot = &mut self.players[player];
        slot.style.animate_to(
            slot.enter.enter_style(),
            Transition::DURATION,
            Ease::PowerOut(1),
            now,
        );
        self.active = Some(player);
        log::debug!("Entering player {}.", player + 1);
        true
    }

    /// Hides `player`. Returns `false` if it was not shown.
    pub fn leave(&mut self, player: usize, now: Instant) -> bool {
        if self.active != Some(player) {
            return false;
        }

        let slot = &mut self.players[player];
        let target = slot.leave.leave_style(slot.style.value());
        slot.style
            .animate_to(target, Transition::DURATION, Ease::PowerOut(1), now);
        self.active = None;
        true
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

    /// Applies a new scroll position.
    pub fn on_scroll(&mut self, scroll_y: f32, now: Instant) {
        let crossings: Vec<(usize, TriggerEvent)> = self
            .sections
            .iter_mut()
            .flat_map(|section| {
                let player = section.player;
                section
                    .trigger
                    .update(scroll_y)
                    .into_iter()
                    .map(move |event| (player, event))
            })
            .collect();

        for (player, event) in &crossings {
            if matches!(event, TriggerEvent::Leave | TriggerEvent::LeaveBack)
                && !self.is_in_view(*player)
            {
                let _ = self.leave(*player, now);
            }
        }

        for (player, event) in &crossings {
            if matches!(event, TriggerEvent::Enter | TriggerEvent::EnterBack)
                && self.is_in_view(*player)
            {
                let _ = self.enter(*player, now);
            }
        }
    }

    // Whether a section of `player` is current.
    fn is_in_view(&self, player: usize) -> bool {
        self.sections
            .iter()
            .any(|s| s.player == player && s.trigger.is_active())
    }
}

impl<P: AnimationPlayer> ScrollAnimator for SectionAnimator<P> {
    fn handle_event(&mut self, event: &DomEvent, document: &dyn Document, now: Instant) {
        match event {
            DomEvent::Scroll => self.on_scroll(document.scroll_y(), now),
            DomEvent::Resize => {
                self.measure(document);
                self.on_scroll(document.scroll_y(), now);
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
        let mut changed = self
            .loader
            .as_mut()
            .map_or(false, |loader| loader.update(now));

        for slot in &mut self.players {
            if slot.style.update(now) {
                slot.player.set_style(slot.style.value());
                changed = true;
            }
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        style: PlayerStyle,
        updates: usize,
    }

    impl AnimationPlayer for Recorder {
        fn set_style(&mut self, style: &PlayerStyle) {
            self.style = *style;
            self.updates += 1;
        }

        fn style(&self) -> PlayerStyle {
            self.style
        }
    }

    fn animator() -> SectionAnimator<Recorder> {
        SectionAnimator::new(vec![
            (Recorder::default(), Transition::ScaleMax, Transition::ScaleMin),
            (Recorder::default(), Transition::Default, Transition::Default),
        ])
    }

    #[test]
    fn players_start_hidden() {
        let animator = animator();
        assert_eq!(animator.player(0).unwrap().style().alpha, 0.0);
        assert_eq!(animator.active(), None);
    }

    #[test]
    fn enter_is_idempotent() {
        let now = Instant::now();
        let mut animator = animator();

        assert!(animator.enter(0, now));
        assert!(!animator.enter(0, now + Duration::from_millis(100)));
        assert_eq!(animator.active(), Some(0));

        animator.update(now + Duration::from_secs(1));
        let style = animator.player(0).unwrap().style();
        assert_eq!((style.scale, style.alpha), (1.3, 1.0));
    }

    #[test]
    fn only_one_player_is_shown() {
        let now = Instant::now();
        let mut animator = animator();

        assert!(animator.enter(0, now));
        assert!(animator.enter(1, now));
        assert_eq!(animator.active(), Some(1));

        animator.update(now + Duration::from_secs(1));
        let left = animator.player(0).unwrap().style();
        assert_eq!((left.alpha, left.scale, left.blur), (0.0, 0.0, 100.0));
        assert_eq!(animator.player(1).unwrap().style().alpha, 1.0);

        assert!(!animator.leave(0, now));
        assert!(animator.leave(1, now));
        assert_eq!(animator.active(), None);
    }

    #[test]
    fn missing_players_are_ignored() {
        let mut animator = animator();
        assert!(!animator.enter(7, Instant::now()));
        animator.add_section(crate::dom::MemoryElement::new("section"), 7);
        assert!(animator.sections.is_empty());
    }
}
