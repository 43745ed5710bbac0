use crate::animation::{Animated, Ease, Tween};
use crate::dom::{Document, ElementRef};
use web_time::Instant;

/// The loading overlay covering the animation players until the first one has loaded.
///
/// Once the first player reports loaded, the overlay waits [`Self::DELAY`] then fades out,
/// ending hidden.
#[derive(Debug)]
pub struct LoaderFade {
    element: ElementRef,
    alpha: Animated<f32>,
    started: bool,
}

impl LoaderFade {
    pub const SELECTOR: &'static str = ".js-spline-loader";
    pub const DELAY: f32 = 0.1;
    pub const DURATION: f32 = 0.5;

    pub fn new(element: ElementRef) -> Self {
        LoaderFade {
            element,
            alpha: Animated::new(1.0),
            started: false,
        }
    }

    /// Binds to the `.js-spline-loader` overlay, if the page has one.
    pub fn from_document(document: &dyn Document) -> Option<Self> {
        document.query_selector(Self::SELECTOR).map(LoaderFade::new)
    }

    /// Records that the player at index `player` has loaded. Only the first player starts
    /// the fade, and only once.
    pub fn mark_loaded(&mut self, player: usize, now: Instant) {
        if player != 0 || self.started {
            return;
        }

        self.started = true;
        self.alpha.play(
            Tween::new(1.0, 0.0, Self::DURATION)
                .with_delay(Self::DELAY)
                .with_ease(Ease::PowerOut(1)),
            now,
        );
        log::debug!("First player loaded, fading the loader out.");
    }

    pub fn alpha(&self) -> f32 {
        *self.alpha.value()
    }

    pub fn is_hidden(&self) -> bool {
        self.started && !self.alpha.is_animating()
    }

    /// Writes the current opacity to the overlay. Returns `true` if it changed.
    pub fn update(&mut self, now: Instant) -> bool {
        if !self.alpha.update(now) {
            return false;
        }

        let alpha = self.alpha();
        self.element.set_style("opacity", &alpha.to_string());
        self.element
            .set_style("visibility", if alpha <= 0.0 { "hidden" } else { "inherit" });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Element, MemoryElement};
    use std::time::Duration;

    #[test]
    fn fades_out_after_the_first_player() {
        let now = Instant::now();
        let overlay = MemoryElement::new("div");
        let mut loader = LoaderFade::new(overlay.clone());

        loader.mark_loaded(1, now);
        assert!(!loader.update(now + Duration::from_secs(1)));
        assert_eq!(overlay.style("opacity"), None);

        loader.mark_loaded(0, now);
        let _ = loader.update(now + Duration::from_millis(50));
        assert_eq!(loader.alpha(), 1.0);
        assert!(!loader.is_hidden());

        assert!(loader.update(now + Duration::from_secs(1)));
        assert_eq!(overlay.style("opacity").as_deref(), Some("0"));
        assert_eq!(overlay.style("visibility").as_deref(), Some("hidden"));
        assert!(loader.is_hidden());
    }

    #[test]
    fn reloading_does_not_restart_the_fade() {
        let now = Instant::now();
        let mut loader = LoaderFade::new(MemoryElement::new("div"));

        loader.mark_loaded(0, now);
        let _ = loader.update(now + Duration::from_secs(1));
        loader.mark_loaded(0, now + Duration::from_secs(2));
        assert!(!loader.update(now + Duration::from_secs(2)));
        assert_eq!(loader.alpha(), 0.0);
    }
}
