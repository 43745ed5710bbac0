//! Scroll-linked animators.
//!
//! Animators map page scroll or wheel input to the state of animation players or of a
//! camera. They are fed [`DomEvent`]s by the page and advanced once per frame.

pub use self::camera_path::CameraPathAnimator;
pub use self::keyframes::{KeyframeSectionAnimator, Keyframes};
pub use self::loader::LoaderFade;
pub use self::player::{AnimationPlayer, ElementPlayer};
pub use self::sections::SectionAnimator;
pub use self::style::{PlayerStyle, StyleVars, Transition};
pub use self::wheel::{ContainerScroller, WheelStepper};

use crate::dom::{Document, DomEvent};
use web_time::Instant;

mod camera_path;
mod keyframes;
mod loader;
mod player;
mod sections;
mod style;
mod wheel;

/// Selector of the animation players of a page.
pub const MODEL_SELECTOR: &str = ".js-spline-model";
/// Selector of the page sections bound to animation players.
pub const SECTION_SELECTOR: &str = ".js-spline-model-section";

/// An animator driven by page events.
pub trait ScrollAnimator {
    /// Reacts to a page event.
    fn handle_event(&mut self, event: &DomEvent, document: &dyn Document, now: Instant);

    /// Records that the content of the player at index `player` has loaded.
    fn mark_loaded(&mut self, _player: usize, _now: Instant) {}

    /// Advances running animations to `now`. Returns `true` if anything changed since the
    /// last call.
    fn update(&mut self, now: Instant) -> bool;
}
