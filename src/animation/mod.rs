//! Tweens, timelines and scroll triggers.
//!
//! This is the small subset of a tweening engine the viewers and scroll animators rely
//! on: eased interpolation between two values, timelines of tweens addressed by target
//! and label, and triggers mapping the scroll position to a progress in [0, 1].

pub use self::ease::Ease;
pub use self::lerp::Lerp;
pub use self::scroll_trigger::{
    Edge, ScrollTrigger, TriggerEvent, TriggerPosition, TriggerRange,
};
pub use self::timeline::{Position, Timeline};
pub use self::tween::{Animated, Repeat, Tween};

mod ease;
mod lerp;
mod scroll_trigger;
mod timeline;
mod tween;
