use crate::animation::{Ease, Lerp};
use web_time::Instant;

/// How many times a tween plays.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Repeat {
    #[default]
    Once,
    /// Plays once, then `n` more times.
    Times(u32),
    Forever,
}

/// An eased interpolation from one value to another.
///
/// Times are in seconds, relative to the moment the tween is started (or placed, within
/// a [`Timeline`](crate::animation::Timeline)).
#[derive(Clone, Debug, PartialEq)]
pub struct Tween<T> {
    pub from: T,
    pub to: T,
    pub duration: f32,
    pub delay: f32,
    pub ease: Ease,
    pub repeat: Repeat,
}

impl<T: Lerp> Tween<T> {
    /// A tween without delay, eased with `power1.out`.
    pub fn new(from: T, to: T, duration: f32) -> Self {
        Tween {
            from,
            to,
            duration,
            delay: 0.0,
            ease: Ease::PowerOut(1),
            repeat: Repeat::Once,
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Delay plus the duration of every repetition. Infinite if the tween repeats forever.
    pub fn total_duration(&self) -> f32 {
        match self.repeat {
            Repeat::Once => self.delay + self.duration,
            Repeat::Times(n) => self.delay + self.duration * (n as f32 + 1.0),
            Repeat::Forever => f32::INFINITY,
        }
    }

    /// Whether the tween reached its final value at `time`.
    pub fn is_finished(&self, time: f32) -> bool {
        time >= self.total_duration()
    }

    /// The eased progress at `time`, in [0, 1].
    pub fn progress_at(&self, time: f32) -> f32 {
        let local = time - self.delay;

        if local <= 0.0 {
            return 0.0;
        }

        if self.duration <= 0.0 || self.is_finished(time) {
            return 1.0;
        }

        let cycle = if self.repeat == Repeat::Once {
            local / self.duration
        } else {
            (local % self.duration) / self.duration
        };

        self.ease.apply(cycle)
    }

    /// The interpolated value at `time`.
    pub fn value_at(&self, time: f32) -> T {
        self.from.lerp(&self.to, self.progress_at(time))
    }
}

/// A value that can be animated towards a target over time.
///
/// Starting a new animation while one is running starts from the current value, so the
/// motion never jumps.
#[derive(Clone, Debug)]
pub struct Animated<T> {
    value: T,
    running: Option<(Tween<T>, Instant)>,
}

impl<T: Lerp> Animated<T> {
    pub fn new(value: T) -> Self {
        Animated {
            value,
            running: None,
        }
    }

    /// The current value.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// The value the running animation ends on, or the current value.
    pub fn target(&self) -> &T {
        match &self.running {
            Some((tween, _)) => &tween.to,
            None => &self.value,
        }
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.running.is_some()
    }

    /// Jumps to `value`, stopping any running animation.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.running = None;
    }

    /// Animates from the current value to `target`.
    pub fn animate_to(&mut self, target: T, duration: f32, ease: Ease, now: Instant) {
        if duration <= 0.0 {
            self.set(target);
            return;
        }

        let tween = Tween::new(self.value.clone(), target, duration).with_ease(ease);
        self.running = Some((tween, now));
    }

    /// Plays `tween` from `now`. The tween's own `from` is used as the start value.
    pub fn play(&mut self, tween: Tween<T>, now: Instant) {
        self.value = tween.from.clone();
        self.running = Some((tween, now));
    }

    /// Advances the running animation. Returns `true` if the value changed.
    pub fn update(&mut self, now: Instant) -> bool {
        let Some((tween, start)) = &self.running else {
            return false;
        };

        let elapsed = now.saturating_duration_since(*start).as_secs_f32();
        self.value = tween.value_at(elapsed);

        if tween.is_finished(elapsed) {
            self.running = None;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn delay_holds_the_start_value() {
        let tween = Tween::new(0.0, 10.0, 1.0)
            .with_delay(0.5)
            .with_ease(Ease::Linear);

        assert_eq!(tween.value_at(0.0), 0.0);
        assert_eq!(tween.value_at(0.5), 0.0);
        assert_eq!(tween.value_at(1.0), 5.0);
        assert_eq!(tween.value_at(1.5), 10.0);
        assert_eq!(tween.value_at(100.0), 10.0);
        assert_eq!(tween.total_duration(), 1.5);
    }

    #[test]
    fn repeating_tween_restarts() {
        let tween = Tween::new(0.0, 4.0, 2.0)
            .with_ease(Ease::Linear)
            .with_repeat(Repeat::Forever);

        assert_eq!(tween.value_at(1.0), 2.0);
        assert_eq!(tween.value_at(3.0), 2.0);
        assert!(!tween.is_finished(1.0e6));

        let twice = tween.clone().with_repeat(Repeat::Times(1));
        assert_eq!(twice.total_duration(), 4.0);
        assert_eq!(twice.value_at(5.0), 4.0);
    }

    #[test]
    fn zero_duration_jumps_to_the_end() {
        let tween = Tween::new(1.0, 2.0, 0.0);
        assert_eq!(tween.value_at(0.0), 1.0);
        assert_eq!(tween.value_at(0.001), 2.0);
    }

    #[test]
    fn animated_value_retargets_smoothly() {
        let start = Instant::now();
        let mut value = Animated::new(0.0f32);
        assert!(!value.update(start));

        value.animate_to(10.0, 1.0, Ease::Linear, start);
        assert!(value.update(start + Duration::from_millis(500)));
        assert!((value.value() - 5.0).abs() < 1.0e-3);

        let mid = start + Duration::from_millis(500);
        value.animate_to(0.0, 1.0, Ease::Linear, mid);
        assert_eq!(*value.target(), 0.0);
        value.update(mid);
        assert!((value.value() - 5.0).abs() < 1.0e-3);

        assert!(value.update(mid + Duration::from_secs(2)));
        assert_eq!(*value.value(), 0.0);
        assert!(!value.is_animating());
        assert!(!value.update(mid + Duration::from_secs(3)));
    }
}
