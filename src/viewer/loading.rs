use std::time::Duration;
use web_time::Instant;

/// The class set on the viewer element while an appearance swap is in progress.
pub const LOADING_CLASS: &str = "is-loading";

/// Keeps the loading indicator up for at least a minimum duration.
///
/// The indicator is released at `max(completion, start + floor)`: a swap finishing
/// early does not make it flash.
#[derive(Copy, Clone, Debug)]
pub struct LoadingIndicator {
    floor: Duration,
    started: Option<Instant>,
    completed: Option<Instant>,
}

impl LoadingIndicator {
    pub fn new(floor: Duration) -> Self {
        LoadingIndicator {
            floor,
            started: None,
            completed: None,
        }
    }

    pub fn floor(&self) -> Duration {
        self.floor
    }

    /// Raises the indicator. A swap started while the indicator is up keeps the original
    /// start time.
    pub fn start(&mut self, now: Instant) {
        if self.started.is_none() {
            self.started = Some(now);
        }
        self.completed = None;
    }

    /// Marks the work as done.
    pub fn complete(&mut self, now: Instant) {
        if self.started.is_some() {
            self.completed = Some(now);
        }
    }

    /// Whether the indicator is up.
    pub fn is_active(&self) -> bool {
        self.started.is_some()
    }

    /// When the indicator will be released, once the work is done.
    pub fn release_at(&self) -> Option<Instant> {
        let started = self.started?;
        let completed = self.completed?;
        Some(completed.max(started + self.floor))
    }

    /// Releases the indicator if its time has come. Returns `true` on release.
    pub fn update(&mut self, now: Instant) -> bool {
        match self.release_at() {
            Some(at) if now >= at => {
                self.started = None;
                self.completed = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR: Duration = Duration::from_millis(300);

    #[test]
    fn fast_completion_waits_for_floor() {
        let start = Instant::now();
        let mut indicator = LoadingIndicator::new(FLOOR);
        indicator.start(start);
        indicator.complete(start + Duration::from_millis(50));

        assert!(!indicator.update(start + Duration::from_millis(299)));
        assert!(indicator.is_active());
        assert!(indicator.update(start + FLOOR));
        assert!(!indicator.is_active());
    }

    #[test]
    fn slow_completion_releases_immediately() {
        let start = Instant::now();
        let done = start + Duration::from_millis(800);
        let mut indicator = LoadingIndicator::new(FLOOR);
        indicator.start(start);

        assert!(!indicator.update(start + Duration::from_millis(500)));
        indicator.complete(done);
        assert_eq!(indicator.release_at(), Some(done));
        assert!(indicator.update(done));
    }

    #[test]
    fn restart_keeps_first_start() {
        let start = Instant::now();
        let mut indicator = LoadingIndicator::new(FLOOR);
        indicator.start(start);
        indicator.start(start + Duration::from_millis(100));
        indicator.complete(start + Duration::from_millis(150));
        assert_eq!(indicator.release_at(), Some(start + FLOOR));
    }

    #[test]
    fn idle_indicator_never_releases() {
        let mut indicator = LoadingIndicator::new(FLOOR);
        indicator.complete(Instant::now());
        assert!(!indicator.update(Instant::now() + FLOOR));
    }
}
