use crate::animation::{Lerp, Tween};
use std::collections::HashMap;

/// Where a tween is placed on a [`Timeline`].
#[derive(Clone, Debug, PartialEq)]
pub enum Position {
    /// After everything already on the timeline.
    End,
    /// At a named label. A label that does not exist yet is created at the end.
    Label(String),
    /// At an absolute time, in seconds.
    At(f32),
}

#[derive(Clone, Debug)]
struct Entry<T> {
    target: usize,
    start: f32,
    tween: Tween<T>,
}

impl<T: Lerp> Entry<T> {
    fn begins(&self) -> f32 {
        self.start + self.tween.delay
    }
}

/// A sequence of tweens over several targets, sampled by time or by progress.
///
/// Targets are identified by index. When several tweens of the same target overlap, the
/// one that started last wins. Before its first tween begins, a target holds the start
/// value of that tween.
#[derive(Clone, Debug)]
pub struct Timeline<T> {
    entries: Vec<Entry<T>>,
    labels: HashMap<String, f32>,
    end: f32,
    time: f32,
}

impl<T: Lerp> Default for Timeline<T> {
    fn default() -> Self {
        Timeline::new()
    }
}

impl<T: Lerp> Timeline<T> {
    pub fn new() -> Self {
        Timeline {
            entries: Vec::new(),
            labels: HashMap::new(),
            end: 0.0,
            time: 0.0,
        }
    }

    /// Adds a label at the current end of the timeline.
    pub fn add_label(&mut self, name: &str) -> &mut Self {
        let _ = self.labels.insert(name.to_string(), self.end);
        self
    }

    /// The time of a label.
    pub fn label(&self, name: &str) -> Option<f32> {
        self.labels.get(name).copied()
    }

    /// Places `tween` for `target` at `position` and returns the time it was placed at.
    pub fn add(&mut self, target: usize, tween: Tween<T>, position: Position) -> f32 {
        let start = match position {
            Position::End => self.end,
            Position::At(t) => t.max(0.0),
            Position::Label(name) => *self.labels.entry(name).or_insert(self.end),
        };

        self.end = self.end.max(start + tween.total_duration());
        self.entries.push(Entry {
            target,
            start,
            tween,
        });
        start
    }

    /// Total duration, in seconds.
    #[inline]
    pub fn duration(&self) -> f32 {
        self.end
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The distinct targets animated by this timeline, in order of first appearance.
    pub fn targets(&self) -> Vec<usize> {
        let mut result: Vec<usize> = Vec::new();
        for entry in &self.entries {
            if !result.contains(&entry.target) {
                result.push(entry.target);
            }
        }
        result
    }

    /// The value of `target` at `time`, or `None` if no tween animates it.
    pub fn sample(&self, target: usize, time: f32) -> Option<T> {
        let mut current: Option<&Entry<T>> = None;
        let mut first: Option<&Entry<T>> = None;

        for entry in self.entries.iter().filter(|e| e.target == target) {
            if first.map_or(true, |f| entry.begins() < f.begins()) {
                first = Some(entry);
            }

            if entry.begins() <= time && current.map_or(true, |c| entry.begins() >= c.begins()) {
                current = Some(entry);
            }
        }

        match current {
            Some(entry) => Some(entry.tween.value_at(time - entry.start)),
            None => first.map(|entry| entry.tween.from.clone()),
        }
    }

    /// The current playhead, in seconds.
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Moves the playhead to `progress` (clamped to [0, 1]) of the duration.
    pub fn seek(&mut self, progress: f32) {
        self.time = progress.clamp(0.0, 1.0) * self.end;
    }

    /// Moves the playhead to `time` seconds.
    pub fn seek_time(&mut self, time: f32) {
        self.time = time.clamp(0.0, self.end);
    }

    /// The progress of the playhead, in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.end > 0.0 {
            self.time / self.end
        } else {
            0.0
        }
    }

    /// The value of every target at the playhead.
    pub fn values(&self) -> Vec<(usize, T)> {
        self.targets()
            .into_iter()
            .filter_map(|target| self.sample(target, self.time).map(|v| (target, v)))
            .collect()
    }
}
