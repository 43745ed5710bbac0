use crate::error::ConfigError;
use std::str::FromStr;

/// A reference line on an element or on the viewport.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Edge {
    Top,
    Center,
    Bottom,
    /// A percentage of the height, from the top.
    Percent(f32),
    /// A distance in pixels, from the top.
    Pixels(f32),
}

impl Edge {
    /// Distance of this edge from the top of a box of height `size`.
    pub fn offset(self, size: f32) -> f32 {
        match self {
            Edge::Top => 0.0,
            Edge::Center => size / 2.0,
            Edge::Bottom => size,
            Edge::Percent(p) => size * p / 100.0,
            Edge::Pixels(px) => px,
        }
    }
}

impl FromStr for Edge {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Edge::Top),
            "center" => Ok(Edge::Center),
            "bottom" => Ok(Edge::Bottom),
            _ => {
                if let Some(p) = s.strip_suffix('%') {
                    p.parse().map(Edge::Percent).map_err(|_| ())
                } else {
                    s.strip_suffix("px")
                        .unwrap_or(s)
                        .parse()
                        .map(Edge::Pixels)
                        .map_err(|_| ())
                }
            }
        }
    }
}

/// `"<element edge> <viewport edge>"`: the trigger point is reached when the element
/// edge meets the viewport edge.
///
/// ```
/// # use showroom::animation::{Edge, TriggerPosition};
/// let pos: TriggerPosition = "top center".parse().unwrap();
/// assert_eq!(pos.element, Edge::Top);
/// assert_eq!(pos.viewport, Edge::Center);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriggerPosition {
    pub element: Edge,
    pub viewport: Edge,
}

impl TriggerPosition {
    pub const fn new(element: Edge, viewport: Edge) -> Self {
        TriggerPosition { element, viewport }
    }

    /// The scroll offset at which this position is reached, for an element starting at
    /// `element_top` (in document coordinates).
    pub fn scroll_offset(&self, element_top: f32, element_height: f32, viewport_height: f32) -> f32 {
        element_top + self.element.offset(element_height) - self.viewport.offset(viewport_height)
    }
}

impl FromStr for TriggerPosition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidTriggerPosition(s.to_string());
        let words: Vec<&str> = s.split_whitespace().collect();

        let (element, viewport) = match words.as_slice() {
            [both] => (*both, *both),
            [element, viewport] => (*element, *viewport),
            _ => return Err(invalid()),
        };

        Ok(TriggerPosition {
            element: element.parse().map_err(|_| invalid())?,
            viewport: viewport.parse().map_err(|_| invalid())?,
        })
    }
}

/// Boundary crossings reported by [`ScrollTrigger::update`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TriggerEvent {
    /// Scrolling down past the start.
    Enter,
    /// Scrolling down past the end.
    Leave,
    /// Scrolling up past the end.
    EnterBack,
    /// Scrolling up past the start.
    LeaveBack,
}

/// Scroll offsets delimiting a trigger.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct TriggerRange {
    pub start: f32,
    pub end: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Zone {
    Before,
    Inside,
    After,
}

/// Maps the scroll position to a progress over an element's scroll range.
#[derive(Clone, Debug)]
pub struct ScrollTrigger {
    start: TriggerPosition,
    end: TriggerPosition,
    range: TriggerRange,
    zone: Zone,
    progress: f32,
}

impl ScrollTrigger {
    pub fn new(start: TriggerPosition, end: TriggerPosition) -> Self {
        ScrollTrigger {
            start,
            end,
            range: TriggerRange::default(),
            zone: Zone::Before,
            progress: 0.0,
        }
    }

    /// Parses both positions, e.g. `ScrollTrigger::parse("top bottom", "bottom top")`.
    pub fn parse(start: &str, end: &str) -> Result<Self, ConfigError> {
        Ok(ScrollTrigger::new(start.parse()?, end.parse()?))
    }

    /// Recomputes the scroll range from the element geometry. Must be called again when
    /// the layout changes.
    pub fn measure(&mut self, element_top: f32, element_height: f32, viewport_height: f32) {
        let start = self
            .start
            .scroll_offset(element_top, element_height, viewport_height);
        let end = self
            .end
            .scroll_offset(element_top, element_height, viewport_height);

        self.range = TriggerRange {
            start,
            end: end.max(start),
        };
    }

    #[inline]
    pub fn range(&self) -> TriggerRange {
        self.range
    }

    /// The progress at `scroll_y`, clamped to [0, 1].
    pub fn progress_at(&self, scroll_y: f32) -> f32 {
        let TriggerRange { start, end } = self.range;

        if end > start {
            ((scroll_y - start) / (end - start)).clamp(0.0, 1.0)
        } else if scroll_y >= start {
            1.0
        } else {
            0.0
        }
    }

    /// The progress at the last update.
    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Whether the last scroll position was within the range.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.zone == Zone::Inside
    }

    /// Updates the progress and returns the boundaries crossed since the last update,
    /// in crossing order.
    pub fn update(&mut self, scroll_y: f32) -> Vec<TriggerEvent> {
        let zone = if scroll_y < self.range.start {
            Zone::Before
        } else if scroll_y > self.range.end {
            Zone::After
        } else {
            Zone::Inside
        };

        let events = match (self.zone, zone) {
            (Zone::Before, Zone::Inside) => vec![TriggerEvent::Enter],
            (Zone::Before, Zone::After) => vec![TriggerEvent::Enter, TriggerEvent::Leave],
            (Zone::Inside, Zone::After) => vec![TriggerEvent::Leave],
            (Zone::After, Zone::Inside) => vec![TriggerEvent::EnterBack],
            (Zone::After, Zone::Before) => {
                vec![TriggerEvent::EnterBack, TriggerEvent::LeaveBack]
            }
            (Zone::Inside, Zone::Before) => vec![TriggerEvent::LeaveBack],
            _ => Vec::new(),
        };

        self.zone = zone;
        self.progress = self.progress_at(scroll_y);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A 400px section starting 1000px down a page, in an 800px viewport.
    fn section(start: &str, end: &str) -> ScrollTrigger {
        let mut trigger = ScrollTrigger::parse(start, end).unwrap();
        trigger.measure(1000.0, 400.0, 800.0);
        trigger
    }

    #[test]
    fn parse_positions() {
        let pos: TriggerPosition = "bottom 25%".parse().unwrap();
        assert_eq!(pos.viewport, Edge::Percent(25.0));
        let pos: TriggerPosition = "top 100px".parse().unwrap();
        assert_eq!(pos.viewport, Edge::Pixels(100.0));
        let pos: TriggerPosition = "center".parse().unwrap();
        assert_eq!(pos, TriggerPosition::new(Edge::Center, Edge::Center));

        assert!("top middle".parse::<TriggerPosition>().is_err());
        assert!("".parse::<TriggerPosition>().is_err());
        assert!("top top top".parse::<TriggerPosition>().is_err());
    }

    #[test]
    fn ranges() {
        let t = section("top bottom", "bottom top");
        assert_eq!(t.range(), TriggerRange { start: 200.0, end: 1400.0 });

        let t = section("top center", "bottom center");
        assert_eq!(t.range(), TriggerRange { start: 600.0, end: 1000.0 });

        let t = section("top top", "bottom top");
        assert_eq!(t.range(), TriggerRange { start: 1000.0, end: 1400.0 });
    }

    #[test]
    fn progress_is_clamped() {
        let mut t = section("top center", "bottom center");
        let _ = t.update(0.0);
        assert_eq!(t.progress(), 0.0);
        let _ = t.update(800.0);
        assert_eq!(t.progress(), 0.5);
        let _ = t.update(5000.0);
        assert_eq!(t.progress(), 1.0);
    }

    #[test]
    fn boundary_crossings() {
        let mut t = section("top center", "bottom center");

        assert!(t.update(0.0).is_empty());
        assert_eq!(t.update(700.0), vec![TriggerEvent::Enter]);
        assert!(t.is_active());
        assert!(t.update(800.0).is_empty());
        assert_eq!(t.update(1200.0), vec![TriggerEvent::Leave]);
        assert_eq!(t.update(900.0), vec![TriggerEvent::EnterBack]);
        assert_eq!(t.update(100.0), vec![TriggerEvent::LeaveBack]);
        assert!(!t.is_active());

        assert_eq!(
            t.update(3000.0),
            vec![TriggerEvent::Enter, TriggerEvent::Leave]
        );
        assert_eq!(
            t.update(0.0),
            vec![TriggerEvent::EnterBack, TriggerEvent::LeaveBack]
        );
    }

    #[test]
    fn inverted_range_collapses() {
        let mut t = ScrollTrigger::parse("bottom top", "top bottom").unwrap();
        t.measure(1000.0, 400.0, 800.0);
        assert_eq!(t.range().start, t.range().end);
        assert_eq!(t.progress_at(t.range().start), 1.0);
        assert_eq!(t.progress_at(0.0), 0.0);
    }
}
