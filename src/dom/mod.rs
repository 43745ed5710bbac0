//! The page markup the viewers attach to.
//!
//! Viewers and animators find their elements with CSS selectors, read configuration from
//! `data-*` attributes, toggle state classes and write inline styles. They do so through
//! the [`Document`] and [`Element`] traits, implemented over the browser DOM on wasm
//! ([`WebDocument`]) and in memory everywhere ([`MemoryDocument`]).

pub use self::events::{DomEvent, DomEvents, EventHub};
pub use self::memory::{Download, MemoryDocument, MemoryElement};
#[cfg(target_arch = "wasm32")]
pub use self::web::{WebDocument, WebElement};

mod events;
mod memory;
mod selector;
#[cfg(target_arch = "wasm32")]
mod web;

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A box in viewport coordinates, in CSS pixels.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Rect {
            left,
            top,
            width,
            height,
        }
    }
}

/// A shared handle to an element.
pub type ElementRef = Rc<dyn Element>;

/// An element of the page.
pub trait Element: fmt::Debug {
    /// The value of an attribute, e.g. `data-texture-base`.
    fn attribute(&self, name: &str) -> Option<String>;

    fn has_class(&self, class: &str) -> bool;
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);

    /// Toggles `class` and returns whether it is now present.
    fn toggle_class(&self, class: &str) -> bool {
        if self.has_class(class) {
            self.remove_class(class);
            false
        } else {
            self.add_class(class);
            true
        }
    }

    /// Sets an inline style property, e.g. `set_style("opacity", "0.5")`.
    fn set_style(&self, property: &str, value: &str);

    /// The inline value of a style property.
    fn style(&self, property: &str) -> Option<String>;

    /// The element's box relative to the viewport.
    fn bounding_rect(&self) -> Rect;

    /// The descendants of this element matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<ElementRef>;

    /// Whether `other` is this element or one of its descendants.
    fn contains(&self, other: &dyn Element) -> bool;

    /// Detaches the element from the page.
    fn remove(&self);

    fn as_any(&self) -> &dyn Any;
}

/// Whether two handles designate the same element.
pub fn same_element(a: &dyn Element, b: &dyn Element) -> bool {
    a.contains(b) && b.contains(a)
}

/// Sets `class` on `active` and removes it from every other element of `group`.
pub fn set_exclusive_class(group: &[ElementRef], active: &dyn Element, class: &str) {
    for element in group {
        if same_element(&**element, active) {
            element.add_class(class);
        } else {
            element.remove_class(class);
        }
    }
}

/// The page: element lookup, scroll and viewport state, input events and downloads.
pub trait Document {
    /// The first element matching `selector`.
    fn query_selector(&self, selector: &str) -> Option<ElementRef> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// Every element matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<ElementRef>;

    /// Vertical scroll offset of the page, in CSS pixels.
    fn scroll_y(&self) -> f32;

    /// Width and height of the viewport, in CSS pixels.
    fn viewport_size(&self) -> (f32, f32);

    /// A new queue receiving every event dispatched from now on.
    fn subscribe(&self) -> DomEvents;

    /// Offers `bytes` to the user as a file download.
    fn download(&self, file_name: &str, mime: &str, bytes: &[u8]);
}
