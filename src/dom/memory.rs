use crate::dom::selector::{Selector, SelectorTarget};
use crate::dom::{Document, DomEvent, DomEvents, Element, ElementRef, EventHub, Rect};
use crate::event::Key;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

/// An element of a [`MemoryDocument`].
///
/// Boxes are given in page coordinates. [`Element::bounding_rect`] reports them relative
/// to the viewport, like a browser does.
#[derive(Debug)]
pub struct MemoryElement {
    tag: String,
    attributes: RefCell<BTreeMap<String, String>>,
    classes: RefCell<Vec<String>>,
    styles: RefCell<BTreeMap<String, String>>,
    rect: Cell<Rect>,
    parent: RefCell<Weak<MemoryElement>>,
    children: RefCell<Vec<Rc<MemoryElement>>>,
    scroll_y: Option<Rc<Cell<f32>>>,
}

impl MemoryElement {
    /// Creates a detached element.
    pub fn new(tag: &str) -> Rc<MemoryElement> {
        MemoryElement::with_scroll(tag, None)
    }

    fn with_scroll(tag: &str, scroll_y: Option<Rc<Cell<f32>>>) -> Rc<MemoryElement> {
        Rc::new(MemoryElement {
            tag: tag.to_ascii_lowercase(),
            attributes: RefCell::new(BTreeMap::new()),
            classes: RefCell::new(Vec::new()),
            styles: RefCell::new(BTreeMap::new()),
            rect: Cell::new(Rect::default()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            scroll_y,
        })
    }

    /// Adds the classes of a space-separated list.
    pub fn with_class(self: Rc<Self>, classes: &str) -> Rc<Self> {
        for class in classes.split_whitespace() {
            self.add_class(class);
        }
        self
    }

    pub fn with_attribute(self: Rc<Self>, name: &str, value: &str) -> Rc<Self> {
        self.set_attribute(name, value);
        self
    }

    /// Sets the box, in page coordinates.
    pub fn with_rect(self: Rc<Self>, rect: Rect) -> Rc<Self> {
        self.rect.set(rect);
        self
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        let _ = self
            .attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    /// Sets the box, in page coordinates.
    pub fn set_rect(&self, rect: Rect) {
        self.rect.set(rect);
    }

    /// Appends `child` to this element and returns it.
    pub fn append(self: &Rc<Self>, child: Rc<MemoryElement>) -> Rc<MemoryElement> {
        if let Some(old_parent) = child.parent.borrow().upgrade() {
            old_parent
                .children
                .borrow_mut()
                .retain(|c| !Rc::ptr_eq(c, &child));
        }

        *child.parent.borrow_mut() = Rc::downgrade(self);
        self.children.borrow_mut().push(child.clone());
        child
    }

    pub fn children(&self) -> Vec<Rc<MemoryElement>> {
        self.children.borrow().clone()
    }

    pub fn tag_name(&self) -> &str {
        &self.tag
    }

    /// The classes, in insertion order.
    pub fn classes(&self) -> Vec<String> {
        self.classes.borrow().clone()
    }

    /// Whether the element is attached to a document.
    pub fn is_connected(&self) -> bool {
        self.page_scroll().is_some()
    }

    // The scroll offset of the document this element is attached to.
    fn page_scroll(&self) -> Option<Rc<Cell<f32>>> {
        if let Some(scroll_y) = &self.scroll_y {
            return Some(scroll_y.clone());
        }

        let mut current = self.parent.borrow().upgrade();
        while let Some(node) = current {
            if let Some(scroll_y) = &node.scroll_y {
                return Some(scroll_y.clone());
            }
            current = node.parent.borrow().upgrade();
        }

        None
    }

    fn collect_matching(self: &Rc<Self>, selector: &Selector, out: &mut Vec<ElementRef>) {
        for child in self.children.borrow().iter() {
            if selector.matches(child) {
                out.push(child.clone());
            }
            child.collect_matching(selector, out);
        }
    }
}

impl SelectorTarget for Rc<MemoryElement> {
    fn tag(&self) -> String {
        self.tag.clone()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().iter().any(|c| c == class)
    }

    fn parent(&self) -> Option<Self> {
        self.parent.borrow().upgrade()
    }
}

impl Element for MemoryElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().iter().any(|c| c == class)
    }

    fn add_class(&self, class: &str) {
        if !self.has_class(class) {
            self.classes.borrow_mut().push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.classes.borrow_mut().retain(|c| c != class);
    }

    fn set_style(&self, property: &str, value: &str) {
        let _ = self
            .styles
            .borrow_mut()
            .insert(property.to_string(), value.to_string());
    }

    fn style(&self, property: &str) -> Option<String> {
        self.styles.borrow().get(property).cloned()
    }

    fn bounding_rect(&self) -> Rect {
        let mut rect = self.rect.get();
        if let Some(scroll_y) = self.page_scroll() {
            rect.top -= scroll_y.get();
        }
        rect
    }

    fn query_selector_all(&self, selector: &str) -> Vec<ElementRef> {
        let Some(selector) = Selector::parse(selector) else {
            log::warn!("Unsupported selector `{}`.", selector);
            return Vec::new();
        };

        let mut result = Vec::new();
        for child in self.children.borrow().iter() {
            if selector.matches(child) {
                result.push(child.clone() as ElementRef);
            }
            child.collect_matching(&selector, &mut result);
        }
        result
    }

    fn contains(&self, other: &dyn Element) -> bool {
        let Some(other) = other.as_any().downcast_ref::<MemoryElement>() else {
            return false;
        };

        if std::ptr::eq(self, other) {
            return true;
        }

        let mut current = other.parent.borrow().upgrade();
        while let Some(node) = current {
            if std::ptr::eq(self, &*node) {
                return true;
            }
            current = node.parent.borrow().upgrade();
        }

        false
    }

    fn remove(&self) {
        if let Some(parent) = self.parent.borrow().upgrade() {
            parent
                .children
                .borrow_mut()
                .retain(|c| !std::ptr::eq(&**c, self));
        }
        *self.parent.borrow_mut() = Weak::new();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A file offered for download by [`Document::download`].
#[derive(Clone, Debug, PartialEq)]
pub struct Download {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// An in-memory page, for tests and native demos.
///
/// The page is built from [`MemoryElement`]s appended to [`body`](Self::body). Input is
/// simulated with [`click`](Self::click), [`key_up`](Self::key_up) and friends, which
/// dispatch [`DomEvent`]s to every subscriber.
///
/// ```
/// # use showroom::dom::{Document, MemoryDocument, MemoryElement};
/// let doc = MemoryDocument::new();
/// let option = doc.body().append(
///     MemoryElement::new("button")
///         .with_class("js-furniture-configurator-option")
///         .with_attribute("data-texture-appearance-set", "set1"),
/// );
///
/// let events = doc.subscribe();
/// doc.click(&option);
/// assert_eq!(events.drain().len(), 1);
/// assert_eq!(doc.query_selector_all(".js-furniture-configurator-option").len(), 1);
/// ```
#[derive(Debug)]
pub struct MemoryDocument {
    body: Rc<MemoryElement>,
    scroll_y: Rc<Cell<f32>>,
    viewport: Cell<(f32, f32)>,
    hub: EventHub,
    downloads: RefCell<Vec<Download>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        MemoryDocument::new()
    }
}

impl MemoryDocument {
    /// An empty page with a 1280×800 viewport.
    pub fn new() -> Self {
        let scroll_y = Rc::new(Cell::new(0.0));
        MemoryDocument {
            body: MemoryElement::with_scroll("body", Some(scroll_y.clone())),
            scroll_y,
            viewport: Cell::new((1280.0, 800.0)),
            hub: EventHub::new(),
            downloads: RefCell::new(Vec::new()),
        }
    }

    pub fn body(&self) -> &Rc<MemoryElement> {
        &self.body
    }

    /// Scrolls the page and dispatches [`DomEvent::Scroll`].
    pub fn set_scroll_y(&self, scroll_y: f32) {
        self.scroll_y.set(scroll_y);
        self.hub.dispatch(DomEvent::Scroll);
    }

    /// Resizes the viewport and dispatches [`DomEvent::Resize`].
    pub fn set_viewport_size(&self, width: f32, height: f32) {
        self.viewport.set((width, height));
        self.hub.dispatch(DomEvent::Resize);
    }

    pub fn click(&self, element: &Rc<MemoryElement>) {
        self.hub.dispatch(DomEvent::Click(element.clone()));
    }

    pub fn key_up(&self, key: Key, alt: bool) {
        self.hub.dispatch(DomEvent::KeyUp { key, alt });
    }

    pub fn mouse_move(&self, x: f32, y: f32) {
        self.hub.dispatch(DomEvent::MouseMove { x, y });
    }

    pub fn wheel(&self, delta_y: f32) {
        self.hub.dispatch(DomEvent::Wheel { delta_y });
    }

    /// The files downloaded so far.
    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.borrow().clone()
    }
}

impl Document for MemoryDocument {
    fn query_selector_all(&self, selector: &str) -> Vec<ElementRef> {
        let mut result = Vec::new();
        if let Some(parsed) = Selector::parse(selector) {
            if parsed.matches(&self.body) {
                result.push(self.body.clone() as ElementRef);
            }
        }
        result.extend(self.body.query_selector_all(selector));
        result
    }

    fn scroll_y(&self) -> f32 {
        self.scroll_y.get()
    }

    fn viewport_size(&self) -> (f32, f32) {
        self.viewport.get()
    }

    fn subscribe(&self) -> DomEvents {
        self.hub.subscribe()
    }

    fn download(&self, file_name: &str, mime: &str, bytes: &[u8]) {
        log::info!("Downloading {} ({} bytes).", file_name, bytes.len());
        self.downloads.borrow_mut().push(Download {
            file_name: file_name.to_string(),
            mime: mime.to_string(),
            bytes: bytes.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{same_element, set_exclusive_class};

    fn options(doc: &MemoryDocument) -> Vec<Rc<MemoryElement>> {
        let panel = doc
            .body()
            .append(MemoryElement::new("div").with_class("js-ring-configurator-colors"));
        (0..3)
            .map(|i| {
                panel.append(
                    MemoryElement::new("button")
                        .with_class("js-ring-configurator-color")
                        .with_attribute("data-color", &format!("#00000{}", i)),
                )
            })
            .collect()
    }

    #[test]
    fn query_nested_elements() {
        let doc = MemoryDocument::new();
        let buttons = options(&doc);
        let icon = buttons[1].append(MemoryElement::new("img"));

        let panel = doc.query_selector(".js-ring-configurator-colors").unwrap();
        let found = panel.query_selector_all(".js-ring-configurator-color");
        assert_eq!(found.len(), 3);
        assert_eq!(found[2].attribute("data-color").as_deref(), Some("#000002"));

        assert!(panel.contains(&*icon));
        assert!(buttons[1].contains(&*icon));
        assert!(!buttons[0].contains(&*icon));
        assert!(same_element(&*found[0], &*buttons[0]));
        assert!(doc.query_selector(".missing").is_none());
        assert_eq!(doc.query_selector_all("body").len(), 1);
    }

    #[test]
    fn exclusive_class() {
        let doc = MemoryDocument::new();
        let buttons = options(&doc);
        let group: Vec<ElementRef> = buttons.iter().map(|b| b.clone() as ElementRef).collect();

        buttons[0].add_class("is-active");
        set_exclusive_class(&group, &*buttons[2], "is-active");

        assert!(!buttons[0].has_class("is-active"));
        assert!(!buttons[1].has_class("is-active"));
        assert!(buttons[2].has_class("is-active"));
    }

    #[test]
    fn bounding_rect_follows_scroll() {
        let doc = MemoryDocument::new();
        let section = doc
            .body()
            .append(MemoryElement::new("section").with_rect(Rect::new(0.0, 1000.0, 1280.0, 400.0)));

        assert_eq!(section.bounding_rect().top, 1000.0);
        doc.set_scroll_y(250.0);
        assert_eq!(section.bounding_rect().top, 750.0);
        assert_eq!(doc.scroll_y() + section.bounding_rect().top, 1000.0);
    }

    #[test]
    fn removed_elements_are_no_longer_found() {
        let doc = MemoryDocument::new();
        let panel = doc
            .body()
            .append(MemoryElement::new("div").with_class("js-ring-configurator-options"));
        assert!(panel.is_connected());

        panel.remove();
        assert!(!panel.is_connected());
        assert!(doc.query_selector(".js-ring-configurator-options").is_none());
    }

    #[test]
    fn downloads_are_recorded() {
        let doc = MemoryDocument::new();
        doc.download("ring-configurator.png", "image/png", &[1, 2, 3]);
        assert_eq!(doc.downloads()[0].bytes, vec![1, 2, 3]);
    }
}
