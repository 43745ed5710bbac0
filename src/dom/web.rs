use crate::dom::{Document, DomEvent, DomEvents, Element, ElementRef, EventHub, Rect};
use crate::event::Key;
use std::any::Any;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

/// An element of the browser page.
#[derive(Clone, Debug)]
pub struct WebElement {
    element: web_sys::Element,
}

impl WebElement {
    pub fn new(element: web_sys::Element) -> Self {
        WebElement { element }
    }

    /// The underlying DOM element.
    pub fn raw(&self) -> &web_sys::Element {
        &self.element
    }
}

fn collect(list: Result<web_sys::NodeList, JsValue>) -> Vec<ElementRef> {
    let Ok(list) = list else {
        return Vec::new();
    };

    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .map(|element| Rc::new(WebElement::new(element)) as ElementRef)
        .collect()
}

impl Element for WebElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn has_class(&self, class: &str) -> bool {
        self.element.class_list().contains(class)
    }

    fn add_class(&self, class: &str) {
        let _ = self.element.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.element.class_list().remove_1(class);
    }

    fn set_style(&self, property: &str, value: &str) {
        if let Some(html) = self.element.dyn_ref::<web_sys::HtmlElement>() {
            let _ = html.style().set_property(property, value);
        }
    }

    fn style(&self, property: &str) -> Option<String> {
        self.element
            .dyn_ref::<web_sys::HtmlElement>()
            .and_then(|html| html.style().get_property_value(property).ok())
            .filter(|value| !value.is_empty())
    }

    fn bounding_rect(&self) -> Rect {
        let rect = self.element.get_bounding_client_rect();
        Rect::new(
            rect.left() as f32,
            rect.top() as f32,
            rect.width() as f32,
            rect.height() as f32,
        )
    }

    fn query_selector_all(&self, selector: &str) -> Vec<ElementRef> {
        collect(self.element.query_selector_all(selector))
    }

    fn contains(&self, other: &dyn Element) -> bool {
        other
            .as_any()
            .downcast_ref::<WebElement>()
            .is_some_and(|other| self.element.contains(Some(other.element.as_ref())))
    }

    fn remove(&self) {
        self.element.remove();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The browser page.
///
/// Creating a `WebDocument` installs page-level listeners (clicks, key releases, pointer
/// moves, wheel, scroll and resize) that feed every [`DomEvents`] subscriber.
pub struct WebDocument {
    window: web_sys::Window,
    document: web_sys::Document,
    hub: Rc<EventHub>,
    _closures: Vec<JsValue>,
}

impl std::fmt::Debug for WebDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDocument")
            .field("subscribers", &self.hub.len())
            .finish()
    }
}

impl WebDocument {
    /// The page of the current browser window, or `None` outside a browser.
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let hub = Rc::new(EventHub::new());
        let mut closures: Vec<JsValue> = Vec::new();

        {
            let hub = hub.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                if let Some(element) = event
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                {
                    hub.dispatch(DomEvent::Click(Rc::new(WebElement::new(element))));
                }
            });
            let _ = document
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closures.push(closure.into_js_value());
        }

        {
            let hub = hub.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                hub.dispatch(DomEvent::KeyUp {
                    key: Key::from_code(&event.code()),
                    alt: event.alt_key(),
                });
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closures.push(closure.into_js_value());
        }

        {
            let hub = hub.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                hub.dispatch(DomEvent::MouseMove {
                    x: event.client_x() as f32,
                    y: event.client_y() as f32,
                });
            });
            let _ = window
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closures.push(closure.into_js_value());
        }

        {
            let hub = hub.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::WheelEvent| {
                hub.dispatch(DomEvent::Wheel {
                    delta_y: event.delta_y() as f32,
                });
            });
            let _ =
                window.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
            closures.push(closure.into_js_value());
        }

        for (name, event) in [("scroll", DomEvent::Scroll), ("resize", DomEvent::Resize)] {
            let hub = hub.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_: web_sys::Event| {
                hub.dispatch(event.clone());
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closures.push(closure.into_js_value());
        }

        Some(WebDocument {
            window,
            document,
            hub,
            _closures: closures,
        })
    }
}

impl Document for WebDocument {
    fn query_selector(&self, selector: &str) -> Option<ElementRef> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .map(|element| Rc::new(WebElement::new(element)) as ElementRef)
    }

    fn query_selector_all(&self, selector: &str) -> Vec<ElementRef> {
        collect(self.document.query_selector_all(selector))
    }

    fn scroll_y(&self) -> f32 {
        self.window.scroll_y().unwrap_or(0.0) as f32
    }

    fn viewport_size(&self) -> (f32, f32) {
        let width = self.window.inner_width().ok().and_then(|w| w.as_f64());
        let height = self.window.inner_height().ok().and_then(|h| h.as_f64());
        (width.unwrap_or(0.0) as f32, height.unwrap_or(0.0) as f32)
    }

    fn subscribe(&self) -> DomEvents {
        self.hub.subscribe()
    }

    fn download(&self, file_name: &str, mime: &str, bytes: &[u8]) {
        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
        let options = web_sys::BlobPropertyBag::new();
        options.set_type(mime);

        let url = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .and_then(|blob| web_sys::Url::create_object_url_with_blob(&blob));
        let Ok(url) = url else {
            log::error!("Could not create a download URL for {}.", file_name);
            return;
        };

        let link = self
            .document
            .create_element("a")
            .ok()
            .and_then(|a| a.dyn_into::<web_sys::HtmlAnchorElement>().ok());

        if let (Some(link), Some(body)) = (link, self.document.body()) {
            link.set_href(&url);
            link.set_download(file_name);
            let _ = link.class_list().add_1("is-visually-hidden");
            let _ = body.append_child(&link);
            link.click();
            link.remove();
        }

        let _ = web_sys::Url::revoke_object_url(&url);
    }
}
