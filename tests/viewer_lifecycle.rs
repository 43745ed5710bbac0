mod common;

use common::{catalog, furniture, png, source, CHAIR};
use showroom::asset::MemorySource;
use showroom::color;
use showroom::dom::{Document, Element, MemoryDocument, MemoryElement};
use showroom::error::AssetError;
use showroom::event::Key;
use showroom::glamx::Vec3;
use showroom::viewer::{
    EnvLight, ViewerConfig, ViewerController, ViewerState, ACTIVE_CLASS, SCREENSHOT_FILE,
    VISIBLE_CLASS,
};
use std::rc::Rc;
use std::time::Duration;
use web_time::Instant;

fn ring_source() -> Rc<MemorySource> {
    let source = source();
    let ring = CHAIR.replace("\"body\"", "\"band\"").replace("\"room\"", "\"stone\"");
    source.insert("ring.gltf", ring.into_bytes());
    source
}

fn ring() -> ViewerConfig {
    ViewerConfig::ring()
        .with_element_selector(".ring")
        .with_model("ring.gltf", &[])
}

struct RingPage {
    doc: MemoryDocument,
    gold: Rc<MemoryElement>,
    silver: Rc<MemoryElement>,
    top_view: Rc<MemoryElement>,
    screenshot: Rc<MemoryElement>,
}

fn ring_page() -> RingPage {
    let doc = MemoryDocument::new();
    let _ = doc.body().append(MemoryElement::new("div").with_class("ring"));

    let panel = doc
        .body()
        .append(MemoryElement::new("div").with_class("js-ring-configurator-options"));
    let colors = panel.append(MemoryElement::new("ul").with_class("js-ring-configurator-colors"));
    let gold = colors.append(
        MemoryElement::new("li")
            .with_class("js-ring-configurator-color")
            .with_attribute("data-color", "#ffd700")
            .with_attribute("data-model-object", r#"["band"]"#),
    );
    let silver = colors.append(
        MemoryElement::new("li")
            .with_class("js-ring-configurator-color")
            .with_attribute("data-color", "#c0c0c0")
            .with_attribute("data-model-object", r#"["band"]"#),
    );
    let top_view = panel.append(
        MemoryElement::new("button")
            .with_class("js-ring-configurator-scene")
            .with_attribute("data-camera-position", r#"{ "position": [0, 15, 5], "target": [0, 0, 0] }"#),
    );
    let screenshot = panel.append(
        MemoryElement::new("button").with_class("js-ring-configurator-screenshot"),
    );
    let _ = panel.append(
        MemoryElement::new("p")
            .with_class("js-ring-configurator-engraving-text")
            .with_attribute("data-engraving-text", "Forever"),
    );

    RingPage {
        doc,
        gold,
        silver,
        top_view,
        screenshot,
    }
}

fn forward(viewer: &mut ViewerController, doc: &dyn Document, events: &showroom::dom::DomEvents, now: Instant) {
    for event in events.drain() {
        viewer.handle_dom_event(&event, doc, now);
    }
}

#[test]
fn viewer_without_element_does_nothing() {
    let doc = MemoryDocument::new();
    let events = doc.subscribe();
    let now = Instant::now();
    let source = source();
    let mut viewer = ViewerController::new(furniture(), catalog(), source.clone());
    viewer.initialize(&doc, now);

    assert!(viewer.is_inert());
    assert!(source.requests().is_empty());

    doc.key_up(Key::O, true);
    forward(&mut viewer, &doc, &events, now);
    viewer.screenshot();
    viewer.toggle_room();
    viewer.set_env_light("warm", now);

    assert!(!viewer.take_screenshot_request());
    assert!(!viewer.update(now));
    assert!(viewer.scene().children().is_empty());
    assert_eq!(*viewer.state(), ViewerState::Uninitialized);
}

#[test]
fn color_options_paint_the_named_objects() {
    let page = ring_page();
    let events = page.doc.subscribe();
    let now = Instant::now();
    let mut viewer = ViewerController::new(ring(), catalog(), ring_source());
    viewer.initialize(&page.doc, now);
    let _ = viewer.update(now);
    assert!(viewer.state().is_ready());

    let band = viewer.scene().find_by_name("band").unwrap();
    let stone = viewer.scene().find_by_name("stone").unwrap();
    let stone_color = stone.material().unwrap().borrow().color;

    page.doc.click(&page.gold);
    forward(&mut viewer, &page.doc, &events, now);
    assert_eq!(band.material().unwrap().borrow().color, color::from_hex(0xffd700));
    assert_eq!(stone.material().unwrap().borrow().color, stone_color);
    assert!(page.gold.has_class(ACTIVE_CLASS));

    page.doc.click(&page.silver);
    forward(&mut viewer, &page.doc, &events, now);
    assert_eq!(band.material().unwrap().borrow().color, color::from_hex(0xc0c0c0));
    assert!(!page.gold.has_class(ACTIVE_CLASS));
    assert!(page.silver.has_class(ACTIVE_CLASS));
}

#[test]
fn camera_views_are_tweened() {
    let page = ring_page();
    let events = page.doc.subscribe();
    let now = Instant::now();
    let mut viewer = ViewerController::new(ring(), catalog(), ring_source());
    viewer.initialize(&page.doc, now);
    let _ = viewer.update(now);
    let start = viewer.camera().view().position;
    let target = Vec3::new(0.0, 15.0, 5.0);

    page.doc.click(&page.top_view);
    forward(&mut viewer, &page.doc, &events, now);
    assert!(page.top_view.has_class(ACTIVE_CLASS));

    let _ = viewer.update(now + Duration::from_millis(500));
    let halfway = viewer.camera().view().position;
    assert!(halfway.distance(start) > 1.0e-3);
    assert!(halfway.distance(target) > 1.0e-3);

    let _ = viewer.update(now + Duration::from_millis(1100));
    assert!(viewer.camera().view().position.distance(target) < 1.0e-3);
}

#[test]
fn screenshot_button_downloads_a_png() {
    let page = ring_page();
    let events = page.doc.subscribe();
    let now = Instant::now();
    let mut viewer = ViewerController::new(ring(), catalog(), ring_source());
    viewer.initialize(&page.doc, now);
    let _ = viewer.update(now);
    assert_eq!(viewer.engraving(), Some("Forever"));

    page.doc.click(&page.screenshot);
    forward(&mut viewer, &page.doc, &events, now);
    assert!(viewer.take_screenshot_request());

    let png = showroom::window::encode_png(1, 1, vec![10, 20, 30, 255]).unwrap();
    viewer.save_screenshot(&page.doc, &png);

    let downloads = page.doc.downloads();
    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].file_name, SCREENSHOT_FILE);
    assert_eq!(downloads[0].mime, "image/png");
    assert_eq!(downloads[0].bytes, png);
}

#[test]
fn alt_o_toggles_the_option_panel() {
    let page = ring_page();
    let events = page.doc.subscribe();
    let now = Instant::now();
    let mut viewer = ViewerController::new(ring(), catalog(), ring_source());
    viewer.initialize(&page.doc, now);
    let _ = viewer.update(now);
    let panel = page.doc.query_selector(".js-ring-configurator-options").unwrap();

    page.doc.key_up(Key::O, false);
    forward(&mut viewer, &page.doc, &events, now);
    assert!(!panel.has_class(VISIBLE_CLASS));

    page.doc.key_up(Key::O, true);
    forward(&mut viewer, &page.doc, &events, now);
    assert!(panel.has_class(VISIBLE_CLASS));

    page.doc.key_up(Key::O, true);
    forward(&mut viewer, &page.doc, &events, now);
    assert!(!panel.has_class(VISIBLE_CLASS));
}

#[test]
fn hidden_panel_is_removed() {
    let page = ring_page();
    let panel = page.doc.query_selector(".js-ring-configurator-options").unwrap();
    if let Some(panel) = panel.as_any().downcast_ref::<MemoryElement>() {
        panel.set_attribute("data-show", "false");
    }

    let now = Instant::now();
    let mut viewer = ViewerController::new(ring(), catalog(), ring_source());
    viewer.initialize(&page.doc, now);

    assert!(viewer.options().panel.is_none());
    assert!(page
        .doc
        .query_selector(".js-ring-configurator-options")
        .is_none());
}

#[test]
fn room_toggle_shows_the_hidden_room() {
    let doc = MemoryDocument::new();
    let _ = doc.body().append(MemoryElement::new("div").with_class("viewer"));
    let toggle = doc.body().append(
        MemoryElement::new("button").with_class("js-configurator-viewer-toggle-room"),
    );
    let events = doc.subscribe();
    let now = Instant::now();
    let mut viewer = ViewerController::new(furniture(), catalog(), source());
    viewer.initialize(&doc, now);
    let _ = viewer.update(now);

    let room = viewer.scene().find_by_name("room").unwrap();
    assert!(!room.is_visible());

    doc.click(&toggle);
    forward(&mut viewer, &doc, &events, now);
    assert!(room.is_visible());
    assert!(toggle.has_class(ACTIVE_CLASS));

    doc.click(&toggle);
    forward(&mut viewer, &doc, &events, now);
    assert!(!room.is_visible());
    assert!(!toggle.has_class(ACTIVE_CLASS));
}

#[test]
fn light_options_switch_the_environment() {
    let doc = MemoryDocument::new();
    let _ = doc.body().append(MemoryElement::new("div").with_class("viewer"));
    let warm = doc.body().append(
        MemoryElement::new("button")
            .with_class("js-furniture-configurator-light-option")
            .with_attribute("data-light", "warm"),
    );
    let neutral = doc.body().append(
        MemoryElement::new("button").with_class("js-furniture-configurator-light-option"),
    );

    let source = source();
    source.insert("env/warm.png", png([255, 226, 192]));
    source.insert("env/neutral.png", png([255, 255, 255]));
    let config = furniture()
        .with_env_light("warm", EnvLight::new("env/warm.png", "#ffe2c0"))
        .with_env_light("neutral", EnvLight::new("env/neutral.png", "#ffffff"));

    let events = doc.subscribe();
    let now = Instant::now();
    let mut viewer = ViewerController::new(config, catalog(), source);
    viewer.initialize(&doc, now);
    let _ = viewer.update(now);

    doc.click(&warm);
    forward(&mut viewer, &doc, &events, now);
    assert_eq!(viewer.env_light(), Some("warm"));
    assert!(warm.has_class(ACTIVE_CLASS));

    doc.click(&neutral);
    forward(&mut viewer, &doc, &events, now);
    assert_eq!(viewer.env_light(), Some("neutral"));
    assert!(!warm.has_class(ACTIVE_CLASS));
    assert!(neutral.has_class(ACTIVE_CLASS));
}

#[test]
fn teardown_cancels_the_model_load() {
    let doc = MemoryDocument::new();
    let _ = doc.body().append(MemoryElement::new("div").with_class("viewer"));
    let source = source();
    source.set_deferred(true);
    let now = Instant::now();
    let mut viewer = ViewerController::new(furniture(), catalog(), source.clone());
    viewer.initialize(&doc, now);

    let mut model = viewer.load_asset("chair.gltf", now);
    assert!(model.try_take().is_none());

    viewer.teardown();
    assert!(matches!(model.try_take(), Some(Err(AssetError::Cancelled))));

    let _ = source.flush();
    let _ = viewer.update(now);
    assert!(viewer.model().is_none());
}
