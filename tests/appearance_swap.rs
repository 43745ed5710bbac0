mod common;

use common::{catalog, furniture, page, source};
use showroom::dom::{Document, Element};
use showroom::glamx::Vec2;
use showroom::resource::{MapSlot, TextureFilter};
use showroom::viewer::{ViewerController, ViewerState, ACTIVE_CLASS, LOADING_CLASS};
use std::rc::Rc;
use std::time::Duration;
use web_time::Instant;

fn forward(viewer: &mut ViewerController, doc: &dyn Document, events: &showroom::dom::DomEvents) {
    let now = Instant::now();
    for event in events.drain() {
        viewer.handle_dom_event(&event, doc, now);
    }
}

#[test]
fn clicking_an_option_swaps_its_base_and_repeat() {
    let (doc, options) = page(&[
        ("set1", "set1/base.png", None),
        ("set1", "a.jpg", Some("2")),
    ]);
    let events = doc.subscribe();
    let now = Instant::now();
    let mut viewer = ViewerController::new(furniture(), catalog(), source());
    viewer.initialize(&doc, now);
    let _ = viewer.update(now);

    // The first option is applied on load without being marked.
    assert_eq!(viewer.appearance(), Some("set1"));
    assert!(options.iter().all(|o| !o.has_class(ACTIVE_CLASS)));

    doc.click(&options[1]);
    forward(&mut viewer, &doc, &events);

    assert!(!options[0].has_class(ACTIVE_CLASS));
    assert!(options[1].has_class(ACTIVE_CLASS));

    let material = viewer.material().unwrap().borrow();
    let base = material.map(MapSlot::Base).unwrap();
    assert_eq!(&base.image.pixels()[..4], &[255, 0, 0, 255]);
    assert_eq!(base.repeat, Vec2::new(2.0, 2.0));
    assert!(material.maps().all(|(_, b)| b.repeat == Vec2::splat(2.0)));
}

#[test]
fn active_class_stays_exclusive() {
    let (doc, options) = page(&[
        ("set1", "set1/base.png", None),
        ("set2", "set2/base.png", None),
        ("set1", "a.jpg", None),
    ]);
    let events = doc.subscribe();
    let now = Instant::now();
    let mut viewer = ViewerController::new(furniture(), catalog(), source());
    viewer.initialize(&doc, now);
    let _ = viewer.update(now);

    for clicked in [1, 2, 0, 2] {
        doc.click(&options[clicked]);
        forward(&mut viewer, &doc, &events);

        let active: Vec<_> = options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.has_class(ACTIVE_CLASS))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(active, vec![clicked]);
    }
}

#[test]
fn optional_maps_are_cleared_by_sets_without_them() {
    let (doc, _) = page(&[]);
    let now = Instant::now();
    let mut viewer = ViewerController::new(furniture(), catalog(), source());
    viewer.initialize(&doc, now);
    let _ = viewer.update(now);

    viewer.set_appearance("set2", None, now).unwrap();
    {
        let material = viewer.material().unwrap().borrow();
        assert_eq!(material.maps().count(), 6);
        assert!(material.map(MapSlot::Height).is_some());
    }

    viewer.set_appearance("set1", None, now).unwrap();
    let material = viewer.material().unwrap().borrow();
    assert_eq!(material.maps().count(), 4);
    assert!(material.map(MapSlot::Height).is_none());
    assert!(material.map(MapSlot::Metalness).is_none());
}

#[test]
fn missing_optional_map_still_applies_the_set() {
    let (doc, _) = page(&[]);
    let source = source();
    let mut catalog = catalog();
    let mut set = catalog.get("set2").unwrap().clone();
    set.height = Some("nowhere/height.png".to_string());
    catalog.insert("set3", set);

    let now = Instant::now();
    let mut viewer = ViewerController::new(furniture(), catalog, source);
    viewer.initialize(&doc, now);
    let _ = viewer.update(now);

    viewer.set_appearance("set3", None, now).unwrap();
    assert_eq!(viewer.appearance(), Some("set3"));
    let material = viewer.material().unwrap().borrow();
    assert_eq!(material.maps().count(), 5);
    assert!(material.map(MapSlot::Height).is_none());
}

#[test]
fn loaded_textures_are_reused() {
    let (doc, _) = page(&[]);
    let source = source();
    let now = Instant::now();
    let mut viewer = ViewerController::new(furniture(), catalog(), source.clone());
    viewer.initialize(&doc, now);
    let _ = viewer.update(now);

    viewer.set_appearance("set1", None, now).unwrap();
    let requests = source.requests().len();
    viewer.set_appearance("set2", None, now).unwrap();
    viewer.set_appearance("set1", Some(3.0), now).unwrap();

    // Only set2 was fetched in between.
    assert_eq!(source.requests().len(), requests + 6);
    let material = viewer.material().unwrap().borrow();
    assert_eq!(material.repeat(), Some(Vec2::splat(3.0)));
}

#[test]
fn zero_additional_scale_keeps_the_base_scale() {
    let (doc, options) = page(&[("set1", "set1/base.png", Some("0"))]);
    let events = doc.subscribe();
    let now = Instant::now();
    let mut viewer =
        ViewerController::new(furniture().with_texture_scale(1.5), catalog(), source());
    viewer.initialize(&doc, now);
    let _ = viewer.update(now);

    doc.click(&options[0]);
    forward(&mut viewer, &doc, &events);

    let material = viewer.material().unwrap().borrow();
    assert_eq!(material.repeat(), Some(Vec2::splat(1.5)));
}

#[test]
fn clicks_before_the_model_are_ignored() {
    let (doc, options) = page(&[("set1", "a.jpg", Some("2"))]);
    let source = source();
    source.set_deferred(true);
    let events = doc.subscribe();
    let now = Instant::now();
    let mut viewer = ViewerController::new(furniture(), catalog(), source.clone());
    viewer.initialize(&doc, now);

    doc.click(&options[0]);
    forward(&mut viewer, &doc, &events);
    assert!(!options[0].has_class(ACTIVE_CLASS));
    assert_eq!(*viewer.state(), ViewerState::LoadingAsset);

    let _ = source.flush();
    let _ = viewer.update(now);
    assert_eq!(*viewer.state(), ViewerState::SwappingAppearance);
    let _ = source.flush();
    let _ = viewer.update(now);
    assert!(viewer.state().is_ready());
    assert_eq!(viewer.appearance(), Some("set1"));
}

#[test]
fn swap_waits_for_every_map() {
    let (doc, _) = page(&[]);
    let source = source();
    let now = Instant::now();
    let mut viewer = ViewerController::new(furniture(), catalog(), source.clone());
    viewer.initialize(&doc, now);
    let _ = viewer.update(now);
    let element = viewer.element().unwrap().clone();

    source.set_deferred(true);
    viewer.set_appearance("set2", None, now).unwrap();
    assert_eq!(*viewer.state(), ViewerState::SwappingAppearance);
    assert!(element.has_class(LOADING_CLASS));
    assert_eq!(viewer.material().unwrap().borrow().maps().count(), 0);

    let _ = source.flush();
    let later = now + Duration::from_secs(1);
    let _ = viewer.update(later);
    assert!(viewer.state().is_ready());
    assert_eq!(viewer.material().unwrap().borrow().maps().count(), 6);
    assert!(!element.has_class(LOADING_CLASS));
}

#[test]
fn shared_material_reaches_every_target() {
    let (doc, _) = page(&[]);
    let source = source();
    source.insert("two.gltf", common::CHAIR.replace("\"room\"", "\"seat\"").into_bytes());

    let now = Instant::now();
    let config = furniture().with_model("two.gltf", &["body", "seat"]);
    let mut viewer = ViewerController::new(config, catalog(), source);
    viewer.initialize(&doc, now);
    let _ = viewer.update(now);
    viewer.set_appearance("set1", None, now).unwrap();

    assert_eq!(viewer.targets().len(), 2);
    let shared = viewer.material().unwrap();
    for target in viewer.targets() {
        assert!(Rc::ptr_eq(&target.material().unwrap(), shared));
    }
}

#[test]
fn base_map_filter_follows_the_material_config() {
    let (doc, _) = page(&[("set1", "set1/base.png", None)]);
    let mut config = furniture();
    config.material.base_filter = TextureFilter::Nearest;
    let now = Instant::now();
    let mut viewer = ViewerController::new(config, catalog(), source());
    viewer.initialize(&doc, now);
    let _ = viewer.update(now);

    let material = viewer.material().unwrap().borrow();
    let base = material.map(MapSlot::Base).unwrap();
    assert_eq!(base.filter, TextureFilter::Nearest);
    assert!(!base.mipmaps);
    for slot in [MapSlot::Ao, MapSlot::Normal, MapSlot::Roughness] {
        assert_eq!(material.map(slot).unwrap().filter, TextureFilter::Linear);
    }
}
