use showroom::dom::{MemoryElement, Rect};
use showroom::prelude::*;
use web_time::Instant;

const SECTION_HEIGHT: f32 = 800.0;

/// A page of three full-height sections, each bound to a camera view.
fn page() -> MemoryDocument {
    let doc = MemoryDocument::new();
    let _ = doc
        .body()
        .append(MemoryElement::new("div").with_class("js-fabric-viewer"));

    for key in 0..3 {
        let top = SECTION_HEIGHT * (key + 1) as f32;
        let _ = doc.body().append(
            MemoryElement::new("section")
                .with_class(&format!("js-webgi-camera-view-{}", key))
                .with_rect(Rect::new(0.0, top, 1280.0, SECTION_HEIGHT)),
        );
    }

    doc
}

async fn run() {
    let doc = page();
    let source = Rc::new(FileSource::new("assets"));
    let config = ViewerConfig::fabric();
    let initial = config.camera.view;
    let mut viewer = ViewerController::new(config, AppearanceCatalog::new(), source);
    viewer.initialize(&doc, Instant::now());
    viewer.camera_mut().set_auto_rotate(None);

    let views = [
        CameraView::new(Vec3::new(8.0, 3.0, 8.0), Vec3::new(0.0, 2.5, 0.0)),
        CameraView::new(Vec3::new(0.0, 12.0, 6.0), Vec3::new(0.0, 2.5, 0.0)),
        CameraView::new(Vec3::new(-6.0, 2.5, 6.0), Vec3::new(0.0, 2.5, 0.0)),
    ];
    let mut path = CameraPathAnimator::from_document(&doc, initial, &views);
    let events = doc.subscribe();

    let mut window = match Window::new("Showroom: scroll").await {
        Ok(window) => window,
        Err(e) => return log::error!("{}", e),
    };

    let start = Instant::now();
    let page_height = SECTION_HEIGHT * (views.len() + 1) as f32;

    while window.render(&mut viewer, &doc).await {
        // Scroll the page down and up again, 20 seconds a round trip.
        let t = start.elapsed().as_secs_f32() / 10.0;
        let phase = 1.0 - (t % 2.0 - 1.0).abs();
        doc.set_scroll_y(phase * page_height);

        let now = Instant::now();
        for event in events.drain() {
            path.handle_event(&event, &doc, now);
        }

        if path.update(now) {
            viewer.camera_mut().set_view(&path.view());
            viewer.request_redraw();
        }
    }
}

fn main() {
    env_logger::init();
    showroom::pollster::block_on(run());
}
