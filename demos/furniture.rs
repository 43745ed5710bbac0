use showroom::prelude::*;
use showroom::dom::MemoryElement;
use std::time::Duration;
use web_time::Instant;

const CATALOG: &str = r#"{
    "linen": {
        "base": "textures/linen/base.jpg", "ao": "textures/linen/ao.jpg",
        "norm": "textures/linen/norm.jpg", "rough": "textures/linen/rough.jpg"
    },
    "velvet": {
        "base": "textures/velvet/base.jpg", "ao": "textures/velvet/ao.jpg",
        "norm": "textures/velvet/norm.jpg", "rough": "textures/velvet/rough.jpg",
        "height": "textures/velvet/height.jpg"
    }
}"#;

fn page() -> (MemoryDocument, Vec<Rc<MemoryElement>>) {
    let doc = MemoryDocument::new();
    let _ = doc
        .body()
        .append(MemoryElement::new("div").with_class("js-furniture-configurator"));

    let options = [("linen", "1"), ("velvet", "2.5")]
        .iter()
        .map(|(set, scale)| {
            doc.body().append(
                MemoryElement::new("button")
                    .with_class("js-furniture-configurator-option")
                    .with_attribute("data-texture-appearance-set", set)
                    .with_attribute("data-texture-base", &format!("textures/{}/base.jpg", set))
                    .with_attribute("data-additional-scale", scale),
            )
        })
        .collect();

    (doc, options)
}

async fn run() {
    let catalog = match AppearanceCatalog::from_json(CATALOG) {
        Ok(catalog) => catalog,
        Err(e) => return log::error!("{}", e),
    };
    let (doc, options) = page();
    let source = Rc::new(FileSource::new("assets"));
    let mut viewer = ViewerController::new(ViewerConfig::furniture(), catalog, source);
    viewer.initialize(&doc, Instant::now());

    let mut window = match Window::new("Showroom: furniture").await {
        Ok(window) => window,
        Err(e) => return log::error!("{}", e),
    };

    // Cycle through the swatches as a visitor would.
    let mut next_click = Instant::now() + Duration::from_secs(3);
    let mut current = 0;

    while window.render(&mut viewer, &doc).await {
        if Instant::now() >= next_click {
            current = (current + 1) % options.len();
            doc.click(&options[current]);
            next_click += Duration::from_secs(3);
        }
    }

    viewer.teardown();
}

fn main() {
    env_logger::init();
    showroom::pollster::block_on(run());
}
