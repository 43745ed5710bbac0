use showroom::prelude::*;
use showroom::dom::MemoryElement;
use web_time::Instant;

const CATALOG: &str = r#"[
    {
        "id": "boucle",
        "base": "textures/boucle/base.jpg", "ao": "textures/boucle/ao.jpg",
        "norm": "textures/boucle/norm.jpg", "rough": "textures/boucle/rough.jpg"
    }
]"#;

async fn run() {
    let catalog = match AppearanceCatalog::from_json(CATALOG) {
        Ok(catalog) => catalog,
        Err(e) => return log::error!("{}", e),
    };

    let doc = MemoryDocument::new();
    let _ = doc
        .body()
        .append(MemoryElement::new("div").with_class("js-fabric-viewer"));
    let _ = doc.body().append(
        MemoryElement::new("button")
            .with_class("js-furniture-configurator-option")
            .with_attribute("data-texture-appearance-set", "boucle")
            .with_attribute("data-texture-base", "textures/boucle/base.jpg"),
    );

    let source = Rc::new(FileSource::new("assets"));
    let mut viewer = ViewerController::new(ViewerConfig::fabric(), catalog, source);
    viewer.initialize(&doc, Instant::now());

    let mut window = match Window::new_with_size("Showroom: fabric", 1024, 768).await {
        Ok(window) => window,
        Err(e) => return log::error!("{}", e),
    };

    while window.render(&mut viewer, &doc).await {}
}

fn main() {
    env_logger::init();
    showroom::pollster::block_on(run());
}
