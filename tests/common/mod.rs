#![allow(dead_code)]

use showroom::appearance::AppearanceCatalog;
use showroom::asset::MemorySource;
use showroom::dom::{MemoryDocument, MemoryElement};
use showroom::viewer::ViewerConfig;
use std::rc::Rc;

/// A single triangle named `body`, and the same triangle named `room`.
pub const CHAIR: &str = r#"{
    "asset": { "version": "2.0" },
    "scenes": [{ "nodes": [0, 1] }],
    "nodes": [
        { "name": "body", "mesh": 0 },
        { "name": "room", "mesh": 0 }
    ],
    "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
    "buffers": [{
        "byteLength": 36,
        "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
    }],
    "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
    "accessors": [{
        "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
        "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
    }]
}"#;

/// A 2x2 PNG filled with `rgb`.
pub fn png(rgb: [u8; 3]) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(2, 2, image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn catalog() -> AppearanceCatalog {
    AppearanceCatalog::from_json(
        r#"{
            "set1": { "base": "set1/base.png", "ao": "set1/ao.png",
                      "norm": "set1/norm.png", "rough": "set1/rough.png" },
            "set2": { "base": "set2/base.png", "ao": "set2/ao.png",
                      "norm": "set2/norm.png", "rough": "set2/rough.png",
                      "height": "set2/height.png", "metal": "set2/metal.png" }
        }"#,
    )
    .unwrap()
}

/// The chair model and every texture of the catalog. `a.jpg` is red.
pub fn source() -> Rc<MemorySource> {
    let source = Rc::new(MemorySource::new());
    source.insert("chair.gltf", CHAIR.as_bytes().to_vec());
    for set in ["set1", "set2"] {
        for map in ["base", "ao", "norm", "rough", "height", "metal"] {
            source.insert(&format!("{}/{}.png", set, map), png([128, 128, 128]));
        }
    }
    source.insert("a.jpg", png([255, 0, 0]));
    source
}

pub fn furniture() -> ViewerConfig {
    ViewerConfig::furniture()
        .with_element_selector(".viewer")
        .with_model("chair.gltf", &["body"])
        .with_room(&["room"], true)
}

/// A page with the viewer element and one texture option per `(set, base, scale)`.
pub fn page(options: &[(&str, &str, Option<&str>)]) -> (MemoryDocument, Vec<Rc<MemoryElement>>) {
    let doc = MemoryDocument::new();
    let _ = doc.body().append(MemoryElement::new("div").with_class("viewer"));

    let panel = doc
        .body()
        .append(MemoryElement::new("div").with_class("swatches"));
    let options = options
        .iter()
        .map(|(set, base, scale)| {
            let mut option = MemoryElement::new("button")
                .with_class("js-furniture-configurator-option")
                .with_attribute("data-texture-appearance-set", set)
                .with_attribute("data-texture-base", base);
            if let Some(scale) = scale {
                option = option.with_attribute("data-additional-scale", scale);
            }
            panel.append(option)
        })
        .collect();

    (doc, options)
}
