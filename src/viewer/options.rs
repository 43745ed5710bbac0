//! The option controls of a viewer, read from page markup.

use crate::camera::CameraView;
use crate::color::{self, Color};
use crate::dom::{Document, ElementRef};
use crate::error::ConfigError;
use crate::viewer::Selectors;

/// The class marking the selected option of a group.
pub const ACTIVE_CLASS: &str = "is-active";
/// The class showing the option panel.
pub const VISIBLE_CLASS: &str = "is-visible";

/// The UV repeat of an appearance: `base * additional`, where a missing, zero or NaN
/// `additional` counts as `1`.
///
/// ```
/// # use showroom::viewer::effective_repeat;
/// assert_eq!(effective_repeat(1.0, Some(2.5)), 2.5);
/// assert_eq!(effective_repeat(0.5, Some(0.0)), 0.5);
/// assert_eq!(effective_repeat(2.0, None), 2.0);
/// ```
pub fn effective_repeat(base: f32, additional: Option<f32>) -> f32 {
    match additional {
        Some(a) if a != 0.0 && !a.is_nan() => base * a,
        _ => base,
    }
}

fn required(element: &ElementRef, selector: &str, attribute: &str) -> Result<String, ConfigError> {
    element
        .attribute(attribute)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingAttribute {
            element: selector.to_string(),
            attribute: attribute.to_string(),
        })
}

/// A texture option: `data-texture-appearance-set`, `data-texture-base` and an optional
/// `data-additional-scale`.
#[derive(Clone, Debug)]
pub struct TextureOption {
    pub element: ElementRef,
    pub appearance_set: String,
    pub base: String,
    pub additional_scale: Option<f32>,
}

impl TextureOption {
    pub fn parse(element: ElementRef, selector: &str) -> Result<Self, ConfigError> {
        let appearance_set = required(&element, selector, "data-texture-appearance-set")?;
        let base = required(&element, selector, "data-texture-base")?;
        let additional_scale = element
            .attribute("data-additional-scale")
            .and_then(|s| s.trim().parse::<f32>().ok());

        Ok(TextureOption {
            element,
            appearance_set,
            base,
            additional_scale,
        })
    }
}

/// An environment light option, `data-light` naming the preset (`neutral` by default).
#[derive(Clone, Debug)]
pub struct LightOption {
    pub element: ElementRef,
    pub light: String,
}

/// A metal color option: `data-color` and the JSON list of node names in
/// `data-model-object`.
#[derive(Clone, Debug)]
pub struct ColorOption {
    pub element: ElementRef,
    pub color: Color,
    pub objects: Vec<String>,
}

impl ColorOption {
    pub fn parse(element: ElementRef, selector: &str) -> Result<Self, ConfigError> {
        let color = color::parse(&required(&element, selector, "data-color")?)?;
        let objects = match element.attribute("data-model-object") {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };

        Ok(ColorOption {
            element,
            color,
            objects,
        })
    }
}

/// A camera preset, `data-camera-position` holding a [`CameraView`] in JSON.
#[derive(Clone, Debug)]
pub struct SceneOption {
    pub element: ElementRef,
    pub view: CameraView,
}

impl SceneOption {
    pub fn parse(element: ElementRef, selector: &str) -> Result<Self, ConfigError> {
        let view = serde_json::from_str(&required(&element, selector, "data-camera-position")?)?;
        Ok(SceneOption { element, view })
    }
}

/// Every control of a viewer found in the page.
#[derive(Clone, Debug, Default)]
pub struct ViewerOptions {
    pub textures: Vec<TextureOption>,
    pub lights: Vec<LightOption>,
    /// Color options, one group per `.js-ring-configurator-colors` element.
    pub colors: Vec<Vec<ColorOption>>,
    pub scenes: Vec<SceneOption>,
    pub room_toggle: Option<ElementRef>,
    pub screenshot: Option<ElementRef>,
    pub panel: Option<ElementRef>,
    /// `(object, text)` from the engraving element.
    pub engraving: Option<(Option<String>, String)>,
}

impl ViewerOptions {
    /// Collects the controls of the page. Malformed options are skipped with a warning.
    pub fn from_document(document: &dyn Document, selectors: &Selectors) -> Self {
        fn parse_all<T>(
            elements: Vec<ElementRef>,
            selector: &str,
            parse: impl Fn(ElementRef, &str) -> Result<T, ConfigError>,
        ) -> Vec<T> {
            elements
                .into_iter()
                .filter_map(|e| match parse(e, selector) {
                    Ok(option) => Some(option),
                    Err(err) => {
                        log::warn!("Skipping option: {}", err);
                        None
                    }
                })
                .collect()
        }

        let textures = parse_all(
            document.query_selector_all(&selectors.texture_option),
            &selectors.texture_option,
            TextureOption::parse,
        );

        let lights = document
            .query_selector_all(&selectors.light_option)
            .into_iter()
            .map(|element| LightOption {
                light: element
                    .attribute("data-light")
                    .filter(|l| !l.is_empty())
                    .unwrap_or_else(|| "neutral".to_string()),
                element,
            })
            .collect();

        let colors = document
            .query_selector_all(&selectors.color_group)
            .into_iter()
            .map(|group| {
                parse_all(
                    group.query_selector_all(&selectors.color_option),
                    &selectors.color_option,
                    ColorOption::parse,
                )
            })
            .filter(|group| !group.is_empty())
            .collect();

        let scenes = parse_all(
            document.query_selector_all(&selectors.scene_option),
            &selectors.scene_option,
            SceneOption::parse,
        );

        let mut panel = document.query_selector(&selectors.panel);
        if let Some(p) = &panel {
            if p.attribute("data-show").as_deref() == Some("false") {
                p.remove();
                panel = None;
            }
        }

        let engraving = document.query_selector(&selectors.engraving).and_then(|e| {
            let text = e.attribute("data-engraving-text")?;
            Some((e.attribute("data-engraving-object"), text))
        });

        ViewerOptions {
            textures,
            lights,
            colors,
            scenes,
            room_toggle: document.query_selector(&selectors.room_toggle),
            screenshot: document.query_selector(&selectors.screenshot),
            panel,
            engraving,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDocument, MemoryElement};

    #[test]
    fn repeat_table() {
        let cases = [
            (1.0, Some(2.5), 2.5),
            (0.5, Some(0.0), 0.5),
            (0.5, Some(-0.0), 0.5),
            (2.0, Some(f32::NAN), 2.0),
            (1.5, None, 1.5),
            (1.0, Some(2.0), 2.0),
        ];

        for (base, additional, expected) in cases {
            assert_eq!(effective_repeat(base, additional), expected);
        }
    }

    #[test]
    fn texture_options_require_set_and_base() {
        let doc = MemoryDocument::new();
        let body = doc.body();
        let _ = body.append(
            MemoryElement::new("button")
                .with_class("js-furniture-configurator-option")
                .with_attribute("data-texture-appearance-set", "set1")
                .with_attribute("data-texture-base", "a.jpg")
                .with_attribute("data-additional-scale", "2"),
        );
        let _ = body.append(
            MemoryElement::new("button")
                .with_class("js-furniture-configurator-option")
                .with_attribute("data-texture-appearance-set", "set2"),
        );
        let _ = body.append(
            MemoryElement::new("button")
                .with_class("js-furniture-configurator-option")
                .with_attribute("data-texture-appearance-set", "set3")
                .with_attribute("data-texture-base", "c.jpg")
                .with_attribute("data-additional-scale", "wide"),
        );

        let options = ViewerOptions::from_document(&doc, &Selectors::default());
        assert_eq!(options.textures.len(), 2);
        assert_eq!(options.textures[0].base, "a.jpg");
        assert_eq!(options.textures[0].additional_scale, Some(2.0));
        assert_eq!(options.textures[1].appearance_set, "set3");
        assert_eq!(options.textures[1].additional_scale, None);
    }

    #[test]
    fn ring_controls() {
        let doc = MemoryDocument::new();
        let body = doc.body();
        let group = body.append(MemoryElement::new("ul").with_class("js-ring-configurator-colors"));
        let _ = group.append(
            MemoryElement::new("li")
                .with_class("js-ring-configurator-color")
                .with_attribute("data-color", "#d4af37")
                .with_attribute("data-model-object", r#"["Band", "Prongs"]"#),
        );
        let _ = group.append(MemoryElement::new("li").with_class("js-ring-configurator-color"));
        let _ = body.append(
            MemoryElement::new("button")
                .with_class("js-ring-configurator-scene")
                .with_attribute("data-camera-position", r#"{ "position": [0, 4, 12] }"#),
        );
        let _ = body.append(
            MemoryElement::new("div")
                .with_class("js-ring-configurator-options")
                .with_attribute("data-show", "false"),
        );
        let _ = body.append(
            MemoryElement::new("span")
                .with_class("js-ring-configurator-engraving-text")
                .with_attribute("data-engraving-text", "Forever")
                .with_attribute("data-engraving-object", "Engraving"),
        );

        let options = ViewerOptions::from_document(&doc, &Selectors::default());
        assert_eq!(options.colors.len(), 1);
        assert_eq!(options.colors[0].len(), 1);
        assert_eq!(options.colors[0][0].objects, vec!["Band", "Prongs"]);
        assert_eq!(options.scenes[0].view.position.z, 12.0);
        assert!(options.panel.is_none());
        assert!(doc.query_selector(".js-ring-configurator-options").is_none());
        assert_eq!(
            options.engraving,
            Some((Some("Engraving".to_string()), "Forever".to_string()))
        );
    }

    #[test]
    fn light_options_default_to_neutral() {
        let doc = MemoryDocument::new();
        let _ = doc.body().append(
            MemoryElement::new("button").with_class("js-furniture-configurator-light-option"),
        );
        let _ = doc.body().append(
            MemoryElement::new("button")
                .with_class("js-furniture-configurator-light-option")
                .with_attribute("data-light", "warm"),
        );

        let options = ViewerOptions::from_document(&doc, &Selectors::default());
        let names: Vec<_> = options.lights.iter().map(|l| l.light.as_str()).collect();
        assert_eq!(names, vec!["neutral", "warm"]);
    }
}
