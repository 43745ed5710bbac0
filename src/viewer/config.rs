use crate::camera::{CameraView, OrbitBounds};
use crate::color::{self, Color};
use crate::dom::Element;
use crate::error::ConfigError;
use crate::light::LightRig;
use crate::resource::TextureFilter;
use glamx::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f32::consts::PI;
use std::time::Duration;

/// The light rig a viewer starts with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LightPreset {
    #[default]
    Furniture,
    Fabric,
    Studio,
    None,
}

impl LightPreset {
    pub fn rig(self) -> LightRig {
        match self {
            LightPreset::Furniture => LightRig::furniture(),
            LightPreset::Fabric => LightRig::fabric(),
            LightPreset::Studio => LightRig::studio(),
            LightPreset::None => LightRig::default(),
        }
    }
}

/// An environment light preset, selected by name with
/// [`ViewerController::set_env_light`](crate::viewer::ViewerController::set_env_light).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvLight {
    /// Environment image. Once loaded, its average color tints the ambient light.
    pub url: Option<String>,
    /// Tint used until the image is available.
    pub color: String,
    pub intensity: f32,
}

impl Default for EnvLight {
    fn default() -> Self {
        EnvLight {
            url: None,
            color: "#ffffff".to_string(),
            intensity: 2.0,
        }
    }
}

impl EnvLight {
    pub fn new(url: &str, color: &str) -> Self {
        EnvLight {
            url: Some(url.to_string()),
            color: color.to_string(),
            ..EnvLight::default()
        }
    }
}

/// Camera setup of a viewer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraConfig {
    /// Vertical field of view, in degrees.
    pub fov: f32,
    pub znear: f32,
    pub zfar: f32,
    pub view: CameraView,
    pub bounds: OrbitBounds,
    pub damping: Option<f32>,
    /// Auto-rotation speed, `1.0` being one turn per minute.
    pub auto_rotate: Option<f32>,
    pub pan: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            fov: 45.0,
            znear: 0.1,
            zfar: 1024.0,
            view: CameraView::new(Vec3::new(0.0, 2.0, 8.0), Vec3::ZERO),
            bounds: OrbitBounds::default(),
            damping: Some(0.05),
            auto_rotate: None,
            pan: true,
        }
    }
}

/// A procedural model shown instead of a loaded file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Primitive {
    /// A UV sphere resting on the floor, slowly spinning around its vertical axis.
    #[serde(rename_all = "camelCase")]
    Sphere {
        radius: f32,
        subdivisions: u32,
        /// Seconds per turn, `None` to stay still.
        spin_period: Option<f32>,
    },
}

/// Floor, grid and background of the scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvironmentConfig {
    pub background: String,
    /// Side length of the floor plane, `None` for no floor.
    pub floor: Option<f32>,
    pub floor_color: String,
    /// `(size, divisions)` of the ground grid, `None` for no grid.
    pub grid: Option<(f32, u32)>,
    pub grid_opacity: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        EnvironmentConfig {
            background: "#bbbbbb".to_string(),
            floor: None,
            floor_color: "#fefefe".to_string(),
            grid: None,
            grid_opacity: 0.2,
        }
    }
}

/// Scalar parameters of the shared material.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialParams {
    pub roughness: f32,
    pub metalness: f32,
    pub ao_intensity: f32,
    pub displacement_scale: f32,
    /// Sampling of the base map. Nearest filtering also skips mipmaps.
    pub base_filter: TextureFilter,
}

impl Default for MaterialParams {
    fn default() -> Self {
        MaterialParams {
            roughness: 1.0,
            metalness: 0.0,
            ao_intensity: 0.0,
            displacement_scale: 0.0,
            base_filter: TextureFilter::Linear,
        }
    }
}

/// The markup a viewer binds to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Selectors {
    pub texture_option: String,
    pub light_option: String,
    pub room_toggle: String,
    pub color_group: String,
    pub color_option: String,
    pub scene_option: String,
    pub screenshot: String,
    pub panel: String,
    pub engraving: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Selectors {
            texture_option: ".js-furniture-configurator-option".to_string(),
            light_option: ".js-furniture-configurator-light-option".to_string(),
            room_toggle: ".js-configurator-viewer-toggle-room".to_string(),
            color_group: ".js-ring-configurator-colors".to_string(),
            color_option: ".js-ring-configurator-color".to_string(),
            scene_option: ".js-ring-configurator-scene".to_string(),
            screenshot: ".js-ring-configurator-screenshot".to_string(),
            panel: ".js-ring-configurator-options".to_string(),
            engraving: ".js-ring-configurator-engraving-text".to_string(),
        }
    }
}

/// The configuration of one viewer.
///
/// A configuration is built once, from a preset or from JSON, and is not modified
/// by the viewer. The viewer element may still override the model URL, the object
/// names and the texture scale through its `data-model-source`, `data-model-objects`
/// and `data-material-scale` attributes (see [`ViewerConfig::with_markup`]).
///
/// ```
/// # use showroom::viewer::ViewerConfig;
/// let config: ViewerConfig = serde_json::from_str(r#"{
///     "elementSelector": ".js-configurator-viewer",
///     "modelUrl": "models/chair.glb",
///     "modelObjects": ["body"],
///     "textureScale": 2.0,
///     "camera": { "bounds": { "minDistance": 1.0, "maxDistance": 3.0 } }
/// }"#).unwrap();
/// assert_eq!(config.camera.bounds.max_distance, 3.0);
/// assert_eq!(config.loading_floor_ms, 300);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    pub element_selector: String,
    /// The model to load. Empty when the viewer shows a [`Primitive`].
    pub model_url: String,
    pub environment_url: Option<String>,
    /// Names of the nodes that receive the shared material.
    pub model_objects: Vec<String>,
    /// Names of the nodes toggled by the room switch.
    pub room_objects: Vec<String>,
    pub hide_room: bool,
    pub texture_scale: f32,
    pub primitive: Option<Primitive>,
    pub material: MaterialParams,
    pub camera: CameraConfig,
    pub lights: LightPreset,
    pub environment: EnvironmentConfig,
    pub env_lights: BTreeMap<String, EnvLight>,
    /// Name of the spotlight following the mouse, if any.
    pub mouse_spotlight: Option<String>,
    /// Minimum time the loading indicator stays up during an appearance swap.
    pub loading_floor_ms: u64,
    /// Time after which a pending model or texture request fails.
    pub timeout_ms: Option<u64>,
    pub selectors: Selectors,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            element_selector: String::new(),
            model_url: String::new(),
            environment_url: None,
            model_objects: Vec::new(),
            room_objects: Vec::new(),
            hide_room: false,
            texture_scale: 1.0,
            primitive: None,
            material: MaterialParams::default(),
            camera: CameraConfig::default(),
            lights: LightPreset::default(),
            environment: EnvironmentConfig::default(),
            env_lights: BTreeMap::new(),
            mouse_spotlight: None,
            loading_floor_ms: 300,
            timeout_ms: None,
            selectors: Selectors::default(),
        }
    }
}

impl ViewerConfig {
    /// Parses a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The furniture configurator: a sofa on a floor with a grid, orbiting between 8 and
    /// 16 units above the ground.
    pub fn furniture() -> Self {
        ViewerConfig {
            element_selector: ".js-furniture-configurator".to_string(),
            model_url: "../static/models/sofa.glb".to_string(),
            model_objects: vec!["body".to_string()],
            material: MaterialParams {
                metalness: 0.1,
                ..MaterialParams::default()
            },
            camera: CameraConfig {
                fov: 45.0,
                znear: 2.0,
                zfar: 120.0,
                view: CameraView::new(Vec3::new(-15.0, 10.0, 15.0), Vec3::new(0.0, 1.0, 0.0)),
                bounds: OrbitBounds::distance(8.0, 16.0).with_polar(0.0, PI / 2.0),
                ..CameraConfig::default()
            },
            lights: LightPreset::Furniture,
            environment: EnvironmentConfig {
                floor: Some(120.0),
                grid: Some((120.0, 40)),
                ..EnvironmentConfig::default()
            },
            ..ViewerConfig::default()
        }
    }

    /// The fabric viewer: a slowly spinning sphere wrapped in the fabric, auto-rotating.
    pub fn fabric() -> Self {
        ViewerConfig {
            element_selector: ".js-fabric-viewer".to_string(),
            texture_scale: 1.15,
            primitive: Some(Primitive::Sphere {
                radius: 2.5,
                subdivisions: 128,
                spin_period: Some(40.0),
            }),
            material: MaterialParams {
                roughness: 0.85,
                metalness: 0.15,
                ao_intensity: 0.5,
                ..MaterialParams::default()
            },
            camera: CameraConfig {
                fov: 40.0,
                znear: 1.0,
                zfar: 40.0,
                view: CameraView::new(Vec3::new(0.0, 5.0, 15.0), Vec3::new(0.0, 1.0, 0.0)),
                bounds: OrbitBounds::distance(4.0, 30.0).with_polar(0.0, PI / 2.0),
                auto_rotate: Some(1.0),
                ..CameraConfig::default()
            },
            lights: LightPreset::Fabric,
            environment: EnvironmentConfig {
                floor: Some(40.0),
                grid: Some((2000.0, 40)),
                grid_opacity: 0.1,
                ..EnvironmentConfig::default()
            },
            ..ViewerConfig::default()
        }
    }

    /// The model configurator: a close-up on a seat, a mouse-driven spotlight and three
    /// environment light presets.
    pub fn model_configurator() -> Self {
        let mut env_lights = BTreeMap::new();
        let _ = env_lights.insert(
            "neutral".to_string(),
            EnvLight::new("../static/env/neutral.png", "#ffffff"),
        );
        let _ = env_lights.insert(
            "warm".to_string(),
            EnvLight::new("../static/env/warm.png", "#ffe2c0"),
        );
        let _ = env_lights.insert(
            "cold".to_string(),
            EnvLight::new("../static/env/cold.png", "#d4e4ff"),
        );

        ViewerConfig {
            element_selector: ".js-configurator-viewer".to_string(),
            model_url: "../static/models/one-seater-pxt-v9.glb".to_string(),
            model_objects: vec!["body".to_string()],
            hide_room: true,
            camera: CameraConfig {
                view: CameraView::new(Vec3::new(-0.8, 0.45, -0.35), Vec3::new(0.0, 0.3, 0.0)),
                bounds: OrbitBounds::distance(0.5, 1.2)
                    .with_polar(0.9, 1.427)
                    .with_azimuth(3.2, -1.2),
                ..CameraConfig::default()
            },
            lights: LightPreset::Studio,
            env_lights,
            mouse_spotlight: Some("Spot".to_string()),
            material: MaterialParams {
                base_filter: TextureFilter::Nearest,
                ..MaterialParams::default()
            },
            ..ViewerConfig::default()
        }
    }

    /// The ring configurator: metal colors, engraving, screenshots and camera presets.
    pub fn ring() -> Self {
        ViewerConfig {
            element_selector: ".js-ring-configurator-viewer".to_string(),
            model_url: "../static/models/ring-v9.glb".to_string(),
            camera: CameraConfig {
                view: CameraView::new(Vec3::new(0.0, 6.0, 12.0), Vec3::ZERO),
                bounds: OrbitBounds::distance(10.0, 20.0).with_polar(0.3, 1.6),
                ..CameraConfig::default()
            },
            lights: LightPreset::Studio,
            ..ViewerConfig::default()
        }
    }

    pub fn with_element_selector(mut self, selector: &str) -> Self {
        self.element_selector = selector.to_string();
        self
    }

    pub fn with_model(mut self, url: &str, objects: &[&str]) -> Self {
        self.model_url = url.to_string();
        self.model_objects = objects.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn with_room(mut self, objects: &[&str], hidden: bool) -> Self {
        self.room_objects = objects.iter().map(|o| o.to_string()).collect();
        self.hide_room = hidden;
        self
    }

    pub fn with_texture_scale(mut self, scale: f32) -> Self {
        self.texture_scale = scale;
        self
    }

    pub fn with_loading_floor(mut self, floor: Duration) -> Self {
        self.loading_floor_ms = floor.as_millis() as u64;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout_ms = timeout.map(|t| t.as_millis() as u64);
        self
    }

    pub fn with_env_light(mut self, name: &str, light: EnvLight) -> Self {
        let _ = self.env_lights.insert(name.to_string(), light);
        self
    }

    /// Applies the overrides carried by the viewer element.
    ///
    /// Malformed attributes are ignored with a warning.
    pub fn with_markup(mut self, element: &dyn Element) -> Self {
        if let Some(url) = element.attribute("data-model-source") {
            self.model_url = url;
        }

        if let Some(objects) = element.attribute("data-model-objects") {
            match serde_json::from_str::<Vec<String>>(&objects) {
                Ok(objects) => self.model_objects = objects,
                Err(e) => log::warn!("Ignoring data-model-objects: {}", e),
            }
        }

        if let Some(scale) = element.attribute("data-material-scale") {
            match scale.trim().parse::<f32>() {
                Ok(scale) if scale.is_finite() => self.texture_scale = scale,
                _ => log::warn!("Ignoring data-material-scale `{}`.", scale),
            }
        }

        self
    }

    pub fn loading_floor(&self) -> Duration {
        Duration::from_millis(self.loading_floor_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Checks the color strings and the camera bounds of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = &self.camera.bounds;
        let (min_azimuth, max_azimuth) = bounds.azimuth.unwrap_or_default();
        for (name, min, max, ordered) in [
            ("distance", bounds.min_distance, bounds.max_distance, true),
            ("polar", bounds.min_polar, bounds.max_polar, true),
            // A reversed azimuth range wraps around ±π.
            ("azimuth", min_azimuth, max_azimuth, false),
        ] {
            if min.is_nan() || max.is_nan() || (ordered && min > max) {
                return Err(ConfigError::InvalidBounds { name, min, max });
            }
        }

        let _ = self.background_color()?;
        let _ = color::parse(&self.environment.floor_color)?;
        for light in self.env_lights.values() {
            let _ = color::parse(&light.color)?;
        }
        Ok(())
    }

    pub fn background_color(&self) -> Result<Color, ConfigError> {
        color::parse(&self.environment.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryElement;

    #[test]
    fn presets_are_valid() {
        for config in [
            ViewerConfig::furniture(),
            ViewerConfig::fabric(),
            ViewerConfig::model_configurator(),
            ViewerConfig::ring(),
        ] {
            config.validate().unwrap();
            assert!(!config.element_selector.is_empty());
        }
    }

    #[test]
    fn presets_survive_json() {
        let config = ViewerConfig::model_configurator();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = ViewerConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.camera.bounds.azimuth, Some((3.2, -1.2)));
        assert_eq!(parsed.material.base_filter, TextureFilter::Nearest);
    }

    #[test]
    fn invalid_colors_are_rejected() {
        let result = ViewerConfig::from_json(r##"{ "environment": { "background": "grey" } }"##);
        assert!(matches!(result, Err(ConfigError::InvalidColor(c)) if c == "grey"));
    }

    #[test]
    fn inverted_camera_bounds_are_rejected() {
        let result = ViewerConfig::from_json(
            r#"{ "camera": { "bounds": { "minDistance": 16.0, "maxDistance": 8.0 } } }"#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidBounds { name: "distance", .. })
        ));

        let mut config = ViewerConfig::furniture();
        config.camera.bounds = config.camera.bounds.with_polar(1.0, 0.5);
        assert!(config.validate().is_err());

        config.camera.bounds = config.camera.bounds.with_polar(0.0, 1.0).with_azimuth(2.5, -2.5);
        config.validate().unwrap();
    }

    #[test]
    fn markup_overrides_model() {
        let element = MemoryElement::new("canvas")
            .with_attribute("data-model-source", "chair.glb")
            .with_attribute("data-model-objects", r#"["seat", "back"]"#)
            .with_attribute("data-material-scale", "0.5");
        let config = ViewerConfig::furniture().with_markup(&*element);

        assert_eq!(config.model_url, "chair.glb");
        assert_eq!(config.model_objects, vec!["seat", "back"]);
        assert_eq!(config.texture_scale, 0.5);
    }

    #[test]
    fn malformed_markup_is_ignored() {
        let element = MemoryElement::new("canvas")
            .with_attribute("data-model-objects", "body")
            .with_attribute("data-material-scale", "big");
        let config = ViewerConfig::furniture().with_markup(&*element);
        assert_eq!(config.model_objects, vec!["body"]);
        assert_eq!(config.texture_scale, 1.0);
    }
}
