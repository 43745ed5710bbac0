//! Lighting configuration for viewer scenes.
//!
//! Each viewer owns a fixed [`LightRig`]: a handful of placed lights plus an
//! ambient term. Rigs are built once during scene bootstrap and collected into
//! a [`LightCollection`] every frame for upload to the GPU.

use crate::color::{self, Color};
use glamx::Vec3;

/// Lights beyond this count are dropped when a rig is collected.
pub const MAX_LIGHTS: usize = 8;

/// How a light spreads.
#[derive(Clone, Debug, PartialEq)]
pub enum LightType {
    /// Radiates from its position, fading out at `attenuation_radius`.
    Point { attenuation_radius: f32 },

    /// Parallel rays travelling from the light position towards its target.
    Directional,

    /// A cone aimed at the target. Full intensity up to `inner_cone_angle`, none past
    /// `outer_cone_angle` (radians).
    Spot {
        inner_cone_angle: f32,
        outer_cone_angle: f32,
        attenuation_radius: f32,
    },
}

impl Default for LightType {
    fn default() -> Self {
        LightType::Point {
            attenuation_radius: 100.0,
        }
    }
}

/// The color and strength of a light, independent of where it stands.
///
/// # Examples
/// ```
/// # use showroom::prelude::*;
/// let key = Light::directional()
///     .with_color(color::from_hex(0xf3f3f3))
///     .with_intensity(14.0);
/// let bulb = Light::point(40.0).with_intensity(3.0);
/// # let _ = (key, bulb);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub light_type: LightType,
    pub color: Color,
    pub intensity: f32,
    /// Disabled lights are skipped by [`LightRig::collect`].
    pub enabled: bool,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            light_type: LightType::default(),
            color: color::WHITE,
            intensity: 1.0,
            enabled: true,
        }
    }
}

impl Light {
    pub fn point(attenuation_radius: f32) -> Self {
        Self {
            light_type: LightType::Point { attenuation_radius },
            ..Default::default()
        }
    }

    pub fn directional() -> Self {
        Self {
            light_type: LightType::Directional,
            ..Default::default()
        }
    }

    /// A spot light; angles are in radians.
    pub fn spot(inner_cone_angle: f32, outer_cone_angle: f32, attenuation_radius: f32) -> Self {
        Self {
            light_type: LightType::Spot {
                inner_cone_angle,
                outer_cone_angle,
                attenuation_radius,
            },
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }
}

/// A light placed in world space, optionally named so that it can be found later
/// (the mouse-follow spotlight is looked up by name).
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLight {
    pub name: Option<String>,
    pub light: Light,
    pub position: Vec3,
    /// Point the light aims at. Ignored by point lights.
    pub target: Vec3,
}

/// The fixed set of lights of a viewer.
#[derive(Clone, Debug, PartialEq)]
pub struct LightRig {
    pub lights: Vec<PlacedLight>,
    pub ambient_color: Color,
    pub ambient_intensity: f32,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            lights: Vec::new(),
            ambient_color: color::WHITE,
            ambient_intensity: 0.2,
        }
    }
}

impl LightRig {
    /// An empty rig with the given ambient term.
    pub fn with_ambient(ambient_color: Color, ambient_intensity: f32) -> Self {
        Self {
            lights: Vec::new(),
            ambient_color,
            ambient_intensity,
        }
    }

    /// Adds a light at `position` aiming at the origin.
    pub fn add(mut self, light: Light, position: Vec3) -> Self {
        self.lights.push(PlacedLight {
            name: None,
            light,
            position,
            target: Vec3::ZERO,
        });
        self
    }

    /// Adds a named light aiming at `target`.
    pub fn add_named(mut self, name: &str, light: Light, position: Vec3, target: Vec3) -> Self {
        self.lights.push(PlacedLight {
            name: Some(name.to_string()),
            light,
            position,
            target,
        });
        self
    }

    /// Finds a light by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut PlacedLight> {
        self.lights
            .iter_mut()
            .find(|l| l.name.as_deref() == Some(name))
    }

    /// Two soft fills, an overhead bulb, a strong key light and a gray ambient.
    pub fn furniture() -> Self {
        LightRig::with_ambient(color::AMBIENT_GRAY, 3.0)
            .add(
                Light::directional().with_color(color::SOFT_WHITE),
                Vec3::new(2.0, 8.0, -6.0),
            )
            .add(
                Light::directional().with_color(color::SOFT_WHITE),
                Vec3::new(-2.0, 8.0, 6.0),
            )
            .add(Light::point(120.0).with_intensity(3.0), Vec3::new(0.0, 12.0, 0.0))
            .add(Light::directional().with_intensity(14.0), Vec3::new(4.0, 7.0, 7.0))
    }

    /// Two front fills, an overhead bulb and a strong gray ambient for fabric swatches.
    pub fn fabric() -> Self {
        let fill = color::from_hex(0xf0f0f0);
        LightRig::with_ambient(color::AMBIENT_GRAY, 4.0)
            .add(Light::directional().with_color(fill), Vec3::new(0.0, 6.0, 3.0))
            .add(
                Light::directional().with_color(fill).with_intensity(2.0),
                Vec3::new(0.0, 3.0, 8.0),
            )
            .add(Light::point(120.0).with_intensity(3.0), Vec3::new(0.0, 12.0, 0.0))
    }

    /// A product studio with a named, mouse-driven spotlight.
    pub fn studio() -> Self {
        LightRig::with_ambient(color::WHITE, 0.4)
            .add(
                Light::directional().with_color(color::SOFT_WHITE),
                Vec3::new(2.0, 7.0, 6.0),
            )
            .add_named(
                "Spot",
                Light::spot(0.35, 0.6, 20.0).with_intensity(6.0),
                Vec3::new(0.0, 3.0, 2.0),
                Vec3::ZERO,
            )
    }

    /// Collects the enabled lights for upload.
    pub fn collect(&self) -> LightCollection {
        let mut collection = LightCollection::with_ambient(self.ambient_intensity);
        collection.ambient_color = Vec3::new(
            self.ambient_color.r,
            self.ambient_color.g,
            self.ambient_color.b,
        );

        for placed in self.lights.iter().filter(|l| l.light.enabled) {
            let direction = (placed.target - placed.position).normalize_or(Vec3::NEG_Y);
            let added = collection.add(CollectedLight {
                light_type: placed.light.light_type.clone(),
                color: Vec3::new(placed.light.color.r, placed.light.color.g, placed.light.color.b),
                intensity: placed.light.intensity,
                world_position: placed.position,
                world_direction: direction,
            });

            if !added {
                log::warn!("Light rig exceeds {} lights, ignoring the rest.", MAX_LIGHTS);
                break;
            }
        }

        collection
    }
}

/// A light as uploaded: linear color, world position and travel direction.
#[derive(Clone, Debug)]
pub struct CollectedLight {
    pub light_type: LightType,
    pub color: Vec3,
    pub intensity: f32,
    pub world_position: Vec3,
    pub world_direction: Vec3,
}

/// The lights of one frame, at most [`MAX_LIGHTS`].
#[derive(Clone, Debug)]
pub struct LightCollection {
    pub lights: Vec<CollectedLight>,
    pub ambient: f32,
    pub ambient_color: Vec3,
}

impl LightCollection {
    pub fn with_ambient(ambient: f32) -> Self {
        Self {
            lights: Vec::with_capacity(MAX_LIGHTS),
            ambient,
            ambient_color: Vec3::ONE,
        }
    }

    /// Returns `false`, leaving the collection untouched, once it holds [`MAX_LIGHTS`].
    pub fn add(&mut self, light: CollectedLight) -> bool {
        if self.lights.len() < MAX_LIGHTS {
            self.lights.push(light);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}
