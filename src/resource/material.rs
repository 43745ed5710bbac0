//! The physically-based material shared by the objects of a viewer.

use crate::color::{self, Color};
use crate::resource::{ColorSpace, TextureFilter, TextureImage, TextureWrapping};
use glamx::Vec2;
use std::sync::Arc;

/// A texture slot of a [`PhysicalMaterial`].
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum MapSlot {
    /// Base color (albedo).
    Base,
    /// Ambient occlusion.
    Ao,
    /// Tangent-space normals.
    Normal,
    /// Roughness, read from the green channel.
    Roughness,
    /// Displacement along the normal.
    Height,
    /// Metalness, read from the blue channel.
    Metalness,
}

impl MapSlot {
    /// Every slot, in binding order.
    pub const ALL: [MapSlot; 6] = [
        MapSlot::Base,
        MapSlot::Ao,
        MapSlot::Normal,
        MapSlot::Roughness,
        MapSlot::Height,
        MapSlot::Metalness,
    ];

    /// Whether every appearance set must provide this slot.
    #[inline]
    pub fn is_required(self) -> bool {
        !matches!(self, MapSlot::Height | MapSlot::Metalness)
    }

    /// How the texels of this slot are interpreted.
    #[inline]
    pub fn color_space(self) -> ColorSpace {
        match self {
            MapSlot::Base => ColorSpace::Srgb,
            _ => ColorSpace::Linear,
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for MapSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MapSlot::Base => "base",
            MapSlot::Ao => "ao",
            MapSlot::Normal => "norm",
            MapSlot::Roughness => "rough",
            MapSlot::Height => "height",
            MapSlot::Metalness => "metal",
        };
        f.write_str(name)
    }
}

/// A texture bound to a material slot, with its sampling parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureBinding {
    pub image: Arc<TextureImage>,
    pub wrapping: TextureWrapping,
    /// Number of times the texture repeats across the UV range.
    pub repeat: Vec2,
    pub filter: TextureFilter,
    pub mipmaps: bool,
}

impl TextureBinding {
    /// Binds `image` with clamped wrapping, no repetition and mipmapped linear filtering.
    pub fn new(image: Arc<TextureImage>) -> Self {
        Self {
            image,
            wrapping: TextureWrapping::ClampToEdge,
            repeat: Vec2::ONE,
            filter: TextureFilter::Linear,
            mipmaps: true,
        }
    }

    /// Repeats the texture `repeat` times in both directions.
    pub fn repeated(mut self, repeat: Vec2) -> Self {
        self.wrapping = TextureWrapping::Repeat;
        self.repeat = repeat;
        self
    }

    /// Changes the sampling filter. Nearest filtering disables mipmaps.
    pub fn with_filter(mut self, filter: TextureFilter) -> Self {
        self.filter = filter;
        self.mipmaps = filter == TextureFilter::Linear;
        self
    }
}

/// A physically-based material with six texture slots.
///
/// A viewer owns exactly one such material and shares it, through an
/// `Rc<RefCell<PhysicalMaterial>>`, with every object it re-materials. Appearance swaps
/// mutate it in place with [`PhysicalMaterial::replace_maps`].
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicalMaterial {
    maps: [Option<TextureBinding>; 6],
    /// Base color factor, multiplied with the base map.
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    /// Strength of the ambient occlusion map, `0` disables it.
    pub ao_intensity: f32,
    /// Displacement applied along the normal for a height texel of 1.
    pub displacement_scale: f32,
    pub opacity: f32,
}

impl Default for PhysicalMaterial {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicalMaterial {
    /// A white, fully rough, dielectric material without maps.
    pub fn new() -> Self {
        Self {
            maps: Default::default(),
            color: color::WHITE,
            roughness: 1.0,
            metalness: 0.0,
            ao_intensity: 1.0,
            displacement_scale: 0.0,
            opacity: 1.0,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness;
        self
    }

    pub fn with_ao_intensity(mut self, intensity: f32) -> Self {
        self.ao_intensity = intensity;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// The texture bound to `slot`.
    #[inline]
    pub fn map(&self, slot: MapSlot) -> Option<&TextureBinding> {
        self.maps[slot.index()].as_ref()
    }

    /// Binds or clears a single slot.
    #[inline]
    pub fn set_map(&mut self, slot: MapSlot, binding: Option<TextureBinding>) {
        self.maps[slot.index()] = binding;
    }

    /// Replaces every slot at once.
    ///
    /// Slots absent from `maps` are cleared, so no texture of the previous set survives.
    pub fn replace_maps(&mut self, maps: impl IntoIterator<Item = (MapSlot, TextureBinding)>) {
        let mut new_maps: [Option<TextureBinding>; 6] = Default::default();
        for (slot, binding) in maps {
            new_maps[slot.index()] = Some(binding);
        }
        self.maps = new_maps;
    }

    /// Every bound slot with its texture.
    pub fn maps(&self) -> impl Iterator<Item = (MapSlot, &TextureBinding)> {
        MapSlot::ALL
            .iter()
            .filter_map(move |slot| self.map(*slot).map(|b| (*slot, b)))
    }

    /// The UV repeat of the base map, or of the first bound slot.
    pub fn repeat(&self) -> Option<Vec2> {
        self.maps().next().map(|(_, b)| b.repeat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding() -> TextureBinding {
        TextureBinding::new(TextureImage::solid(color::WHITE))
    }

    #[test]
    fn replace_clears_absent_slots() {
        let mut material = PhysicalMaterial::new();
        material.replace_maps(MapSlot::ALL.iter().map(|s| (*s, binding())));
        assert_eq!(material.maps().count(), 6);

        material.replace_maps([(MapSlot::Base, binding()), (MapSlot::Ao, binding())]);
        assert!(material.map(MapSlot::Base).is_some());
        assert!(material.map(MapSlot::Height).is_none());
        assert!(material.map(MapSlot::Metalness).is_none());
        assert_eq!(material.maps().count(), 2);
    }

    #[test]
    fn nearest_filter_drops_mipmaps() {
        let linear = binding().repeated(Vec2::splat(2.5));
        assert!(linear.mipmaps);
        assert_eq!(linear.wrapping, TextureWrapping::Repeat);

        let nearest = linear.with_filter(TextureFilter::Nearest);
        assert_eq!(nearest.filter, TextureFilter::Nearest);
        assert!(!nearest.mipmaps);
        assert_eq!(nearest.repeat, Vec2::splat(2.5));
    }

    #[test]
    fn slot_properties() {
        assert_eq!(
            MapSlot::ALL.iter().filter(|s| s.is_required()).count(),
            4
        );
        assert_eq!(MapSlot::Base.color_space(), ColorSpace::Srgb);
        assert_eq!(MapSlot::Roughness.color_space(), ColorSpace::Linear);
        assert_eq!(MapSlot::Normal.to_string(), "norm");
    }
}
