//! Textures, materials and meshes, on the CPU and on the GPU.

pub use self::gpu_mesh::GpuMesh;
pub use self::material::{MapSlot, PhysicalMaterial, TextureBinding};
pub use self::texture::{
    ColorSpace, GpuTextureCache, Texture, TextureFilter, TextureImage, TextureWrapping,
};
pub use self::texture_manager::{TextureManager, TextureStatus};

mod gpu_mesh;
mod material;
mod texture;
mod texture_manager;
