//! Model importers.

pub use self::gltf::load_gltf;

mod gltf;
