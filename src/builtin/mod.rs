//! The built-in physically-based renderer.

pub use self::physical_material::PhysicalRenderer;

mod physical_material;
