//! Procedural mesh generation: the primitives a viewer stage is made of.

pub use self::grid::grid;
pub use self::plane::plane;
pub use self::render_mesh::RenderMesh;
pub use self::sphere::sphere;

mod grid;
mod plane;
mod render_mesh;
mod sphere;
pub mod utils;
