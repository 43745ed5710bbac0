//! Everything related to the scene graph.

pub use self::object::Object;
pub use self::scene_node::{DrawItem, SceneNode, SceneNodeData};

mod object;
mod scene_node;
