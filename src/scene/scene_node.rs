use crate::procedural::RenderMesh;
use crate::resource::PhysicalMaterial;
use crate::scene::Object;
use glamx::{Mat4, Quat, Vec3};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// The data contained by a [`SceneNode`].
pub struct SceneNodeData {
    name: String,
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    visible: bool,
    children: Vec<SceneNode>,
    object: Option<Object>,
}

impl SceneNodeData {
    /// The name of the node, as authored in the model file.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this node contains an `Object`.
    #[inline]
    pub fn has_object(&self) -> bool {
        self.object.is_some()
    }

    /// The object of this node, if any.
    #[inline]
    pub fn object(&self) -> Option<&Object> {
        self.object.as_ref()
    }

    /// The transform from this node's space to its parent's.
    #[inline]
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// One item to draw: an object with its world transform.
#[derive(Clone, Debug)]
pub struct DrawItem {
    pub world: Mat4,
    pub object: Object,
}

/// A node of the scene graph.
///
/// Nodes are reference-counted handles: cloning a node gives another handle to the same
/// node. A node may hold an [`Object`] and any number of children. Loaded models keep
/// the node names of their file, which is how a viewer locates the sub-objects it
/// re-materials.
#[derive(Clone)]
pub struct SceneNode {
    data: Rc<RefCell<SceneNodeData>>,
}

impl Default for SceneNode {
    fn default() -> SceneNode {
        SceneNode::empty()
    }
}

impl SceneNode {
    /// Creates a new unrooted scene node.
    pub fn new(name: &str, object: Option<Object>) -> SceneNode {
        SceneNode {
            data: Rc::new(RefCell::new(SceneNodeData {
                name: name.to_string(),
                position: Vec3::ZERO,
                rotation: Quat::IDENTITY,
                scale: Vec3::ONE,
                visible: true,
                children: Vec::new(),
                object,
            })),
        }
    }

    /// Creates a new empty, unnamed scene node with identity transformations.
    pub fn empty() -> SceneNode {
        SceneNode::new("", None)
    }

    /// Creates a node drawing `mesh` with `material`.
    pub fn mesh(name: &str, mesh: RenderMesh, material: Rc<RefCell<PhysicalMaterial>>) -> SceneNode {
        SceneNode::new(name, Some(Object::new(Rc::new(mesh), material)))
    }

    /// Returns an immutable reference to this node's internal data.
    pub fn data(&self) -> Ref<'_, SceneNodeData> {
        self.data.borrow()
    }

    fn data_mut(&self) -> RefMut<'_, SceneNodeData> {
        self.data.borrow_mut()
    }

    /// Whether both handles designate the same node.
    #[inline]
    pub fn ptr_eq(&self, other: &SceneNode) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /// The name of this node.
    pub fn name(&self) -> String {
        self.data().name.clone()
    }

    /// Replaces the object drawn by this node.
    pub fn set_object(&self, object: Option<Object>) {
        self.data_mut().object = object;
    }

    /// Adds an existing node as a child of this node.
    pub fn add_child(&self, node: SceneNode) {
        self.data_mut().children.push(node)
    }

    /// Adds a node drawing `mesh` as a child of this node.
    pub fn add_mesh(
        &self,
        name: &str,
        mesh: RenderMesh,
        material: Rc<RefCell<PhysicalMaterial>>,
    ) -> SceneNode {
        let node = SceneNode::mesh(name, mesh, material);
        self.add_child(node.clone());
        node
    }

    /// Removes `node` from the children of this node.
    pub fn remove_child(&self, node: &SceneNode) {
        self.data_mut().children.retain(|c| !c.ptr_eq(node));
    }

    /// The direct children of this node.
    pub fn children(&self) -> Vec<SceneNode> {
        self.data().children.clone()
    }

    /// Applies a closure to this node and all its descendants, depth-first.
    pub fn apply_to_scene_nodes<F: FnMut(&SceneNode)>(&self, f: &mut F) {
        f(self);

        for c in self.children() {
            c.apply_to_scene_nodes(f)
        }
    }

    /// Applies a closure to each object contained by this node and its descendants.
    pub fn apply_to_objects_mut<F: FnMut(&mut Object)>(&self, f: &mut F) {
        self.apply_to_scene_nodes(&mut |node| {
            if let Some(object) = node.data_mut().object.as_mut() {
                f(object)
            }
        })
    }

    /// Finds the first node named `name` in this subtree, depth-first.
    pub fn find_by_name(&self, name: &str) -> Option<SceneNode> {
        if self.data().name == name {
            return Some(self.clone());
        }

        self.children().iter().find_map(|c| c.find_by_name(name))
    }

    /// Finds the nodes named after `names`, in the order of `names`. Missing names are
    /// skipped.
    pub fn find_all_by_name<S: AsRef<str>>(&self, names: &[S]) -> Vec<SceneNode> {
        names
            .iter()
            .filter_map(|name| self.find_by_name(name.as_ref()))
            .collect()
    }

    /// Sets the material of every object in this subtree.
    pub fn set_material(&self, material: Rc<RefCell<PhysicalMaterial>>) {
        self.apply_to_objects_mut(&mut |o| o.set_material(material.clone()));
    }

    /// The material of the first object in this subtree.
    pub fn material(&self) -> Option<Rc<RefCell<PhysicalMaterial>>> {
        let mut result = None;
        self.apply_to_scene_nodes(&mut |node| {
            if result.is_none() {
                result = node.data().object.as_ref().map(|o| o.material().clone());
            }
        });
        result
    }

    /// Whether this node is visible.
    pub fn is_visible(&self) -> bool {
        self.data().visible
    }

    /// Sets the visibility of this node.
    ///
    /// The node and its children are not rendered if it is not visible.
    pub fn set_visible(&self, visible: bool) {
        self.data_mut().visible = visible;
    }

    pub fn position(&self) -> Vec3 {
        self.data().position
    }

    pub fn set_position(&self, position: Vec3) {
        self.data_mut().position = position;
    }

    pub fn rotation(&self) -> Quat {
        self.data().rotation
    }

    pub fn set_rotation(&self, rotation: Quat) {
        self.data_mut().rotation = rotation;
    }

    pub fn scale(&self) -> Vec3 {
        self.data().scale
    }

    pub fn set_scale(&self, scale: Vec3) {
        self.data_mut().scale = scale;
    }

    /// Collects the visible objects of this subtree with their world transforms.
    pub fn collect_draws(&self, parent: Mat4, out: &mut Vec<DrawItem>) {
        let data = self.data();
        if !data.visible {
            return;
        }

        let world = parent * data.local_matrix();

        if let Some(object) = &data.object {
            out.push(DrawItem {
                world,
                object: object.clone(),
            });
        }

        for c in &data.children {
            c.collect_draws(world, out);
        }
    }
}

impl std::fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.data();
        f.debug_struct("SceneNode")
            .field("name", &data.name)
            .field("visible", &data.visible)
            .field("has_object", &data.has_object())
            .field("children", &data.children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedural;

    fn material() -> Rc<RefCell<PhysicalMaterial>> {
        Rc::new(RefCell::new(PhysicalMaterial::new()))
    }

    fn sofa() -> SceneNode {
        let root = SceneNode::new("Scene", None);
        let frame = SceneNode::new("Frame", None);
        root.add_child(frame.clone());
        let _ = frame.add_mesh("Cushion", procedural::plane(1.0, 1.0, 1, 1), material());
        let _ = root.add_mesh("Legs", procedural::plane(1.0, 1.0, 1, 1), material());
        root
    }

    #[test]
    fn find_nested_nodes_by_name() {
        let root = sofa();
        assert_eq!(root.find_by_name("Cushion").unwrap().name(), "Cushion");
        assert!(root.find_by_name("Armrest").is_none());

        let found = root.find_all_by_name(&["Legs", "Armrest", "Cushion"]);
        let names: Vec<_> = found.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["Legs", "Cushion"]);
    }

    #[test]
    fn shared_material_reaches_every_object() {
        let root = sofa();
        let shared = material();
        root.set_material(shared.clone());

        let mut count = 0;
        root.apply_to_objects_mut(&mut |o| {
            assert!(Rc::ptr_eq(o.material(), &shared));
            count += 1;
        });
        assert_eq!(count, 2);
    }

    #[test]
    fn hidden_subtrees_are_not_drawn() {
        let root = sofa();
        let mut draws = Vec::new();
        root.collect_draws(Mat4::IDENTITY, &mut draws);
        assert_eq!(draws.len(), 2);

        root.find_by_name("Frame").unwrap().set_visible(false);
        draws.clear();
        root.collect_draws(Mat4::IDENTITY, &mut draws);
        assert_eq!(draws.len(), 1);
    }

    #[test]
    fn world_transform_composes_parents() {
        let root = SceneNode::empty();
        let child = SceneNode::empty();
        root.add_child(child.clone());
        let _ = child.add_mesh("m", procedural::plane(1.0, 1.0, 1, 1), material());

        root.set_position(Vec3::new(1.0, 0.0, 0.0));
        child.set_scale(Vec3::splat(2.0));

        let mut draws = Vec::new();
        root.collect_draws(Mat4::IDENTITY, &mut draws);
        let p = draws[0].world.transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert!((p - Vec3::new(3.0, 2.0, 0.0)).length() < 1.0e-6);
    }
}
