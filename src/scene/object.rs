use crate::procedural::RenderMesh;
use crate::resource::{GpuMesh, PhysicalMaterial};
use std::cell::RefCell;
use std::rc::Rc;

/// A renderable object: a mesh and the material it is drawn with.
///
/// Cloning an object is cheap and shares both the mesh and the material.
#[derive(Clone)]
pub struct Object {
    mesh: Rc<RenderMesh>,
    material: Rc<RefCell<PhysicalMaterial>>,
    gpu_mesh: Rc<RefCell<Option<Rc<GpuMesh>>>>,
}

impl Object {
    /// Creates a new object.
    pub fn new(mesh: Rc<RenderMesh>, material: Rc<RefCell<PhysicalMaterial>>) -> Object {
        Object {
            mesh,
            material,
            gpu_mesh: Rc::new(RefCell::new(None)),
        }
    }

    /// The CPU-side mesh.
    #[inline]
    pub fn mesh(&self) -> &Rc<RenderMesh> {
        &self.mesh
    }

    /// The material this object is drawn with.
    #[inline]
    pub fn material(&self) -> &Rc<RefCell<PhysicalMaterial>> {
        &self.material
    }

    /// Replaces the material.
    #[inline]
    pub fn set_material(&mut self, material: Rc<RefCell<PhysicalMaterial>>) {
        self.material = material;
    }

    /// The GPU copy of the mesh, uploaded on first use.
    pub fn gpu_mesh(&self) -> Rc<GpuMesh> {
        self.gpu_mesh
            .borrow_mut()
            .get_or_insert_with(|| Rc::new(GpuMesh::from_render_mesh(&self.mesh)))
            .clone()
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("num_triangles", &self.mesh.num_triangles())
            .field("material", &self.material.borrow())
            .finish()
    }
}
