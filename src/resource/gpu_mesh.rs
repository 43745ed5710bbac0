//! Meshes uploaded to the GPU.

use crate::context::Context;
use crate::procedural::RenderMesh;
use glamx::{Vec2, Vec3};

/// A 3D mesh stored on the GPU.
///
/// `GpuMesh` holds one vertex buffer per attribute (coordinates, texture coordinates,
/// normals) and a `u32` index buffer. It is created from a
/// [`RenderMesh`](crate::procedural::RenderMesh), the CPU-side descriptor.
pub struct GpuMesh {
    coords: wgpu::Buffer,
    uvs: wgpu::Buffer,
    normals: wgpu::Buffer,
    faces: wgpu::Buffer,
    num_indices: u32,
}

impl GpuMesh {
    /// Uploads a mesh. Missing normals are computed and missing UVs set to zero.
    pub fn from_render_mesh(mesh: &RenderMesh) -> GpuMesh {
        let ctxt = Context::get();

        let mut complete;
        let mesh = if mesh.has_normals() && mesh.has_uvs() {
            mesh
        } else {
            complete = mesh.clone();
            complete.complete();
            &complete
        };

        let normals: &[Vec3] = mesh.normals.as_deref().unwrap_or_default();
        let uvs: &[Vec2] = mesh.uvs.as_deref().unwrap_or_default();

        let coords = ctxt.create_buffer_init(
            Some("mesh_coords"),
            bytemuck::cast_slice(&mesh.coords),
            wgpu::BufferUsages::VERTEX,
        );
        let uvs = ctxt.create_buffer_init(
            Some("mesh_uvs"),
            bytemuck::cast_slice(uvs),
            wgpu::BufferUsages::VERTEX,
        );
        let normals = ctxt.create_buffer_init(
            Some("mesh_normals"),
            bytemuck::cast_slice(normals),
            wgpu::BufferUsages::VERTEX,
        );
        let faces = ctxt.create_buffer_init(
            Some("mesh_faces"),
            bytemuck::cast_slice(&mesh.indices),
            wgpu::BufferUsages::INDEX,
        );

        GpuMesh {
            coords,
            uvs,
            normals,
            faces,
            num_indices: (mesh.indices.len() * 3) as u32,
        }
    }

    /// Binds the vertex and index buffers to a render pass.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.coords.slice(..));
        render_pass.set_vertex_buffer(1, self.uvs.slice(..));
        render_pass.set_vertex_buffer(2, self.normals.slice(..));
        render_pass.set_index_buffer(self.faces.slice(..), wgpu::IndexFormat::Uint32);
    }

    /// Number of indices in this mesh.
    #[inline]
    pub fn num_indices(&self) -> u32 {
        self.num_indices
    }
}
