use super::utils;
use glamx::{Vec2, Vec3};

/// Geometric description of a mesh, stored on the CPU.
///
/// Vertices, normals and texture coordinates share the same index buffer. This is the
/// layout produced by both the procedural generators and the glTF importer, and the one
/// uploaded by [`GpuMesh`](crate::resource::GpuMesh).
#[derive(Clone, Debug, PartialEq)]
pub struct RenderMesh {
    pub coords: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub uvs: Option<Vec<Vec2>>,
    /// Counterclockwise triangles.
    pub indices: Vec<[u32; 3]>,
}

impl RenderMesh {
    /// Without `indices`, every three consecutive vertices form a triangle.
    pub fn new(
        coords: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        uvs: Option<Vec<Vec2>>,
        indices: Option<Vec<[u32; 3]>>,
    ) -> RenderMesh {
        let indices = indices.unwrap_or_else(|| {
            (0..coords.len() / 3)
                .map(|i| [i as u32 * 3, i as u32 * 3 + 1, i as u32 * 3 + 2])
                .collect()
        });

        RenderMesh {
            coords,
            normals,
            uvs,
            indices,
        }
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.indices.len()
    }

    /// Stretches the mesh along each axis. Normals follow the inverse stretch.
    pub fn scale_by(&mut self, s: Vec3) {
        self.coords.iter_mut().for_each(|c| *c *= s);

        if let Some(normals) = &mut self.normals {
            let inv = s.recip();
            normals
                .iter_mut()
                .for_each(|n| *n = (*n * inv).normalize_or_zero());
        }
    }

    /// Replaces the normals by the mean of the adjacent face normals.
    pub fn recompute_normals(&mut self) {
        let mut normals = Vec::new();
        utils::compute_normals(&self.coords, &self.indices, &mut normals);
        self.normals = Some(normals);
    }

    /// The axis-aligned bounds of the mesh, or `None` if it has no vertex.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.coords.first()?;
        Some(
            self.coords
                .iter()
                .fold((first, first), |(mins, maxs), c| (mins.min(*c), maxs.max(*c))),
        )
    }

    /// Fills missing normals and texture coordinates so the mesh can be uploaded as is.
    pub fn complete(&mut self) {
        if self.normals.is_none() {
            self.recompute_normals();
        }

        if self.uvs.is_none() {
            self.uvs = Some(vec![Vec2::ZERO; self.coords.len()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> RenderMesh {
        RenderMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            None,
            None,
            None,
        )
    }

    #[test]
    fn trivial_indices_are_generated() {
        assert_eq!(triangle().indices, vec![[0, 1, 2]]);
    }

    #[test]
    fn complete_fills_normals_and_uvs() {
        let mut mesh = triangle();
        mesh.complete();
        assert_eq!(mesh.normals.as_ref().unwrap(), &vec![Vec3::Z; 3]);
        assert_eq!(mesh.uvs.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let mut mesh = triangle();
        mesh.scale_by(Vec3::new(2.0, 3.0, 1.0));
        assert_eq!(mesh.bounds(), Some((Vec3::ZERO, Vec3::new(2.0, 3.0, 0.0))));
        assert_eq!(RenderMesh::new(vec![], None, None, None).bounds(), None);
    }
}
