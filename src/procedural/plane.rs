use super::{utils, RenderMesh};
use glamx::{Vec2, Vec3};

/// A horizontal rectangle facing `+Y`, centered at the origin, such as a floor.
///
/// It spans `width` along `X` and `depth` along `Z`, cut into `usubdivs` by `vsubdivs`
/// cells. Texture coordinates cover `[0, 1]` once over the whole plane, with `v` growing
/// towards `+Z`.
///
/// # Panics
/// Panics if `usubdivs` or `vsubdivs` is 0.
pub fn plane(width: f32, depth: f32, usubdivs: usize, vsubdivs: usize) -> RenderMesh {
    assert!(
        usubdivs > 0 && vsubdivs > 0,
        "a plane needs at least one cell along each side"
    );

    let mut coords = Vec::with_capacity((usubdivs + 1) * (vsubdivs + 1));
    let mut uvs = Vec::with_capacity(coords.capacity());

    for row in 0..=vsubdivs {
        let v = row as f32 / vsubdivs as f32;
        for col in 0..=usubdivs {
            let u = col as f32 / usubdivs as f32;
            coords.push(Vec3::new((u - 0.5) * width, 0.0, (v - 0.5) * depth));
            uvs.push(Vec2::new(u, v));
        }
    }

    let stride = usubdivs as u32 + 1;
    let mut indices = Vec::with_capacity(usubdivs * vsubdivs * 2);
    for row in 0..vsubdivs as u32 {
        for col in 0..usubdivs as u32 {
            let far = row * stride + col;
            let near = far + stride;
            utils::push_rectangle_indices(far, far + 1, near, near + 1, &mut indices);
        }
    }

    let normals = vec![Vec3::Y; coords.len()];
    RenderMesh::new(coords, Some(normals), Some(uvs), Some(indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_split_in_two() {
        let mesh = plane(1.0, 1.0, 2, 3);
        assert_eq!(mesh.coords.len(), 12);
        assert_eq!(mesh.num_triangles(), 12);
    }

    #[test]
    fn plane_faces_up() {
        let mut mesh = plane(40.0, 40.0, 1, 1);
        assert!(mesh.coords.iter().all(|c| c.y == 0.0));
        assert_eq!(
            mesh.bounds(),
            Some((Vec3::new(-20.0, 0.0, -20.0), Vec3::new(20.0, 0.0, 20.0)))
        );

        mesh.recompute_normals();
        for n in mesh.normals.unwrap() {
            assert!((n - Vec3::Y).length() < 1.0e-6);
        }
    }
}
