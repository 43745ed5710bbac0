use super::{utils, RenderMesh};
use glamx::{Vec2, Vec3};

/// Generates a floor grid made of thin flat strips.
///
/// The grid spans `size` along X and Z, centered at the origin, and is cut into
/// `divisions` cells along each axis, which gives `divisions + 1` lines per axis.
/// Each line is a strip `line_width` wide lying slightly above `y = 0` so that it does
/// not fight with a floor plane.
///
/// # Panics
/// Panics if `divisions` is 0.
pub fn grid(size: f32, divisions: u32, line_width: f32) -> RenderMesh {
    assert!(divisions > 0, "A grid needs at least one division.");

    const LIFT: f32 = 1.0e-3;

    let half = size / 2.0;
    let hw = line_width / 2.0;
    let step = size / divisions as f32;

    let mut coords = Vec::new();
    let mut indices = Vec::new();

    for k in 0..=divisions {
        let offset = -half + k as f32 * step;

        // Line parallel to Z, then line parallel to X.
        let strips = [
            [
                Vec3::new(offset - hw, LIFT, -half),
                Vec3::new(offset + hw, LIFT, -half),
                Vec3::new(offset - hw, LIFT, half),
                Vec3::new(offset + hw, LIFT, half),
            ],
            [
                Vec3::new(-half, LIFT, offset - hw),
                Vec3::new(half, LIFT, offset - hw),
                Vec3::new(-half, LIFT, offset + hw),
                Vec3::new(half, LIFT, offset + hw),
            ],
        ];

        for [ul, ur, dl, dr] in strips {
            let base = coords.len() as u32;
            coords.extend_from_slice(&[ul, ur, dl, dr]);
            utils::push_rectangle_indices(base, base + 1, base + 2, base + 3, &mut indices);
        }
    }

    let normals = vec![Vec3::Y; coords.len()];
    let uvs = vec![Vec2::ZERO; coords.len()];

    RenderMesh::new(coords, Some(normals), Some(uvs), Some(indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_two_strips_per_line() {
        let mesh = grid(2000.0, 40, 0.5);
        assert_eq!(mesh.num_triangles(), 41 * 2 * 2);
        let (mins, maxs) = mesh.bounds().unwrap();
        assert!((mins.x + 1000.25).abs() < 1.0e-3);
        assert!((maxs.z - 1000.25).abs() < 1.0e-3);
    }

    #[test]
    fn strips_face_up() {
        let mut mesh = grid(10.0, 2, 0.1);
        mesh.recompute_normals();
        for n in mesh.normals.unwrap() {
            assert!(n.y > 0.99);
        }
    }
}
