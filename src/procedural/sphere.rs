use super::{utils, RenderMesh};
use glamx::{Vec2, Vec3};
use std::f32::consts::PI;

/// Generates a UV sphere centered at the origin.
///
/// # Arguments
/// * `radius` - The sphere radius
/// * `ntheta_subdiv` - Number of subdivisions around the Y axis (longitude). Must be at least 3.
/// * `nphi_subdiv` - Number of subdivisions from pole to pole (latitude). Must be at least 2.
///
/// Texture coordinates wrap once around the equator, so a tiled fabric map repeats
/// `repeat.x` times around the sphere.
///
/// # Panics
/// Panics if the subdivision counts are too small to form a closed surface.
pub fn sphere(radius: f32, ntheta_subdiv: u32, nphi_subdiv: u32) -> RenderMesh {
    assert!(
        ntheta_subdiv >= 3 && nphi_subdiv >= 2,
        "A sphere needs at least 3 longitudinal and 2 latitudinal subdivisions."
    );

    let mut coords = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    // One extra column duplicates the seam so that texture coordinates do not wrap back.
    for i in 0..=nphi_subdiv {
        let v = i as f32 / nphi_subdiv as f32;
        let phi = v * PI;

        for j in 0..=ntheta_subdiv {
            let u = j as f32 / ntheta_subdiv as f32;
            let theta = u * 2.0 * PI;

            let n = Vec3::new(-theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin());
            normals.push(n);
            coords.push(n * radius);
            uvs.push(Vec2::new(u, v));
        }
    }

    let ws = ntheta_subdiv + 1;
    for i in 0..nphi_subdiv {
        for j in 0..ntheta_subdiv {
            let ul = i * ws + j;
            let ur = ul + 1;
            let dl = ul + ws;
            let dr = dl + 1;

            if i == 0 {
                indices.push([ul, dl, dr]);
            } else if i == nphi_subdiv - 1 {
                indices.push([dr, ur, ul]);
            } else {
                utils::push_rectangle_indices(ul, ur, dl, dr, &mut indices);
            }
        }
    }

    RenderMesh::new(coords, Some(normals), Some(uvs), Some(indices))
}
