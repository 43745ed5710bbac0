//! Helpers shared by the mesh generators.

use glamx::Vec3;

/// Splits the quad `ul, ur, dl, dr` (up-left to down-right) into two counterclockwise triangles.
#[inline]
pub fn push_rectangle_indices(ul: u32, ur: u32, dl: u32, dr: u32, out: &mut Vec<[u32; 3]>) {
    out.push([ul, dl, dr]);
    out.push([dr, ur, ul]);
}

/// Writes one normal per vertex into `normals`: the mean of the unit normals of the faces
/// touching it. Degenerate faces count as zero.
pub fn compute_normals(coords: &[Vec3], faces: &[[u32; 3]], normals: &mut Vec<Vec3>) {
    let mut counts = vec![0u32; coords.len()];

    normals.clear();
    normals.resize(coords.len(), Vec3::ZERO);

    for face in faces {
        let [a, b, c] = face.map(|i| coords[i as usize]);
        let normal = (b - a).cross(c - a).normalize_or_zero();

        for &i in face {
            normals[i as usize] += normal;
            counts[i as usize] += 1;
        }
    }

    for (n, &count) in normals.iter_mut().zip(&counts) {
        if count > 0 {
            *n /= count as f32;
        }
    }
}
