use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

use super::Geometry;

/// Indexed UV sphere.
///
/// Produces `(width_segments + 1) * (height_segments + 1)` vertices; the seam
/// column is duplicated so the texture wraps cleanly. Pole rows get half a
/// segment of uv offset and their zero-area triangles are skipped.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let width_segments = width_segments.max(3) as usize;
    let height_segments = height_segments.max(2) as usize;

    let mut geometry = Geometry::default();
    let mut grid: Vec<Vec<u32>> = Vec::with_capacity(height_segments + 1);
    let mut index = 0u32;

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let u_offset = if iy == 0 {
            0.5 / width_segments as f32
        } else if iy == height_segments {
            -0.5 / width_segments as f32
        } else {
            0.0
        };

        let mut row = Vec::with_capacity(width_segments + 1);
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * TAU;
            let theta = v * PI;

            let position = Vec3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            );

            geometry.positions.push(position);
            geometry.normals.push(position.normalize_or_zero());
            geometry.uvs.push(Vec2::new(u + u_offset, 1.0 - v));

            row.push(index);
            index += 1;
        }
        grid.push(row);
    }

    let mut indices = Vec::with_capacity(width_segments * (height_segments - 1) * 6);
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];

            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    geometry.indices = Some(indices);
    geometry
}
