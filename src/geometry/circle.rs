use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

use super::Geometry;

/// Flat disc in the XY plane facing +Z, as a triangle fan around the center
pub fn circle(radius: f32, segments: u32) -> Geometry {
    let segments = segments.max(3);

    let mut geometry = Geometry {
        positions: vec![Vec3::ZERO],
        normals: vec![Vec3::Z],
        uvs: vec![Vec2::splat(0.5)],
        indices: None,
    };

    for s in 0..=segments {
        let theta = s as f32 / segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();

        geometry.positions.push(Vec3::new(radius * cos, radius * sin, 0.0));
        geometry.normals.push(Vec3::Z);
        geometry.uvs.push(Vec2::new((cos + 1.0) / 2.0, (sin + 1.0) / 2.0));
    }

    let indices = (1..=segments).flat_map(|i| [i, i + 1, 0]).collect();
    geometry.indices = Some(indices);
    geometry
}
