use glam::{Vec2, Vec3};
use std::f32::consts::PI;

use super::Geometry;

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

fn icosahedron_vertices() -> [Vec3; 12] {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
}

/// Non-indexed icosahedron subdivided `detail` times per edge.
///
/// Every face splits into `(detail + 1)^2` triangles, so the buffer holds
/// `60 * (detail + 1)^2` vertices with shared corners repeated.
pub fn icosahedron(radius: f32, detail: u32) -> Geometry {
    polyhedron(&icosahedron_vertices(), &ICOSAHEDRON_FACES, radius, detail)
}

/// Subdivide each face of a polyhedron and project the result onto a sphere
pub fn polyhedron(vertices: &[Vec3], faces: &[[usize; 3]], radius: f32, detail: u32) -> Geometry {
    let mut positions = Vec::new();
    for &[a, b, c] in faces {
        subdivide_face(vertices[a], vertices[b], vertices[c], detail as usize, &mut positions);
    }

    for position in positions.iter_mut() {
        *position = position.normalize() * radius;
    }

    let normals = positions.iter().map(|p| p.normalize()).collect();
    let uvs = positions.iter().map(|&p| spherical_uv(p)).collect();

    Geometry {
        positions,
        normals,
        uvs,
        indices: None,
    }
}

/// Point `step / steps` of the way from `from` to `to`.
///
/// Written so that walking the edge in the opposite direction yields the
/// bit-identical point: both directions multiply the same weights and float
/// addition is commutative. Exact-match deduplication depends on this.
fn edge_point(from: Vec3, to: Vec3, step: usize, steps: usize) -> Vec3 {
    let w_to = step as f32 / steps as f32;
    let w_from = (steps - step) as f32 / steps as f32;
    from * w_from + to * w_to
}

fn subdivide_face(a: Vec3, b: Vec3, c: Vec3, detail: usize, out: &mut Vec<Vec3>) {
    let cols = detail + 1;

    let mut grid: Vec<Vec<Vec3>> = Vec::with_capacity(cols + 1);
    for i in 0..=cols {
        let aj = edge_point(a, c, i, cols);
        let bj = edge_point(b, c, i, cols);
        let rows = cols - i;

        let row = (0..=rows)
            .map(|j| if rows == 0 { aj } else { edge_point(aj, bj, j, rows) })
            .collect();
        grid.push(row);
    }

    for i in 0..cols {
        for j in 0..(2 * (cols - i) - 1) {
            let k = j / 2;
            if j % 2 == 0 {
                out.extend_from_slice(&[grid[i][k + 1], grid[i + 1][k], grid[i][k]]);
            } else {
                out.extend_from_slice(&[grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]);
            }
        }
    }
}

fn spherical_uv(p: Vec3) -> Vec2 {
    let azimuth = p.z.atan2(-p.x);
    let inclination = (-p.y).atan2((p.x * p.x + p.z * p.z).sqrt());
    Vec2::new(azimuth / (2.0 * PI) + 0.5, inclination / PI + 0.5)
}
