//! Procedural mesh data: vertex attributes plus optional triangle indices.

mod circle;
mod polyhedron;
mod sphere;

pub use circle::circle;
pub use polyhedron::{icosahedron, polyhedron};
pub use sphere::sphere;

use glam::{Vec2, Vec3};
use std::collections::HashSet;

/// Interleaved vertex as uploaded to the GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Triangle mesh with per-vertex position, normal and uv.
///
/// `indices` is `None` for non-indexed geometry, where every three consecutive
/// vertices form one triangle.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Option<Vec<u32>>,
}

impl Geometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Raw vertex positions, duplicates included
    pub fn points(&self) -> &[Vec3] {
        &self.positions
    }

    /// Triangle list indices, synthesized for non-indexed geometry
    pub fn triangle_indices(&self) -> Vec<u32> {
        match &self.indices {
            Some(indices) => indices.clone(),
            None => (0..self.positions.len() as u32).collect(),
        }
    }

    /// Line list indices covering every distinct triangle edge once
    pub fn edge_indices(&self) -> Vec<u32> {
        let triangles = self.triangle_indices();
        let mut seen = HashSet::new();
        let mut lines = Vec::new();

        for tri in triangles.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                // Zero-area pole triangles repeat an index
                if a == b {
                    continue;
                }
                if seen.insert((a.min(b), a.max(b))) {
                    lines.push(a);
                    lines.push(b);
                }
            }
        }

        lines
    }

    pub fn vertices(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex {
                position: position.to_array(),
                normal: self.normals.get(i).copied().unwrap_or(Vec3::Z).to_array(),
                uv: self.uvs.get(i).copied().unwrap_or(Vec2::ZERO).to_array(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Geometry {
        Geometry {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y],
            normals: vec![Vec3::Z; 4],
            uvs: vec![Vec2::ZERO; 4],
            indices: Some(vec![0, 1, 2, 0, 2, 3]),
        }
    }

    #[test]
    fn test_quad_edges_share_diagonal() {
        // 4 outer edges + 1 shared diagonal
        assert_eq!(quad().edge_indices().len(), 5 * 2);
    }

    #[test]
    fn test_non_indexed_triangle_indices() {
        let geometry = Geometry {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            ..Default::default()
        };
        assert_eq!(geometry.triangle_indices(), vec![0, 1, 2]);
        assert_eq!(geometry.triangle_count(), 1);
    }

    #[test]
    fn test_vertices_fill_missing_attributes() {
        let geometry = Geometry {
            positions: vec![Vec3::X],
            ..Default::default()
        };
        let vertices = geometry.vertices();
        assert_eq!(vertices[0].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[0].uv, [0.0, 0.0]);
    }

    #[test]
    fn test_vertex_stride() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(Vertex::layout().array_stride, 32);
    }
}
