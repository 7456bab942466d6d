use canvas_sketches::geometry::{circle, icosahedron, sphere};
use canvas_sketches::math::unique_points;

#[cfg(test)]
mod geometry_tests {
    use super::*;

    #[test]
    fn test_sphere_vertex_and_triangle_counts() {
        let geometry = sphere(1.0, 32, 16);
        assert_eq!(geometry.vertex_count(), 33 * 17);
        // Pole rows contribute one triangle per segment instead of two
        assert_eq!(geometry.triangle_count(), 32 * 16 * 2 - 2 * 32);
    }

    #[test]
    fn test_sphere_points_on_radius() {
        let geometry = sphere(2.5, 12, 6);
        for p in geometry.points() {
            assert!((p.length() - 2.5).abs() < 1e-4);
        }
    }

    #[test]
    fn test_icosahedron_detail_counts() {
        assert_eq!(icosahedron(1.0, 0).vertex_count(), 60);
        assert_eq!(icosahedron(1.0, 1).vertex_count(), 240);
        assert_eq!(icosahedron(1.0, 2).vertex_count(), 540);
    }

    #[test]
    fn test_icosahedron_unique_vertices() {
        // 10 * 4^detail + 2 for detail 0 and 1
        assert_eq!(unique_points(icosahedron(1.0, 0).points()).len(), 12);
        assert_eq!(unique_points(icosahedron(1.0, 1).points()).len(), 42);
    }

    #[test]
    fn test_circle_fan() {
        let geometry = circle(1.0, 32);
        assert_eq!(geometry.vertex_count(), 34);
        assert_eq!(geometry.triangle_count(), 32);
        assert!(geometry.triangle_indices().iter().all(|&i| (i as usize) < geometry.vertex_count()));
    }

    #[test]
    fn test_wireframe_edges_are_unique() {
        let geometry = icosahedron(1.0, 0);
        let edges = geometry.edge_indices();
        // Non-indexed faces share no indices, so each triangle adds three edges
        assert_eq!(edges.len(), 20 * 3 * 2);
    }
}
