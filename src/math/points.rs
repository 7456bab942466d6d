use glam::{Mat3, Mat4, Vec3};

/// Starting distance for the nearest-point scan, also the result for an empty set
pub const FAR_DISTANCE: f32 = 10000.0;

/// Remove duplicate points using exact coordinate equality.
///
/// The first occurrence of every point is kept and the original order is
/// preserved.
pub fn unique_points(points: &[Vec3]) -> Vec<Vec3> {
    let mut unique: Vec<Vec3> = Vec::with_capacity(points.len());
    for &point in points {
        if !unique.iter().any(|&seen| seen == point) {
            unique.push(point);
        }
    }
    unique
}

/// Distance from `position` to the closest point of the set
pub fn nearest_distance(position: Vec3, points: &[Vec3]) -> f32 {
    points
        .iter()
        .fold(FAR_DISTANCE, |dist, &p| position.distance(p).min(dist))
}

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Anti-aliased step: a smoothstep `width` wide around `threshold`.
///
/// On the GPU the width comes from screen-space derivatives; a width of zero
/// degrades to a hard step.
pub fn aastep(threshold: f32, value: f32, width: f32) -> f32 {
    if width <= 0.0 {
        return if value < threshold { 0.0 } else { 1.0 };
    }
    smoothstep(threshold - width, threshold + width, value)
}

/// 1.0 inside a dot of `radius` around any point of the set, 0.0 outside
pub fn dot_mask(position: Vec3, points: &[Vec3], radius: f32, width: f32) -> f32 {
    1.0 - aastep(radius, nearest_distance(position, points), width)
}

/// Rim term for a point on a unit sphere: 0 facing the camera, 1 at the silhouette
pub fn sphere_rim(local_position: Vec3, model: Mat4, camera_position: Vec3) -> f32 {
    let normal = local_position.normalize();
    let world_normal = (Mat3::from_mat4(model) * normal).normalize();
    let world_position = model.transform_point3(local_position);
    let view = (camera_position - world_position).normalize();
    let rim = 1.0 - view.dot(world_normal).max(0.0);
    smoothstep(0.0, 1.0, rim).powf(0.5)
}
