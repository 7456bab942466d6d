use glam::{Mat4, Vec3};

/// Perspective camera aimed at a target point
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Recompute the projection; call after changing fov, aspect or clip planes
    pub fn update_projection_matrix(&mut self) {
        let aspect = if self.aspect.is_finite() && self.aspect > 0.0 {
            self.aspect
        } else {
            1.0
        };
        self.projection = Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_projects_to_screen_center() {
        let mut camera = PerspectiveCamera::new(50.0, 1.0, 0.01, 100.0);
        camera.position = Vec3::new(3.0, 3.0, -5.0);
        camera.look_at(Vec3::ZERO);

        let clip = camera.view_projection() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_aspect_change_needs_update() {
        let mut camera = PerspectiveCamera::new(50.0, 1.0, 0.01, 100.0);
        let before = camera.projection_matrix();

        camera.aspect = 2.0;
        assert_eq!(camera.projection_matrix(), before);

        camera.update_projection_matrix();
        assert_ne!(camera.projection_matrix(), before);
    }

    #[test]
    fn test_degenerate_aspect_is_ignored() {
        let mut camera = PerspectiveCamera::new(50.0, 0.0, 0.01, 100.0);
        camera.update_projection_matrix();
        assert!(camera.projection_matrix().is_finite());
    }

    #[test]
    fn test_forward_points_at_target() {
        let mut camera = PerspectiveCamera::new(50.0, 1.0, 0.01, 100.0);
        camera.position = Vec3::new(0.0, 0.0, -4.0);
        camera.look_at(Vec3::ZERO);
        assert!((camera.forward() - Vec3::Z).length() < 1e-6);
    }
}
