use glam::Vec3;
use std::f32::consts::{PI, TAU};

use crate::camera::PerspectiveCamera;
use crate::core::{Button, Controller};

/// Keeps the polar angle off the poles so the view basis never degenerates
const POLAR_EPSILON: f32 = 0.000001;
const BASE_ZOOM_SCALE: f32 = 0.95;
/// Wheel notches worth of dolly for a vertical drag across the whole viewport
const DRAG_DOLLY_STEPS: f32 = 20.0;

/// Orbit the camera around a target with the mouse.
///
/// Left drag rotates, middle drag and the wheel dolly, right drag pans. Input only records
/// deltas; [`OrbitControls::update`] applies them to the camera.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enabled: bool,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vec3,
    disposed: bool,
}

impl OrbitControls {
    pub fn new(camera: &PerspectiveCamera) -> Self {
        Self {
            target: camera.target,
            enabled: true,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            disposed: false,
        }
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.theta_delta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.phi_delta -= angle;
    }

    /// Move toward the target by `scale` (< 1 gets closer)
    pub fn dolly_in(&mut self, scale: f32) {
        self.scale *= scale;
    }

    pub fn dolly_out(&mut self, scale: f32) {
        self.scale /= scale;
    }

    fn zoom_scale(&self) -> f32 {
        BASE_ZOOM_SCALE.powf(self.zoom_speed)
    }

    /// Translate pointer and wheel deltas into pending camera motion
    pub fn handle_input(
        &mut self,
        input: &dyn Controller,
        viewport_height: f32,
        camera: &PerspectiveCamera,
    ) {
        if !self.enabled || self.disposed {
            return;
        }

        let height = viewport_height.max(1.0);
        let (dx, dy) = input.pointer_delta();

        if input.is_down(Button::MouseLeft) {
            self.rotate_left(TAU * dx / height * self.rotate_speed);
            self.rotate_up(TAU * dy / height * self.rotate_speed);
        } else if input.is_down(Button::MouseMiddle) {
            // dragging down moves away, up moves closer
            let scale = self.zoom_scale().powf(DRAG_DOLLY_STEPS * dy.abs() / height);
            if dy > 0.0 {
                self.dolly_out(scale);
            } else if dy < 0.0 {
                self.dolly_in(scale);
            }
        } else if input.is_down(Button::MouseRight) {
            self.pan(dx, dy, height, camera);
        }

        let scroll = input.scroll_delta();
        if scroll > 0.0 {
            self.dolly_in(self.zoom_scale());
        } else if scroll < 0.0 {
            self.dolly_out(self.zoom_scale());
        }
    }

    fn pan(&mut self, dx: f32, dy: f32, height: f32, camera: &PerspectiveCamera) {
        let distance = (camera.position - self.target).length();
        let target_distance = distance * (camera.fov.to_radians() / 2.0).tan();

        let view = camera.view_matrix().inverse();
        let right = view.x_axis.truncate();
        let up = view.y_axis.truncate();

        self.pan_offset += right * (-2.0 * dx * target_distance / height * self.pan_speed);
        self.pan_offset += up * (2.0 * dy * target_distance / height * self.pan_speed);
    }

    /// Apply pending motion; returns whether the camera moved
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let changed =
            self.theta_delta != 0.0 || self.phi_delta != 0.0 || self.scale != 1.0 || self.pan_offset != Vec3::ZERO;

        let offset = camera.position - self.target;
        let radius = offset.length();

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        theta += self.theta_delta;
        phi += self.phi_delta;
        phi = phi.clamp(
            self.min_polar_angle.max(POLAR_EPSILON),
            self.max_polar_angle.min(PI - POLAR_EPSILON),
        );

        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset;

        let offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );

        camera.position = self.target + offset;
        camera.look_at(self.target);

        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vec3::ZERO;

        changed
    }

    /// Stop listening to input; the camera keeps its last pose
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.enabled = false;
        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vec3::ZERO;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
