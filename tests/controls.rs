use canvas_sketches::camera::PerspectiveCamera;
use canvas_sketches::controls::OrbitControls;
use canvas_sketches::core::{Button, WinitController};
use glam::Vec3;

fn camera() -> PerspectiveCamera {
    let mut camera = PerspectiveCamera::new(50.0, 1.0, 0.01, 100.0);
    camera.position = Vec3::new(0.0, 0.0, -4.0);
    camera.look_at(Vec3::ZERO);
    camera
}

fn drag(input: &mut WinitController, button: Button, dx: f32, dy: f32) {
    input.press(button);
    input.move_cursor(100.0, 100.0);
    input.move_cursor(100.0 + dx, 100.0 + dy);
}

#[cfg(test)]
mod controls_tests {
    use super::*;

    #[test]
    fn test_rotate_keeps_distance() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        let mut input = WinitController::new();
        drag(&mut input, Button::MouseLeft, 50.0, 20.0);

        controls.handle_input(&input, 800.0, &camera);
        assert!(controls.update(&mut camera));

        assert!((camera.position.length() - 4.0).abs() < 1e-4);
        assert!(camera.position.distance(Vec3::new(0.0, 0.0, -4.0)) > 0.1);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_update_without_input_is_stable() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        let before = camera.position;

        assert!(!controls.update(&mut camera));
        assert!(camera.position.distance(before) < 1e-5);
    }

    #[test]
    fn test_scroll_dollies_toward_target() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        let mut input = WinitController::new();
        input.scroll(1.0);

        controls.handle_input(&input, 800.0, &camera);
        controls.update(&mut camera);
        assert!((camera.position.length() - 4.0 * 0.95).abs() < 1e-4);

        let mut input = WinitController::new();
        input.scroll(-1.0);
        controls.handle_input(&input, 800.0, &camera);
        controls.update(&mut camera);
        assert!((camera.position.length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_distance_limits() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        controls.min_distance = 3.0;
        controls.max_distance = 5.0;

        controls.dolly_in(0.1);
        controls.update(&mut camera);
        assert!((camera.position.length() - 3.0).abs() < 1e-4);

        controls.dolly_out(0.1);
        controls.update(&mut camera);
        assert!((camera.position.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_polar_angle_never_reaches_pole() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);

        controls.rotate_up(10.0);
        controls.update(&mut camera);

        let horizontal = Vec3::new(camera.position.x, 0.0, camera.position.z).length();
        assert!(horizontal > 0.0);
        assert!(camera.position.y > 0.0);
    }

    #[test]
    fn test_pan_moves_target() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        let mut input = WinitController::new();
        drag(&mut input, Button::MouseRight, 40.0, 0.0);

        controls.handle_input(&input, 800.0, &camera);
        controls.update(&mut camera);

        assert!(controls.target.length() > 0.0);
        assert!((camera.position.distance(controls.target) - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_middle_drag_dollies() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);

        // 40px of an 800px viewport is one wheel notch
        let mut input = WinitController::new();
        drag(&mut input, Button::MouseMiddle, 0.0, 40.0);
        controls.handle_input(&input, 800.0, &camera);
        assert!(controls.update(&mut camera));
        assert!((camera.position.length() - 4.0 / 0.95).abs() < 1e-3);
        assert_eq!(controls.target, Vec3::ZERO);

        let mut input = WinitController::new();
        drag(&mut input, Button::MouseMiddle, 25.0, -40.0);
        controls.handle_input(&input, 800.0, &camera);
        controls.update(&mut camera);
        assert!((camera.position.length() - 4.0).abs() < 1e-3);
        assert_eq!(controls.target, Vec3::ZERO);
        assert!(camera.position.x.abs() < 1e-4);
    }

    #[test]
    fn test_disposed_controls_ignore_input() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        let mut input = WinitController::new();
        drag(&mut input, Button::MouseLeft, 200.0, 0.0);
        input.scroll(3.0);

        controls.dispose();
        assert!(controls.is_disposed());
        controls.handle_input(&input, 800.0, &camera);
        assert!(!controls.update(&mut camera));
    }
}
