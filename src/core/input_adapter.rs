use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::controller::{Button, Controller};

/// Pixels treated as one wheel line for touchpads reporting pixel deltas
const PIXELS_PER_LINE: f32 = 40.0;

/// Adapter that bridges Winit events to the Controller trait
#[derive(Debug, Clone, Default)]
pub struct WinitController {
    pressed_keys: HashSet<Button>,
    /// All pressed buttons as a vec (for get_down_keys)
    pressed_vec: Vec<Button>,
    mouse_position: Option<(f32, f32)>,
    mouse_delta: (f32, f32),
    scroll: f32,
}

impl WinitController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a Winit WindowEvent and update internal state
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    if let Some(button) = Self::keycode_to_button(keycode) {
                        self.set_state(button, event.state);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = Self::mouse_button_to_button(*button) {
                    self.set_state(button, *state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.move_cursor(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_position = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                self.scroll(lines);
            }
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }

    /// Handle an event the UI overlay already consumed.
    ///
    /// Presses and wheel motion stay with the overlay, but releases still land
    /// so a drag that ends over the overlay does not leave a button held. The
    /// cursor is tracked without producing a delta.
    pub fn process_consumed_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            } => self.process_event(event),
            WindowEvent::KeyboardInput { event: key, .. } if key.state == ElementState::Released => {
                self.process_event(event)
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_position = Some((position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } | WindowEvent::Focused(false) => self.process_event(event),
            _ => {}
        }
    }

    fn set_state(&mut self, button: Button, state: ElementState) {
        match state {
            ElementState::Pressed => self.press(button),
            ElementState::Released => self.release(button),
        }
    }

    pub fn press(&mut self, button: Button) {
        if self.pressed_keys.insert(button) {
            self.pressed_vec.push(button);
        }
    }

    pub fn release(&mut self, button: Button) {
        if self.pressed_keys.remove(&button) {
            self.pressed_vec.retain(|&b| b != button);
        }
    }

    pub fn release_all(&mut self) {
        self.pressed_keys.clear();
        self.pressed_vec.clear();
    }

    pub fn move_cursor(&mut self, x: f32, y: f32) {
        if let Some((old_x, old_y)) = self.mouse_position {
            self.mouse_delta.0 += x - old_x;
            self.mouse_delta.1 += y - old_y;
        }
        self.mouse_position = Some((x, y));
    }

    pub fn scroll(&mut self, lines: f32) {
        self.scroll += lines;
    }

    /// Reset per-frame state (mouse and wheel deltas)
    /// Call this at the end of each frame after processing input
    pub fn reset_deltas(&mut self) {
        self.mouse_delta = (0.0, 0.0);
        self.scroll = 0.0;
    }

    pub fn mouse_position(&self) -> Option<(f32, f32)> {
        self.mouse_position
    }

    fn keycode_to_button(keycode: KeyCode) -> Option<Button> {
        match keycode {
            KeyCode::Space => Some(Button::Space),
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Button::Shift),
            KeyCode::Escape => Some(Button::Escape),
            _ => None,
        }
    }

    fn mouse_button_to_button(button: MouseButton) -> Option<Button> {
        match button {
            MouseButton::Left => Some(Button::MouseLeft),
            MouseButton::Right => Some(Button::MouseRight),
            MouseButton::Middle => Some(Button::MouseMiddle),
            _ => None,
        }
    }
}

impl Controller for WinitController {
    fn is_down(&self, button: Button) -> bool {
        self.pressed_keys.contains(&button)
    }

    fn get_down_keys(&self) -> &[Button] {
        &self.pressed_vec
    }

    fn pointer_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    fn scroll_delta(&self) -> f32 {
        self.scroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::DeviceId;

    fn device() -> DeviceId {
        // SAFETY: only compared, never handed back to the platform
        unsafe { DeviceId::dummy() }
    }

    fn mouse(state: ElementState, button: MouseButton) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button,
        }
    }

    fn cursor(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(x, y),
        }
    }

    #[test]
    fn test_release_over_overlay_still_lands() {
        let mut controller = WinitController::new();
        controller.process_event(&mouse(ElementState::Pressed, MouseButton::Left));
        assert!(controller.is_down(Button::MouseLeft));

        controller.process_consumed_event(&mouse(ElementState::Released, MouseButton::Left));
        assert!(!controller.is_down(Button::MouseLeft));
    }

    #[test]
    fn test_press_over_overlay_is_ignored() {
        let mut controller = WinitController::new();
        controller.process_consumed_event(&mouse(ElementState::Pressed, MouseButton::Right));
        assert!(!controller.is_down(Button::MouseRight));

        controller.press(Button::MouseMiddle);
        controller.process_consumed_event(&WindowEvent::Focused(false));
        assert!(controller.get_down_keys().is_empty());
    }

    #[test]
    fn test_cursor_over_overlay_has_no_delta() {
        let mut controller = WinitController::new();
        controller.process_event(&cursor(10.0, 10.0));
        controller.process_consumed_event(&cursor(300.0, 200.0));
        assert_eq!(controller.pointer_delta(), (0.0, 0.0));

        controller.process_event(&cursor(305.0, 200.0));
        assert_eq!(controller.pointer_delta(), (5.0, 0.0));
    }

    #[test]
    fn test_press_release() {
        let mut controller = WinitController::new();
        controller.press(Button::MouseLeft);
        controller.press(Button::MouseLeft);
        assert!(controller.is_down(Button::MouseLeft));
        assert_eq!(controller.get_down_keys(), &[Button::MouseLeft]);

        controller.release(Button::MouseLeft);
        assert!(!controller.is_down(Button::MouseLeft));
        assert!(controller.get_down_keys().is_empty());
    }

    #[test]
    fn test_first_cursor_move_has_no_delta() {
        let mut controller = WinitController::new();
        controller.move_cursor(100.0, 100.0);
        assert_eq!(controller.pointer_delta(), (0.0, 0.0));

        controller.move_cursor(110.0, 95.0);
        controller.move_cursor(115.0, 95.0);
        assert_eq!(controller.pointer_delta(), (15.0, -5.0));
        assert_eq!(controller.mouse_position(), Some((115.0, 95.0)));
    }

    #[test]
    fn test_reset_deltas_keeps_buttons() {
        let mut controller = WinitController::new();
        controller.press(Button::MouseRight);
        controller.move_cursor(0.0, 0.0);
        controller.move_cursor(4.0, 4.0);
        controller.scroll(2.0);

        controller.reset_deltas();

        assert_eq!(controller.pointer_delta(), (0.0, 0.0));
        assert_eq!(controller.scroll_delta(), 0.0);
        assert!(controller.is_down(Button::MouseRight));
    }

    #[test]
    fn test_release_all() {
        let mut controller = WinitController::new();
        controller.press(Button::MouseLeft);
        controller.press(Button::Shift);
        controller.release_all();
        assert!(controller.get_down_keys().is_empty());
    }
}
