/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    MouseLeft,
    MouseRight,
    MouseMiddle,
    Shift,
    Space,
    Escape,
}

/// Controller - pointer and key state for one frame
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;

    /// Get all currently pressed buttons
    fn get_down_keys(&self) -> &[Button];

    /// Pointer movement in physical pixels since the last frame
    fn pointer_delta(&self) -> (f32, f32);

    /// Wheel movement in lines since the last frame, positive away from the user
    fn scroll_delta(&self) -> f32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_button_hash_duplicates() {
        let mut set = HashSet::new();
        set.insert(Button::MouseLeft);
        set.insert(Button::MouseLeft);
        set.insert(Button::Space);

        assert_eq!(set.len(), 2);
    }

    struct MockController {
        pressed: Vec<Button>,
    }

    impl Controller for MockController {
        fn is_down(&self, button: Button) -> bool {
            self.pressed.contains(&button)
        }

        fn get_down_keys(&self) -> &[Button] {
            &self.pressed
        }

        fn pointer_delta(&self) -> (f32, f32) {
            (0.0, 0.0)
        }

        fn scroll_delta(&self) -> f32 {
            0.0
        }
    }

    #[test]
    fn test_controller_is_down() {
        let controller = MockController {
            pressed: vec![Button::MouseLeft, Button::Shift],
        };

        assert!(controller.is_down(Button::MouseLeft));
        assert!(controller.is_down(Button::Shift));
        assert!(!controller.is_down(Button::MouseRight));
        assert_eq!(controller.get_down_keys().len(), 2);
    }
}
