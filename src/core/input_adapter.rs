use std::collections::HashSet;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::controller::{Button, Controller};

/// Adapter that bridges Winit events to the Controller trait
#[derive(Debug, Clone, Default)]
pub struct WinitController {
    /// Currently pressed buttons
    pressed_keys: HashSet<Button>,
}

impl WinitController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a Winit WindowEvent and update internal state
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(keycode) = event.physical_key else {
                    return;
                };
                if let Some(button) = Self::keycode_to_button(keycode) {
                    self.set_state(button, event.state);
                }
            }
            // Keys released while unfocused never reach us
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }

    pub fn set_state(&mut self, button: Button, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.pressed_keys.insert(button);
            }
            ElementState::Released => {
                self.pressed_keys.remove(&button);
            }
        }
    }

    pub fn release_all(&mut self) {
        self.pressed_keys.clear();
    }

    /// Map Winit KeyCode to Button
    pub fn keycode_to_button(keycode: KeyCode) -> Option<Button> {
        match keycode {
            KeyCode::Digit1 | KeyCode::Numpad1 => Some(Button::Digit1),
            KeyCode::Digit2 | KeyCode::Numpad2 => Some(Button::Digit2),
            KeyCode::Digit3 | KeyCode::Numpad3 => Some(Button::Digit3),
            KeyCode::KeyO => Some(Button::KeyO),
            KeyCode::KeyM => Some(Button::KeyM),
            KeyCode::Escape => Some(Button::Escape),
            _ => None,
        }
    }
}

impl Controller for WinitController {
    fn is_down(&self, button: Button) -> bool {
        self.pressed_keys.contains(&button)
    }
}
