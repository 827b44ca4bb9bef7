use std::collections::HashMap;

use super::controller::{Button, Controller};

/// Turns held-key state into discrete press events
///
/// Remembers whether each monitored button was down at the previous poll and
/// reports only up-to-down transitions, so holding a key fires once.
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    monitored: Vec<Button>,
    was_down: HashMap<Button, bool>,
}

impl EdgeDetector {
    /// Watches `buttons`; all start as released
    pub fn new(buttons: impl IntoIterator<Item = Button>) -> Self {
        let mut monitored = Vec::new();
        for button in buttons {
            if !monitored.contains(&button) {
                monitored.push(button);
            }
        }
        let was_down = monitored.iter().map(|&button| (button, false)).collect();

        Self {
            monitored,
            was_down,
        }
    }

    pub fn monitored(&self) -> &[Button] {
        &self.monitored
    }

    /// Button state as of the last poll; false for unmonitored buttons
    pub fn was_down(&self, button: Button) -> bool {
        self.was_down.get(&button).copied().unwrap_or(false)
    }

    /// Samples every monitored button and calls `on_press` for each rising edge
    ///
    /// Handlers run in monitoring order. The stored state is updated for every
    /// button whether or not it fired.
    pub fn poll(&mut self, controller: &dyn Controller, mut on_press: impl FnMut(Button)) {
        for &button in &self.monitored {
            let down = controller.is_down(button);
            let previous = self.was_down.insert(button, down).unwrap_or(false);
            if down && !previous {
                on_press(button);
            }
        }
    }

    /// Like [`EdgeDetector::poll`], collecting the pressed buttons
    pub fn pressed(&mut self, controller: &dyn Controller) -> Vec<Button> {
        let mut pressed = Vec::new();
        self.poll(controller, |button| pressed.push(button));
        pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockController {
        pressed: Vec<Button>,
    }

    impl Controller for MockController {
        fn is_down(&self, button: Button) -> bool {
            self.pressed.contains(&button)
        }
    }

    fn held(buttons: &[Button]) -> MockController {
        MockController {
            pressed: buttons.to_vec(),
        }
    }

    #[test]
    fn test_fires_once_while_held() {
        let mut detector = EdgeDetector::new([Button::KeyO]);

        assert_eq!(detector.pressed(&held(&[Button::KeyO])), vec![Button::KeyO]);
        assert!(detector.pressed(&held(&[Button::KeyO])).is_empty());
        assert!(detector.pressed(&held(&[Button::KeyO])).is_empty());
    }

    #[test]
    fn test_release_then_press_fires_again() {
        let mut detector = EdgeDetector::new([Button::KeyO]);

        detector.pressed(&held(&[Button::KeyO]));
        assert!(detector.pressed(&held(&[])).is_empty());
        assert_eq!(detector.pressed(&held(&[Button::KeyO])), vec![Button::KeyO]);
    }

    #[test]
    fn test_release_does_not_fire() {
        let mut detector = EdgeDetector::new([Button::KeyM]);

        detector.pressed(&held(&[Button::KeyM]));
        assert!(detector.pressed(&held(&[])).is_empty());
        assert!(!detector.was_down(Button::KeyM));
    }

    #[test]
    fn test_simultaneous_presses_in_monitoring_order() {
        let mut detector = EdgeDetector::new([Button::Digit1, Button::KeyO, Button::KeyM]);

        let pressed = detector.pressed(&held(&[Button::KeyM, Button::Digit1]));
        assert_eq!(pressed, vec![Button::Digit1, Button::KeyM]);
    }

    #[test]
    fn test_unmonitored_buttons_ignored() {
        let mut detector = EdgeDetector::new([Button::Digit1]);

        assert!(detector.pressed(&held(&[Button::Escape])).is_empty());
        assert!(!detector.was_down(Button::Escape));
    }

    #[test]
    fn test_state_updates_for_every_button() {
        let mut detector = EdgeDetector::new([Button::Digit1, Button::Digit2]);

        detector.pressed(&held(&[Button::Digit1, Button::Digit2]));
        assert!(detector.was_down(Button::Digit1));
        assert!(detector.was_down(Button::Digit2));

        detector.pressed(&held(&[Button::Digit2]));
        assert!(!detector.was_down(Button::Digit1));
        assert!(detector.was_down(Button::Digit2));
    }

    #[test]
    fn test_duplicate_buttons_monitored_once() {
        let detector = EdgeDetector::new([Button::KeyO, Button::KeyO]);
        assert_eq!(detector.monitored(), &[Button::KeyO]);
    }
}
