/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Digit1,
    Digit2,
    Digit3,
    KeyO,
    KeyM,
    Escape,
}

impl Button {
    pub const ALL: [Button; 6] = [
        Button::Digit1,
        Button::Digit2,
        Button::Digit3,
        Button::KeyO,
        Button::KeyM,
        Button::Escape,
    ];
}

/// Controller - reports which buttons are held right now
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;
}
