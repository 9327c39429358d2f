//! Canonical per-controller button state
//!
//! Both input paths (physical gilrs polling and the simulated keyboard) produce
//! the same [`ControllerSnapshot`] shape. Snapshots are replaced wholesale on
//! every sample tick; consumers never mutate one in place.

use serde::Serialize;

/// Number of buttons in the standard gamepad layout
pub const STANDARD_BUTTON_COUNT: usize = 16;

/// State of a single button
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ButtonState {
    pub pressed: bool,
    /// Analog value in [0, 1] (1.0 for digital presses)
    pub value: f32,
}

impl ButtonState {
    pub const RELEASED: Self = Self {
        pressed: false,
        value: 0.0,
    };

    pub const PRESSED: Self = Self {
        pressed: true,
        value: 1.0,
    };

    /// Build a state from an analog value, clamping it into [0, 1]
    pub fn from_value(pressed: bool, value: f32) -> Self {
        Self {
            pressed,
            value: value.clamp(0.0, 1.0),
        }
    }
}

/// Button state of one controller slot at one sample tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerSnapshot {
    /// Stable controller slot id
    pub index: usize,
    pub connected: bool,
    pub buttons: Vec<ButtonState>,
}

impl ControllerSnapshot {
    /// A connected controller with every standard button released
    pub fn idle(index: usize) -> Self {
        Self {
            index,
            connected: true,
            buttons: vec![ButtonState::RELEASED; STANDARD_BUTTON_COUNT],
        }
    }

    /// Return a copy with one button replaced (out-of-range indices are ignored)
    pub fn with_button(mut self, raw_index: usize, state: ButtonState) -> Self {
        if let Some(button) = self.buttons.get_mut(raw_index) {
            *button = state;
        }
        self
    }

    pub fn is_pressed(&self, raw_index: usize) -> bool {
        self.buttons.get(raw_index).is_some_and(|b| b.pressed)
    }

    /// Pressed flags in raw index order
    pub fn pressed_mask(&self) -> Vec<bool> {
        self.buttons.iter().map(|b| b.pressed).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_snapshot_has_standard_layout() {
        let snapshot = ControllerSnapshot::idle(3);
        assert_eq!(snapshot.index, 3);
        assert!(snapshot.connected);
        assert_eq!(snapshot.buttons.len(), STANDARD_BUTTON_COUNT);
        assert!(snapshot.buttons.iter().all(|b| !b.pressed));
    }

    #[test]
    fn test_with_button_ignores_out_of_range() {
        let snapshot = ControllerSnapshot::idle(0)
            .with_button(1, ButtonState::PRESSED)
            .with_button(99, ButtonState::PRESSED);
        assert!(snapshot.is_pressed(1));
        assert!(!snapshot.is_pressed(99));
        assert_eq!(snapshot.buttons.len(), STANDARD_BUTTON_COUNT);
    }

    #[test]
    fn test_from_value_clamps() {
        assert_eq!(ButtonState::from_value(true, 1.7).value, 1.0);
        assert_eq!(ButtonState::from_value(false, -0.2).value, 0.0);
    }
}
