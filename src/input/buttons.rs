//! Canonical button table
//!
//! Raw button indices follow the standard gamepad layout (16 buttons). Logical
//! names use the Nintendo physical layout, which is what the Quackbox cabinet
//! controllers report:
//!
//! ```text
//!       [X/North]           (top)
//!   [Y/West] [A/East]       (left/right)
//!       [B/South]           (bottom)
//! ```
//!
//! Raw indices 4/6 and 5/7 (bumper and analog trigger) alias to the same
//! logical trigger. Indices 10 and 11 (stick clicks) have no logical name.

use gilrs::Button;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Logical button names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalButton {
    B,
    A,
    Y,
    X,
    LeftTrigger,
    RightTrigger,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

/// Direction of navigation input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Raw index → logical name, indexed by standard-layout position
pub const BUTTON_TABLE: [Option<LogicalButton>; 16] = [
    Some(LogicalButton::B),
    Some(LogicalButton::A),
    Some(LogicalButton::Y),
    Some(LogicalButton::X),
    Some(LogicalButton::LeftTrigger),
    Some(LogicalButton::RightTrigger),
    Some(LogicalButton::LeftTrigger),
    Some(LogicalButton::RightTrigger),
    Some(LogicalButton::Select),
    Some(LogicalButton::Start),
    None,
    None,
    Some(LogicalButton::Up),
    Some(LogicalButton::Down),
    Some(LogicalButton::Left),
    Some(LogicalButton::Right),
];

/// Logical name for a raw button index, if it has one
pub fn logical_name(raw_index: usize) -> Option<LogicalButton> {
    BUTTON_TABLE.get(raw_index).copied().flatten()
}

impl LogicalButton {
    /// Display label ("LEFT TRIGGER", "A", ...)
    pub fn label(self) -> &'static str {
        match self {
            Self::B => "B",
            Self::A => "A",
            Self::Y => "Y",
            Self::X => "X",
            Self::LeftTrigger => "LEFT TRIGGER",
            Self::RightTrigger => "RIGHT TRIGGER",
            Self::Select => "SELECT",
            Self::Start => "START",
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }

    /// D-pad buttons map to a navigation direction
    pub fn direction(self) -> Option<NavDirection> {
        match self {
            Self::Up => Some(NavDirection::Up),
            Self::Down => Some(NavDirection::Down),
            Self::Left => Some(NavDirection::Left),
            Self::Right => Some(NavDirection::Right),
            _ => None,
        }
    }
}

impl fmt::Display for LogicalButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LogicalButton {
    type Err = anyhow::Error;

    /// Accepts labels ("RIGHT TRIGGER") and config names ("right_trigger")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('_', " ");
        BUTTON_TABLE
            .iter()
            .flatten()
            .copied()
            .find(|b| b.label() == normalized)
            .ok_or_else(|| anyhow::anyhow!("Unknown button name: {}", s))
    }
}

/// Map a gilrs button to its standard-layout raw index
///
/// Returns `None` for buttons outside the 16-button standard layout.
pub fn gilrs_button_to_raw_index(button: Button) -> Option<usize> {
    match button {
        // Face buttons (Nintendo labels: South=B, East=A, West=Y, North=X)
        Button::South => Some(0),
        Button::East => Some(1),
        Button::West => Some(2),
        Button::North => Some(3),

        // Shoulder buttons
        Button::LeftTrigger => Some(4),
        Button::RightTrigger => Some(5),
        Button::LeftTrigger2 => Some(6),
        Button::RightTrigger2 => Some(7),

        // Menu buttons
        Button::Select => Some(8),
        Button::Start => Some(9),

        // Stick clicks (no logical name)
        Button::LeftThumb => Some(10),
        Button::RightThumb => Some(11),

        // D-Pad
        Button::DPadUp => Some(12),
        Button::DPadDown => Some(13),
        Button::DPadLeft => Some(14),
        Button::DPadRight => Some(15),

        Button::Mode | Button::C | Button::Z => None,

        _ => {
            warn!("Unknown gilrs button: {:?}", button);
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_button_mapping_nintendo_layout() {
        assert_eq!(logical_name(gilrs_button_to_raw_index(Button::East).unwrap()), Some(LogicalButton::A));
        assert_eq!(logical_name(gilrs_button_to_raw_index(Button::South).unwrap()), Some(LogicalButton::B));
        assert_eq!(logical_name(gilrs_button_to_raw_index(Button::North).unwrap()), Some(LogicalButton::X));
        assert_eq!(logical_name(gilrs_button_to_raw_index(Button::West).unwrap()), Some(LogicalButton::Y));
    }

    #[test]
    fn test_trigger_aliases() {
        assert_eq!(logical_name(4), logical_name(6));
        assert_eq!(logical_name(5), logical_name(7));
        assert_eq!(logical_name(7), Some(LogicalButton::RightTrigger));
    }

    #[test]
    fn test_unnamed_and_out_of_range_indices() {
        assert_eq!(logical_name(10), None);
        assert_eq!(logical_name(11), None);
        assert_eq!(logical_name(16), None);
        assert_eq!(gilrs_button_to_raw_index(Button::LeftThumb), Some(10));
        assert_eq!(gilrs_button_to_raw_index(Button::Mode), None);
    }

    #[test]
    fn test_dpad_directions() {
        assert_eq!(logical_name(12).and_then(LogicalButton::direction), Some(NavDirection::Up));
        assert_eq!(logical_name(15).and_then(LogicalButton::direction), Some(NavDirection::Right));
        assert_eq!(LogicalButton::A.direction(), None);
    }

    #[test]
    fn test_parse_button_names() {
        assert_eq!("right_trigger".parse::<LogicalButton>().unwrap(), LogicalButton::RightTrigger);
        assert_eq!("LEFT TRIGGER".parse::<LogicalButton>().unwrap(), LogicalButton::LeftTrigger);
        assert_eq!("a".parse::<LogicalButton>().unwrap(), LogicalButton::A);
        assert!("turbo".parse::<LogicalButton>().is_err());
    }
}
