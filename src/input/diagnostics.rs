//! Gamepad diagnostics for troubleshooting detection and button layout

use super::buttons::{gilrs_button_to_raw_index, logical_name};
use gilrs::{Button, Event, EventType, Gilrs};
use std::thread;
use std::time::Duration;
use tracing::info;

const LISTED_BUTTONS: [Button; 17] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::Mode,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
];

/// Describe how a gilrs button lands in the canonical table
pub fn describe_button(button: Button) -> String {
    match gilrs_button_to_raw_index(button) {
        Some(raw) => match logical_name(raw) {
            Some(name) => format!("{:?} -> #{} {}", button, raw, name),
            None => format!("{:?} -> #{} (unnamed)", button, raw),
        },
        None => format!("{:?} -> (not mapped)", button),
    }
}

/// Print every detected gamepad with its current button state
///
/// Hold the connect button (RIGHT TRIGGER) while running this to check that a
/// controller reports it where the launcher expects.
pub fn print_gamepad_diagnostics() {
    info!("=== Gamepad Diagnostics ===");
    info!("Platform: {}", std::env::consts::OS);

    let mut gilrs = match Gilrs::new() {
        Ok(g) => {
            info!("✅ gilrs initialized successfully");
            g
        },
        Err(e) => {
            info!("❌ Failed to initialize GilRs: {:?}", e);
            info!("This may indicate missing system libraries or permissions issues.");
            return;
        },
    };

    info!("⏳ Waiting for gamepads to connect (3 seconds)...");
    let start = std::time::Instant::now();
    while start.elapsed() < Duration::from_secs(3) {
        while let Some(Event { event, .. }) = gilrs.next_event() {
            if event == EventType::Connected {
                info!("   📶 Gamepad connection detected...");
            }
        }
        thread::sleep(Duration::from_millis(100));
    }

    let gamepads: Vec<_> = gilrs.gamepads().collect();
    if gamepads.is_empty() {
        info!("⚠️  No gamepads detected");
        info!("   Use --simulated to drive virtual controllers from the keyboard");
        return;
    }

    info!("✅ Found {} gamepad(s):", gamepads.len());
    for (id, gamepad) in gamepads {
        info!("📋 Gamepad ID: {:?}", id);
        info!("   Name: \"{}\"", gamepad.name());
        info!("   Connected: {}", gamepad.is_connected());
        info!("   Power Info: {:?}", gamepad.power_info());

        let pressed: Vec<String> = LISTED_BUTTONS
            .iter()
            .filter(|b| gamepad.is_pressed(**b))
            .map(|b| describe_button(*b))
            .collect();
        if pressed.is_empty() {
            info!("   (no buttons currently pressed)");
        } else {
            for line in pressed {
                info!("   🎮 {}", line);
            }
        }
    }

    info!("Button table:");
    for button in LISTED_BUTTONS {
        info!("   {}", describe_button(button));
    }
    info!("=== End Diagnostics ===");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_button() {
        assert_eq!(describe_button(Button::East), "East -> #1 A");
        assert_eq!(describe_button(Button::RightTrigger2), "RightTrigger2 -> #7 RIGHT TRIGGER");
        assert_eq!(describe_button(Button::LeftThumb), "LeftThumb -> #10 (unnamed)");
        assert_eq!(describe_button(Button::Mode), "Mode -> (not mapped)");
    }
}
