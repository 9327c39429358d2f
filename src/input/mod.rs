//! Input source adapters
//!
//! Normalizes physical gamepads (gilrs) and keyboard-simulated controllers into
//! one [`ControllerSnapshot`] shape, sampled by the main loop at a fixed period.

pub mod buttons;
pub mod diagnostics;
pub mod keymap;
pub mod provider;
pub mod simulated;
pub mod snapshot;

pub use buttons::{logical_name, LogicalButton, NavDirection};
pub use diagnostics::print_gamepad_diagnostics;
pub use keymap::{KeyBinding, Keymap, KeymapConfig};
pub use provider::GilrsProvider;
pub use simulated::SimulatedSource;
pub use snapshot::{ButtonState, ControllerSnapshot, STANDARD_BUTTON_COUNT};

/// Hot-plug and operator events raised by a source between samples
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// A controller appeared at this slot
    Attached(ControllerSnapshot),
    /// The controller at this slot went away
    Detached(usize),
    /// Operator requested orderly termination
    KillSwitch,
}

/// One producer of controller snapshots
pub trait InputSource {
    /// Take attach/detach/kill events raised since the last call
    fn drain_events(&mut self) -> Vec<SourceEvent>;

    /// Current snapshot of every connected controller of this source
    fn sample(&mut self) -> Vec<ControllerSnapshot>;
}

/// Drain every source, then sample every source, in source order
pub fn poll_sources(sources: &mut [&mut dyn InputSource]) -> (Vec<SourceEvent>, Vec<ControllerSnapshot>) {
    let events = sources.iter_mut().flat_map(|s| s.drain_events()).collect();
    let snapshots = sources.iter_mut().flat_map(|s| s.sample()).collect();
    (events, snapshots)
}
