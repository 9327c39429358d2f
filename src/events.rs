//! Edge-triggered button events
//!
//! Snapshots are level-sampled; navigation wants "just pressed". Each tick the
//! extractor diffs every controller against its previous snapshot and reports
//! at most one logical button per player. A held button fires once.

use crate::input::{logical_name, ControllerSnapshot, LogicalButton};
use std::collections::BTreeMap;

/// playerIndex → button judged "just pressed" at the latest tick
pub type PressedButtons = BTreeMap<usize, LogicalButton>;

/// Logical button for the 0→1 transitions between two pressed masks
///
/// With several edges in one tick, the highest raw index with a logical name
/// wins. Unnamed indices never produce an event.
pub fn diff_buttons(previous: &[bool], current: &[bool]) -> Option<LogicalButton> {
    current
        .iter()
        .enumerate()
        .filter(|(raw, pressed)| **pressed && !previous.get(*raw).copied().unwrap_or(false))
        .filter_map(|(raw, _)| logical_name(raw))
        .last()
}

#[derive(Debug, Default)]
pub struct EdgeExtractor {
    previous: BTreeMap<usize, Vec<bool>>,
    pressed: PressedButtons,
}

impl EdgeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff this tick's snapshots and replace the pressed map
    ///
    /// A controller seen for the first time is diffed against all-released,
    /// so a button held while plugging in fires on the first tick.
    pub fn update(&mut self, snapshots: &[ControllerSnapshot]) -> &PressedButtons {
        self.pressed.clear();
        for snapshot in snapshots {
            let current = snapshot.pressed_mask();
            let previous = self.previous.get(&snapshot.index).map(Vec::as_slice).unwrap_or(&[]);
            if let Some(button) = diff_buttons(previous, &current) {
                self.pressed.insert(snapshot.index, button);
            }
            self.previous.insert(snapshot.index, current);
        }
        &self.pressed
    }

    pub fn pressed(&self) -> &PressedButtons {
        &self.pressed
    }

    pub fn pressed_for(&self, player_index: usize) -> Option<LogicalButton> {
        self.pressed.get(&player_index).copied()
    }

    /// Drop history for a removed controller
    pub fn forget(&mut self, index: usize) {
        self.previous.remove(&index);
        self.pressed.remove(&index);
    }
}
