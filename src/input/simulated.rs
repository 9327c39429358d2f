//! Keyboard-driven virtual controllers
//!
//! Development and test aid: key presses from the REPL (or tests) drive
//! virtual controller snapshots through the same [`InputSource`] seam as real
//! hardware.

use super::keymap::{KeyBinding, Keymap};
use super::snapshot::{ButtonState, ControllerSnapshot};
use super::{InputSource, SourceEvent};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Virtual controllers driven by key events
pub struct SimulatedSource {
    keymap: Keymap,
    controllers: BTreeMap<usize, ControllerSnapshot>,
    held: HashSet<String>,
    kill_latched: bool,
    events: Vec<SourceEvent>,
    enabled: bool,
}

impl SimulatedSource {
    pub fn new(keymap: Keymap) -> Self {
        Self {
            keymap,
            controllers: BTreeMap::new(),
            held: HashSet::new(),
            kill_latched: false,
            events: Vec::new(),
            enabled: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn the source on or off (config hot reload)
    ///
    /// Disabling unplugs every virtual controller, so their players go
    /// through the normal grace period.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        self.held.clear();
        self.kill_latched = false;
        if !enabled {
            let slots: Vec<usize> = self.controllers.keys().copied().collect();
            for slot in slots {
                self.detach(slot);
            }
        }
        info!("Simulated controllers {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Swap the key table (config hot reload); attached controllers stay
    pub fn set_keymap(&mut self, keymap: Keymap) {
        self.keymap = keymap;
        self.held.clear();
        self.kill_latched = false;
    }

    pub fn key_down(&mut self, key: &str) {
        if !self.enabled {
            debug!("Simulated controllers disabled, ignoring '{}'", key);
            return;
        }
        // Auto-repeat from a held key is not a new press
        if !self.held.insert(key.to_string()) {
            return;
        }

        if self.keymap.is_kill_switch_key(key) {
            let chord_held = self
                .keymap
                .kill_switch_keys()
                .iter()
                .all(|k| self.held.contains(k));
            if chord_held && !self.kill_latched {
                self.kill_latched = true;
                info!("Kill switch pressed");
                self.events.push(SourceEvent::KillSwitch);
            }
            return;
        }

        match self.keymap.lookup(key) {
            Some(KeyBinding::Button { slot, raw }) => self.set_button(slot, raw, ButtonState::PRESSED),
            Some(KeyBinding::Attach(slot)) => self.attach(slot),
            Some(KeyBinding::Detach(slot)) => self.detach(slot),
            None => debug!("Ignoring unmapped key '{}'", key),
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(key);

        if self.keymap.is_kill_switch_key(key) {
            self.kill_latched = false;
            return;
        }

        if let Some(KeyBinding::Button { slot, raw }) = self.keymap.lookup(key) {
            self.set_button(slot, raw, ButtonState::RELEASED);
        }
    }

    /// Plug in virtual controller `slot` (no-op when already attached)
    pub fn attach(&mut self, slot: usize) {
        if self.controllers.contains_key(&slot) {
            return;
        }
        let snapshot = ControllerSnapshot::idle(slot);
        self.controllers.insert(slot, snapshot.clone());
        info!("Virtual controller {} attached", slot);
        self.events.push(SourceEvent::Attached(snapshot));
    }

    /// Unplug virtual controller `slot` (no-op when not attached)
    pub fn detach(&mut self, slot: usize) {
        if self.controllers.remove(&slot).is_some() {
            info!("Virtual controller {} detached", slot);
            self.events.push(SourceEvent::Detached(slot));
        }
    }

    fn set_button(&mut self, slot: usize, raw: usize, state: ButtonState) {
        // Keys for an unplugged virtual controller do nothing
        if let Some(snapshot) = self.controllers.remove(&slot) {
            self.controllers.insert(slot, snapshot.with_button(raw, state));
        }
    }
}

impl InputSource for SimulatedSource {
    fn drain_events(&mut self) -> Vec<SourceEvent> {
        std::mem::take(&mut self.events)
    }

    fn sample(&mut self) -> Vec<ControllerSnapshot> {
        self.controllers.values().cloned().collect()
    }
}
