//! GilRs gamepad provider with hot-plug support
//!
//! gilrs is not `Send`, so it lives on a dedicated OS thread. That thread keeps
//! the latest [`ControllerSnapshot`] of every gamepad in a shared map and
//! reports attach/detach through a channel; the main loop reads both on each
//! sample tick via [`InputSource`].

use super::buttons::gilrs_button_to_raw_index;
use super::snapshot::{ButtonState, ControllerSnapshot};
use super::{InputSource, SourceEvent};
use anyhow::{Context, Result};
use gilrs::{Event, EventType, GamepadId, Gilrs};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

type SharedSnapshots = Arc<RwLock<BTreeMap<usize, ControllerSnapshot>>>;

/// Stable slot assignment for hot-plugged devices
///
/// A device keeps its slot until it is released; a new device takes the
/// lowest free slot at or above `base`.
#[derive(Debug)]
pub struct SlotTable<K> {
    base: usize,
    assigned: Vec<(K, usize)>,
}

impl<K: Copy + PartialEq> SlotTable<K> {
    pub fn new(base: usize) -> Self {
        Self {
            base,
            assigned: Vec::new(),
        }
    }

    /// Slot for `key`, assigning one if needed. Returns (slot, newly_assigned).
    pub fn assign(&mut self, key: K) -> (usize, bool) {
        if let Some(slot) = self.slot_of(key) {
            return (slot, false);
        }
        let slot = (self.base..)
            .find(|candidate| self.assigned.iter().all(|(_, s)| s != candidate))
            .unwrap_or(self.base);
        self.assigned.push((key, slot));
        (slot, true)
    }

    pub fn release(&mut self, key: K) -> Option<usize> {
        let position = self.assigned.iter().position(|(k, _)| *k == key)?;
        Some(self.assigned.remove(position).1)
    }

    pub fn slot_of(&self, key: K) -> Option<usize> {
        self.assigned.iter().find(|(k, _)| *k == key).map(|(_, s)| *s)
    }
}

/// Physical gamepads through gilrs
pub struct GilrsProvider {
    snapshots: SharedSnapshots,
    event_rx: mpsc::UnboundedReceiver<SourceEvent>,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl GilrsProvider {
    /// Start the provider thread
    ///
    /// Physical controllers get slots starting at `slot_base` so they never
    /// collide with virtual controller slots.
    pub fn start(slot_base: usize) -> Result<Self> {
        let snapshots: SharedSnapshots = Arc::new(RwLock::new(BTreeMap::new()));
        let (event_tx, event_rx) = mpsc::unbounded_channel::<SourceEvent>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

        let shared = snapshots.clone();
        std::thread::Builder::new()
            .name("gilrs-provider".to_string())
            .spawn(move || {
                Self::event_loop_blocking(slot_base, shared, event_tx, shutdown_rx);
            })
            .context("Failed to spawn gamepad provider thread")?;

        Ok(Self {
            snapshots,
            event_rx,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Main event loop (runs in dedicated blocking thread)
    fn event_loop_blocking(
        slot_base: usize,
        snapshots: SharedSnapshots,
        event_tx: mpsc::UnboundedSender<SourceEvent>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        // Initialize gilrs in this thread (not Send-safe)
        let mut gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("GilRs initialized");
                g
            },
            Err(e) => {
                warn!("Failed to initialize GilRs: {:?}", e);
                return;
            },
        };

        let mut slots = SlotTable::<GamepadId>::new(slot_base);

        // Gamepads present before startup never produce a Connected event
        let present: Vec<(GamepadId, String)> = gilrs
            .gamepads()
            .filter(|(_, gp)| gp.is_connected())
            .map(|(id, gp)| (id, gp.name().to_string()))
            .collect();
        if present.is_empty() {
            info!("No gamepads connected yet");
        }
        for (id, name) in present {
            if !Self::attach(&mut slots, &snapshots, &event_tx, id, &name) {
                return;
            }
        }

        loop {
            // Check for shutdown signal (non-blocking)
            match shutdown_rx.try_recv() {
                Ok(_) | Err(mpsc::error::TryRecvError::Disconnected) => {
                    info!("Gamepad provider shutting down");
                    break;
                },
                Err(mpsc::error::TryRecvError::Empty) => {},
            }

            while let Some(Event { id, event, .. }) = gilrs.next_event() {
                let delivered = match event {
                    EventType::Connected => {
                        let name = gilrs.gamepad(id).name().to_string();
                        Self::attach(&mut slots, &snapshots, &event_tx, id, &name)
                    },
                    EventType::Disconnected => match slots.release(id) {
                        Some(slot) => {
                            snapshots.write().remove(&slot);
                            info!("Gamepad {:?} detached from slot {}", id, slot);
                            event_tx.send(SourceEvent::Detached(slot)).is_ok()
                        },
                        None => true,
                    },
                    EventType::ButtonPressed(button, _) => {
                        Self::update_button(&slots, &snapshots, id, button, |_| ButtonState::PRESSED);
                        true
                    },
                    EventType::ButtonReleased(button, _) => {
                        Self::update_button(&slots, &snapshots, id, button, |_| ButtonState::RELEASED);
                        true
                    },
                    EventType::ButtonChanged(button, value, _) => {
                        Self::update_button(&slots, &snapshots, id, button, |previous| {
                            ButtonState::from_value(previous.pressed, value)
                        });
                        true
                    },
                    _ => true,
                };

                if !delivered {
                    warn!("Event receiver dropped, shutting down gamepad loop");
                    return;
                }
            }

            // Sleep briefly to avoid busy-waiting
            std::thread::sleep(Duration::from_millis(4));
        }
    }

    /// Register a gamepad; false when the receiving side is gone
    fn attach(
        slots: &mut SlotTable<GamepadId>,
        snapshots: &SharedSnapshots,
        event_tx: &mpsc::UnboundedSender<SourceEvent>,
        id: GamepadId,
        name: &str,
    ) -> bool {
        let (slot, fresh) = slots.assign(id);
        if !fresh {
            return true;
        }
        info!("Gamepad {:?} \"{}\" attached at slot {}", id, name, slot);
        let snapshot = ControllerSnapshot::idle(slot);
        snapshots.write().insert(slot, snapshot.clone());
        event_tx.send(SourceEvent::Attached(snapshot)).is_ok()
    }

    fn update_button(
        slots: &SlotTable<GamepadId>,
        snapshots: &SharedSnapshots,
        id: GamepadId,
        button: gilrs::Button,
        next: impl FnOnce(ButtonState) -> ButtonState,
    ) {
        let (Some(slot), Some(raw)) = (slots.slot_of(id), gilrs_button_to_raw_index(button)) else {
            return;
        };
        let mut map = snapshots.write();
        if let Some(snapshot) = map.get_mut(&slot) {
            if let Some(state) = snapshot.buttons.get_mut(raw) {
                *state = next(*state);
                debug!("Slot {} button {} -> {:?}", slot, raw, state);
            }
        }
    }

    /// Shutdown the provider
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
            info!("Gamepad provider shutdown requested");
        }
        Ok(())
    }
}

impl InputSource for GilrsProvider {
    fn drain_events(&mut self) -> Vec<SourceEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn sample(&mut self) -> Vec<ControllerSnapshot> {
        self.snapshots.read().values().cloned().collect()
    }
}

impl Drop for GilrsProvider {
    fn drop(&mut self) {
        // Attempt to send shutdown signal if not already sent
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
    }
}
