//! Player registry
//!
//! Maps controller slots to logical players. A slot becomes a player as soon
//! as it is seen, but only the connect button marks it connected. Disconnects
//! go through a grace period so short signal dropouts do not evict anyone.

use crate::input::ControllerSnapshot;
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// Default delay between a disconnect and the player's removal
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(1000);

/// One logical player, keyed by its controller slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    pub player_index: usize,
    pub is_connected: bool,
}

/// Result of [`PlayerRegistry::disconnect_gamepad`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// Removal will happen at `deadline` unless the slot comes back first
    Scheduled { deadline: Instant },
    /// A removal for this slot is already pending
    AlreadyPending,
    /// No player at this slot
    Unknown,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfirmError {
    #[error("Connect at least one controller before continuing")]
    NoConnectedPlayers,
}

#[derive(Debug)]
pub struct PlayerRegistry {
    players: Vec<Player>,
    controllers: BTreeMap<usize, ControllerSnapshot>,
    pending_removal: BTreeMap<usize, Instant>,
    /// Removed slots, ignored by reconciliation until attached again
    removed: BTreeSet<usize>,
    grace_period: Duration,
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE_PERIOD)
    }
}

impl PlayerRegistry {
    pub fn new(grace_period: Duration) -> Self {
        Self {
            players: Vec::new(),
            controllers: BTreeMap::new(),
            pending_removal: BTreeMap::new(),
            removed: BTreeSet::new(),
            grace_period,
        }
    }

    pub fn set_grace_period(&mut self, grace_period: Duration) {
        self.grace_period = grace_period;
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Players in the order their slots were first seen
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Option<&Player> {
        self.players.iter().find(|p| p.player_index == index)
    }

    pub fn controller(&self, index: usize) -> Option<&ControllerSnapshot> {
        self.controllers.get(&index)
    }

    pub fn is_pending_removal(&self, index: usize) -> bool {
        self.pending_removal.contains_key(&index)
    }

    /// A controller was plugged in (or came back)
    ///
    /// Returns true when this created a new player.
    pub fn attach(&mut self, snapshot: ControllerSnapshot) -> bool {
        let index = snapshot.index;
        self.removed.remove(&index);
        if self.cancel_removal(index) {
            info!("Player {} reconnected within grace period", index + 1);
        }
        self.controllers.insert(index, snapshot);
        self.ensure_player(index)
    }

    /// Reconcile against this tick's snapshots
    ///
    /// Known slots get their snapshot replaced, unseen slots become new
    /// unconnected players. A removed slot stays out until it is attached
    /// again. Returns the newly created player indices.
    pub fn on_snapshots_changed(&mut self, snapshots: &[ControllerSnapshot]) -> Vec<usize> {
        let mut created = Vec::new();
        for snapshot in snapshots {
            if !snapshot.connected || self.removed.contains(&snapshot.index) {
                continue;
            }
            self.controllers.insert(snapshot.index, snapshot.clone());
            if self.ensure_player(snapshot.index) {
                created.push(snapshot.index);
            }
        }
        created
    }

    fn ensure_player(&mut self, index: usize) -> bool {
        if self.player(index).is_some() {
            return false;
        }
        debug!("New controller at slot {}", index);
        self.players.push(Player {
            player_index: index,
            is_connected: false,
        });
        true
    }

    /// Flip a player to connected; true if it was not connected before
    pub fn mark_connected(&mut self, index: usize) -> bool {
        match self.players.iter_mut().find(|p| p.player_index == index) {
            Some(player) if !player.is_connected => {
                player.is_connected = true;
                info!("Player {} connected", index + 1);
                true
            },
            _ => false,
        }
    }

    /// Start the grace period for a slot
    pub fn disconnect_gamepad(&mut self, index: usize, now: Instant) -> DisconnectOutcome {
        if self.player(index).is_none() {
            return DisconnectOutcome::Unknown;
        }
        if self.pending_removal.contains_key(&index) {
            return DisconnectOutcome::AlreadyPending;
        }
        let deadline = now + self.grace_period;
        self.pending_removal.insert(index, deadline);
        debug!("Player {} pending removal", index + 1);
        DisconnectOutcome::Scheduled { deadline }
    }

    /// Drop a pending removal; true if one was pending
    pub fn cancel_removal(&mut self, index: usize) -> bool {
        self.pending_removal.remove(&index).is_some()
    }

    /// Remove every player whose grace period ended at or before `now`
    ///
    /// Each removal happens exactly once and clears the pending flag, so a
    /// later disconnect of the same slot schedules a fresh grace period.
    pub fn expire(&mut self, now: Instant) -> Vec<Player> {
        let due: Vec<usize> = self
            .pending_removal
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(index, _)| *index)
            .collect();

        let mut removed = Vec::new();
        for index in due {
            self.pending_removal.remove(&index);
            self.controllers.remove(&index);
            self.removed.insert(index);
            if let Some(position) = self.players.iter().position(|p| p.player_index == index) {
                let player = self.players.remove(position);
                info!("Player {} removed", index + 1);
                removed.push(player);
            }
        }
        removed
    }

    /// Earliest pending removal deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending_removal.values().min().copied()
    }

    /// The first connected player in registry order
    pub fn first_connected(&self) -> Option<usize> {
        self.players
            .iter()
            .find(|p| p.is_connected)
            .map(|p| p.player_index)
    }

    pub fn connected(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_connected)
    }

    pub fn connected_count(&self) -> usize {
        self.connected().count()
    }

    /// Players that never pressed the connect button
    pub fn unconfirmed(&self) -> Vec<usize> {
        self.players
            .iter()
            .filter(|p| !p.is_connected)
            .map(|p| p.player_index)
            .collect()
    }

    /// Validate a roster confirmation, returning the players to evict
    pub fn confirm(&self) -> Result<Vec<usize>, ConfirmError> {
        if self.connected_count() == 0 {
            return Err(ConfirmError::NoConnectedPlayers);
        }
        Ok(self.unconfirmed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn registry_with(indices: &[usize]) -> PlayerRegistry {
        let mut registry = PlayerRegistry::default();
        for index in indices {
            registry.attach(ControllerSnapshot::idle(*index));
        }
        registry
    }

    #[test]
    fn test_new_snapshot_creates_unconnected_player() {
        let mut registry = PlayerRegistry::default();
        let created = registry.on_snapshots_changed(&[ControllerSnapshot::idle(3)]);
        assert_eq!(created, vec![3]);
        assert_eq!(
            registry.players(),
            &[Player {
                player_index: 3,
                is_connected: false
            }]
        );
        assert!(registry.on_snapshots_changed(&[ControllerSnapshot::idle(3)]).is_empty());
    }

    #[test]
    fn test_disconnected_snapshot_creates_no_player() {
        let mut registry = PlayerRegistry::default();
        let mut unplugged = ControllerSnapshot::idle(2);
        unplugged.connected = false;

        let created = registry.on_snapshots_changed(&[unplugged, ControllerSnapshot::idle(5)]);
        assert_eq!(created, vec![5]);
        assert!(registry.player(2).is_none());
        assert!(registry.controller(2).is_none());
    }

    #[test]
    fn test_mark_connected_only_once() {
        let mut registry = registry_with(&[0]);
        assert!(registry.mark_connected(0));
        assert!(!registry.mark_connected(0));
        assert!(!registry.mark_connected(7));
        assert_eq!(registry.first_connected(), Some(0));
    }

    #[test]
    fn test_reconnect_within_grace_keeps_player() {
        let mut registry = registry_with(&[2]);
        registry.mark_connected(2);
        let start = Instant::now();

        assert!(matches!(
            registry.disconnect_gamepad(2, start),
            DisconnectOutcome::Scheduled { .. }
        ));
        assert!(registry.expire(start + Duration::from_millis(500)).is_empty());
        registry.attach(ControllerSnapshot::idle(2));

        assert!(!registry.is_pending_removal(2));
        assert!(registry.expire(start + Duration::from_millis(2000)).is_empty());
        assert_eq!(registry.player(2).map(|p| p.is_connected), Some(true));
    }

    #[test]
    fn test_grace_expiry_removes_exactly_once() {
        let mut registry = registry_with(&[2]);
        let start = Instant::now();
        registry.disconnect_gamepad(2, start);
        assert_eq!(registry.disconnect_gamepad(2, start), DisconnectOutcome::AlreadyPending);

        let removed = registry.expire(start + Duration::from_millis(1000));
        assert_eq!(removed.len(), 1);
        assert!(registry.player(2).is_none());
        assert!(registry.controller(2).is_none());
        assert!(registry.expire(start + Duration::from_millis(5000)).is_empty());
        assert_eq!(registry.disconnect_gamepad(2, start), DisconnectOutcome::Unknown);
    }

    #[test]
    fn test_pending_flag_cleared_after_expiry() {
        let mut registry = registry_with(&[1]);
        let start = Instant::now();
        registry.disconnect_gamepad(1, start);
        registry.expire(start + DEFAULT_GRACE_PERIOD);

        // Same slot comes back as a new player and can be scheduled again
        registry.attach(ControllerSnapshot::idle(1));
        assert!(matches!(
            registry.disconnect_gamepad(1, start),
            DisconnectOutcome::Scheduled { .. }
        ));
    }

    #[test]
    fn test_removed_slot_needs_fresh_attach() {
        let mut registry = registry_with(&[0]);
        let start = Instant::now();
        registry.disconnect_gamepad(0, start);
        registry.expire(start + DEFAULT_GRACE_PERIOD);

        // The source still reports the controller, but it was evicted
        assert!(registry.on_snapshots_changed(&[ControllerSnapshot::idle(0)]).is_empty());
        assert!(registry.player(0).is_none());

        assert!(registry.attach(ControllerSnapshot::idle(0)));
        assert!(registry.player(0).is_some());
    }

    #[test]
    fn test_next_deadline_is_earliest() {
        let mut registry = registry_with(&[0, 1]);
        let start = Instant::now();
        registry.disconnect_gamepad(1, start + Duration::from_millis(300));
        registry.disconnect_gamepad(0, start);
        assert_eq!(registry.next_deadline(), Some(start + DEFAULT_GRACE_PERIOD));
    }

    #[test]
    fn test_confirm_requires_connected_player() {
        let mut registry = registry_with(&[0, 1, 4]);
        assert_eq!(registry.confirm(), Err(ConfirmError::NoConnectedPlayers));
        registry.mark_connected(1);
        assert_eq!(registry.confirm(), Ok(vec![0, 4]));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Attach(usize),
        Connect(usize),
        Disconnect(usize),
        Advance(u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..5).prop_map(Op::Attach),
            (0usize..5).prop_map(Op::Connect),
            (0usize..5).prop_map(Op::Disconnect),
            (0u64..1500).prop_map(Op::Advance),
        ]
    }

    proptest! {
        #[test]
        fn prop_player_indices_stay_unique(ops in proptest::collection::vec(op(), 0..60)) {
            let mut registry = PlayerRegistry::default();
            let mut now = Instant::now();
            for op in ops {
                match op {
                    Op::Attach(i) => { registry.attach(ControllerSnapshot::idle(i)); },
                    Op::Connect(i) => { registry.mark_connected(i); },
                    Op::Disconnect(i) => { registry.disconnect_gamepad(i, now); },
                    Op::Advance(ms) => {
                        now += Duration::from_millis(ms);
                        registry.expire(now);
                    },
                }
                let mut seen: Vec<usize> = registry.players().iter().map(|p| p.player_index).collect();
                let total = seen.len();
                seen.sort_unstable();
                seen.dedup();
                prop_assert_eq!(seen.len(), total);
            }
        }
    }
}
