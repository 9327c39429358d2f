//! Per-sample pipeline
//!
//! Order per tick: snapshot refresh, player reconciliation and grace expiry,
//! edge extraction, connect button, focus moves and activation, reset on a
//! shrunk roster, then the focus render. Page decisions read the registry only
//! after reconciliation.

use super::Session;
use crate::events::PressedButtons;
use crate::focus::FocusOutcome;
use crate::grid::{ids, ScreenId, Selector, TargetDiscovery, TargetHandle};
use crate::input::{ControllerSnapshot, LogicalButton, NavDirection};
use crate::page::Deferred;
use std::time::Instant;
use tracing::{debug, info};

impl<D: TargetDiscovery> Session<D> {
    /// Process one sample of every controller
    ///
    /// Returns the edges seen for registered players this tick.
    pub fn tick(&mut self, snapshots: &[ControllerSnapshot], now: Instant) -> PressedButtons {
        for index in self.registry.on_snapshots_changed(snapshots) {
            self.ensure_focus(index);
        }

        for player in self.registry.expire(now) {
            self.forget_player(player.player_index);
        }

        let pressed: PressedButtons = self
            .extractor
            .update(snapshots)
            .iter()
            .filter(|(index, _)| self.registry.player(**index).is_some())
            .map(|(index, button)| (*index, *button))
            .collect();

        for (index, button) in &pressed {
            if *button == self.connect_button && self.registry.mark_connected(*index) {
                self.ensure_focus(*index);
                // Tile shows the connected state after the re-render
                self.page.defer(Deferred::RefreshElements);
            }
        }

        self.apply_focus_events(&pressed);

        let count = self.registry.players().len();
        if count < self.player_count {
            debug!("Roster shrank ({} -> {}), resetting focus", self.player_count, count);
            self.reset_focus();
        }
        self.player_count = count;

        if self.registry.connected_count() == 0 && self.presented_screen() != ScreenId::ControllerConnect {
            info!("No players left, returning to controller connect");
            self.request_page(ScreenId::ControllerConnect);
        }

        self.render_focus();
        pressed
    }

    /// Moves for every connected player, activation for the first one only
    fn apply_focus_events(&mut self, pressed: &PressedButtons) {
        let activator = self.registry.first_connected();
        let paging = self.page.screen() == ScreenId::Home;
        let connected: Vec<usize> = self.registry.connected().map(|p| p.player_index).collect();

        for index in connected {
            let Some(button) = pressed.get(&index).copied() else {
                continue;
            };
            if let Some(direction) = button.direction() {
                let outcome = self.focus.move_cursor(index, direction, self.page.grid(), paging);
                if let FocusOutcome::PageEdge { direction } = outcome {
                    self.page_gallery(index, direction);
                }
            } else if button == LogicalButton::A {
                if activator == Some(index) {
                    self.activate(index);
                } else {
                    debug!("Player {} cannot activate", index + 1);
                }
            }
        }
    }

    /// Click the target under a player's cursor
    fn activate(&mut self, player_index: usize) {
        let (Some(grid), Some(cursor)) = (self.page.grid(), self.focus.cursor(player_index)) else {
            return;
        };
        if let Some(target) = grid.target(cursor) {
            debug!("Player {} activates {}", player_index + 1, target.data_id());
            target.click();
        }
    }

    /// Slide the gallery one page and keep the player on the same game
    fn page_gallery(&mut self, player_index: usize, direction: NavDirection) {
        let caret_id = match direction {
            NavDirection::Left => ids::CAROUSEL_LEFT_CARET,
            NavDirection::Right => ids::CAROUSEL_RIGHT_CARET,
            NavDirection::Up | NavDirection::Down => return,
        };
        let Some(caret) = self.discovery.query_one(&Selector::exact(caret_id)) else {
            debug!("No {} rendered", caret_id);
            return;
        };
        if caret.is_disabled() {
            debug!("Gallery cannot page further ({})", caret_id);
            return;
        }

        let anchor = self
            .focus
            .cursor(player_index)
            .and_then(|cursor| self.page.grid()?.target(cursor))
            .map(|target| target.data_id());
        if let Some(data_id) = anchor {
            self.focus.set_anchor(player_index, data_id);
        }
        caret.click();
        self.page.defer(Deferred::RefreshElements);
    }
}
