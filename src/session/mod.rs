//! Navigation session - the context object owning all navigation state
//!
//! A [`Session`] is created once at startup around a [`TargetDiscovery`]
//! implementation and driven by the main loop:
//! - [`Session::handle_source_event`] for hot-plug and kill-switch events
//! - [`Session::tick`] once per sample with the merged snapshots
//! - [`Session::run_deferred`] one quantum later, after the presentation layer
//!   has re-rendered
//!
//! Nothing in here is shared across tasks; the loop owns the session.

mod tick;


use crate::config::PlayersConfig;
use crate::events::EdgeExtractor;
use crate::focus::{clamp, Cursor, FocusEngine};
use crate::grid::{ScreenGrid, ScreenId, TargetDiscovery};
use crate::input::{LogicalButton, SourceEvent};
use crate::navigation::NavigationState;
use crate::notify::Notifications;
use crate::page::{default_cursor, Deferred, PageController};
use crate::players::{ConfirmError, DisconnectOutcome, PlayerRegistry, DEFAULT_GRACE_PERIOD};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Session tunables (hot-reloadable)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub grace_period: Duration,
    pub connect_button: LogicalButton,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
            connect_button: LogicalButton::RightTrigger,
        }
    }
}

impl From<&PlayersConfig> for SessionSettings {
    fn from(config: &PlayersConfig) -> Self {
        Self {
            grace_period: config.grace_period(),
            connect_button: config.connect_button,
        }
    }
}

pub struct Session<D: TargetDiscovery> {
    discovery: D,
    registry: PlayerRegistry,
    extractor: EdgeExtractor,
    focus: FocusEngine<D::Handle>,
    page: PageController<D::Handle>,
    navigation: NavigationState,
    notifications: Notifications,
    connect_button: LogicalButton,
    /// Player count after the previous tick, to detect shrinking
    player_count: usize,
    /// Players created since the last grid refresh; their default cursor may
    /// point at a tile that is not rendered yet
    unplaced: BTreeSet<usize>,
    kill_requested: bool,
}

impl<D: TargetDiscovery> Session<D> {
    /// Start a session on the controller-connect screen
    pub fn new(discovery: D, settings: SessionSettings) -> Self {
        let mut page = PageController::new(ScreenId::ControllerConnect);
        page.reload(&discovery);
        Self {
            discovery,
            registry: PlayerRegistry::new(settings.grace_period),
            extractor: EdgeExtractor::new(),
            focus: FocusEngine::new(),
            page,
            navigation: NavigationState::new(),
            notifications: Notifications::new(),
            connect_button: settings.connect_button,
            player_count: 0,
            unplaced: BTreeSet::new(),
            kill_requested: false,
        }
    }

    /// Apply reloaded settings; cursors and players are kept
    pub fn apply_settings(&mut self, settings: SessionSettings) {
        self.registry.set_grace_period(settings.grace_period);
        self.connect_button = settings.connect_button;
    }

    pub fn discovery(&self) -> &D {
        &self.discovery
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn focus(&self) -> &FocusEngine<D::Handle> {
        &self.focus
    }

    pub fn cursor(&self, player_index: usize) -> Option<Cursor> {
        self.focus.cursor(player_index)
    }

    pub fn screen(&self) -> ScreenId {
        self.page.screen()
    }

    /// Screen the presentation layer should render right now
    ///
    /// Differs from [`Session::screen`] while a navigation is deferred.
    pub fn presented_screen(&self) -> ScreenId {
        self.page.pending_screen()
    }

    pub fn grid(&self) -> Option<&ScreenGrid<D::Handle>> {
        self.page.grid()
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn navigation_mut(&mut self) -> &mut NavigationState {
        &mut self.navigation
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn kill_requested(&self) -> bool {
        self.kill_requested
    }

    /// Earliest instant at which [`Session::tick`] has time-based work
    pub fn next_deadline(&self) -> Option<Instant> {
        self.registry.next_deadline()
    }

    /// Apply one hot-plug or operator event
    pub fn handle_source_event(&mut self, event: SourceEvent, now: Instant) {
        match event {
            SourceEvent::Attached(snapshot) => {
                let index = snapshot.index;
                if self.registry.attach(snapshot) {
                    self.ensure_focus(index);
                }
            },
            SourceEvent::Detached(index) => self.disconnect_gamepad(index, now),
            SourceEvent::KillSwitch => {
                info!("Kill switch pressed");
                self.kill_requested = true;
            },
        }
    }

    /// Start the grace period for a slot, warning the players once
    pub fn disconnect_gamepad(&mut self, index: usize, now: Instant) {
        match self.registry.disconnect_gamepad(index, now) {
            DisconnectOutcome::Scheduled { .. } => {
                self.notifications.warn(format!("Removing Player {}", index + 1), now);
            },
            DisconnectOutcome::AlreadyPending => debug!("Player {} already pending removal", index + 1),
            DisconnectOutcome::Unknown => debug!("Detach for unknown slot {}", index),
        }
    }

    /// Switch screens now: fresh grid, then every cursor back to its default
    pub fn update_page(&mut self, screen: ScreenId) {
        self.page.show(screen, &self.discovery);
        self.unplaced.clear();
        self.reset_focus();
        self.render_focus();
    }

    /// Re-query the current screen's grid after the next re-render
    ///
    /// Cursors are kept (clamped, or re-anchored after gallery paging).
    pub fn update_page_elements(&mut self) {
        self.page.defer(Deferred::RefreshElements);
    }

    /// Switch screens after the next re-render
    pub fn request_page(&mut self, screen: ScreenId) {
        debug!("Navigation to {} requested", screen);
        self.page.defer(Deferred::Navigate(screen));
    }

    pub fn has_deferred(&self) -> bool {
        self.page.has_deferred()
    }

    /// Run work deferred by the last tick or UI action
    pub fn run_deferred(&mut self) {
        for work in self.page.take_deferred() {
            match work {
                Deferred::RefreshElements => self.refresh_elements(),
                Deferred::Navigate(screen) => self.update_page(screen),
            }
        }
    }

    fn refresh_elements(&mut self) {
        self.page.reload(&self.discovery);
        if let Some(grid) = self.page.grid() {
            if self.focus.has_anchors() {
                self.focus.resolve_anchors(grid);
            } else {
                self.focus.clamp_all(grid);
            }
        }
        self.place_new_players();
        self.render_focus();
    }

    /// Confirm the roster on the controller-connect screen
    ///
    /// With nobody connected this only warns. Otherwise players that never
    /// pressed the connect button are scheduled for removal and the home
    /// screen is requested.
    pub fn confirm_players(&mut self, now: Instant) -> Result<(), ConfirmError> {
        let evicted = match self.registry.confirm() {
            Ok(evicted) => evicted,
            Err(e) => {
                self.notifications.warn(e.to_string(), now);
                return Err(e);
            },
        };
        for index in evicted {
            self.disconnect_gamepad(index, now);
        }
        info!("{} player(s) confirmed", self.registry.connected_count());
        self.request_page(ScreenId::Home);
        Ok(())
    }

    fn tile_position(&self, player_index: usize) -> usize {
        self.registry
            .players()
            .iter()
            .position(|p| p.player_index == player_index)
            .unwrap_or(0)
    }

    fn ensure_focus(&mut self, player_index: usize) {
        let default = default_cursor(self.page.screen(), self.tile_position(player_index));
        if self.focus.ensure_player(player_index, default, self.page.grid()) {
            self.unplaced.insert(player_index);
            // The new player's tile shows up after the re-render
            self.page.defer(Deferred::RefreshElements);
        }
    }

    /// Move players created since the last refresh onto their default cursor
    fn place_new_players(&mut self) {
        let Some(grid) = self.page.grid() else {
            return;
        };
        let screen = self.page.screen();
        for player_index in std::mem::take(&mut self.unplaced) {
            if self.focus.cursor(player_index).is_none() {
                continue;
            }
            let default = default_cursor(screen, self.tile_position(player_index));
            self.focus.set_cursor(player_index, clamp(default, grid));
        }
    }

    fn forget_player(&mut self, player_index: usize) {
        self.focus.remove_player(player_index);
        self.extractor.forget(player_index);
        self.unplaced.remove(&player_index);
    }

    fn reset_focus(&mut self) {
        let screen = self.page.screen();
        let players: Vec<usize> = self.registry.players().iter().map(|p| p.player_index).collect();
        let position = |index: usize| players.iter().position(|p| *p == index).unwrap_or(0);
        self.focus.reset(
            players.iter().copied(),
            |index| default_cursor(screen, position(index)),
            self.page.grid(),
        );
    }

    fn render_focus(&mut self) {
        let connected: Vec<usize> = self.registry.connected().map(|p| p.player_index).collect();
        self.focus.render(self.page.grid(), &connected);
    }

    /// One-line summary for logs and the REPL
    pub fn status_line(&self) -> String {
        let players: Vec<String> = self
            .registry
            .players()
            .iter()
            .map(|p| {
                let cursor = self
                    .focus
                    .cursor(p.player_index)
                    .map_or_else(|| "-".to_string(), |c| format!("({},{})", c.group, c.target));
                let state = if p.is_connected { "on" } else { "off" };
                format!("P{} {} {}", p.player_index + 1, state, cursor)
            })
            .collect();
        format!(
            "{} | grid {:?} | {}",
            self.page.screen(),
            self.page.grid().map(|g| g.shape()).unwrap_or_default(),
            if players.is_empty() { "no players".to_string() } else { players.join(", ") }
        )
    }
}
