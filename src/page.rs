//! Active screen and its grid
//!
//! Grid rebuilds after a content change must wait one scheduling quantum: the
//! new widgets only exist once the presentation layer has re-rendered. Such
//! work is queued as [`Deferred`] and drained by the session's next
//! `run_deferred` call.

use crate::focus::Cursor;
use crate::grid::{get_grid, ScreenGrid, ScreenId, TargetDiscovery};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Work postponed until after the next re-render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Re-query the grid of the current screen, keeping cursors
    RefreshElements,
    /// Switch screens (grid rebuild and focus reset)
    Navigate(ScreenId),
}

/// Default cursor of a player on a freshly shown screen
///
/// `tile_position` is the player's position in registry order, which is also
/// the order of the player tiles on the connect screen (four per row).
pub fn default_cursor(screen: ScreenId, tile_position: usize) -> Cursor {
    match screen {
        ScreenId::ControllerConnect => Cursor::new(tile_position / 4, tile_position % 4),
        _ => Cursor::new(1, 0),
    }
}

#[derive(Debug)]
pub struct PageController<H> {
    screen: ScreenId,
    grid: Option<ScreenGrid<H>>,
    deferred: VecDeque<Deferred>,
}

impl<H: crate::grid::TargetHandle> PageController<H> {
    pub fn new(screen: ScreenId) -> Self {
        Self {
            screen,
            grid: None,
            deferred: VecDeque::new(),
        }
    }

    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    pub fn grid(&self) -> Option<&ScreenGrid<H>> {
        self.grid.as_ref()
    }

    /// Switch screens and load the new grid
    pub fn show<D>(&mut self, screen: ScreenId, discovery: &D)
    where
        D: TargetDiscovery<Handle = H>,
    {
        if screen != self.screen {
            info!("Page: {} -> {}", self.screen, screen);
        }
        self.screen = screen;
        self.reload(discovery);
    }

    /// Re-query the grid of the current screen
    pub fn reload<D>(&mut self, discovery: &D)
    where
        D: TargetDiscovery<Handle = H>,
    {
        let grid = get_grid(self.screen, discovery);
        debug!("Grid for {}: {:?}", self.screen, grid.shape());
        self.grid = Some(grid);
    }

    pub fn defer(&mut self, work: Deferred) {
        // Repeated refresh requests within one quantum collapse into one
        if work == Deferred::RefreshElements && self.deferred.contains(&work) {
            return;
        }
        self.deferred.push_back(work);
    }

    pub fn take_deferred(&mut self) -> Vec<Deferred> {
        self.deferred.drain(..).collect()
    }

    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Screen that will be active once deferred work has run
    pub fn pending_screen(&self) -> ScreenId {
        self.deferred
            .iter()
            .rev()
            .find_map(|work| match work {
                Deferred::Navigate(screen) => Some(*screen),
                Deferred::RefreshElements => None,
            })
            .unwrap_or(self.screen)
    }
}
