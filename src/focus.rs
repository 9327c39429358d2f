//! Per-player focus cursors
//!
//! Every connected player owns an independent cursor into the shared
//! [`ScreenGrid`]. Cursors are clamped whenever the grid changes, so they can
//! never index past a shrunk or missing group.

use crate::grid::{GroupRole, ScreenGrid, TargetHandle};
use std::collections::BTreeMap;
use tracing::debug;

pub use crate::input::NavDirection;

/// Outline colors by player index (wraps after eight players)
pub const PLAYER_PALETTE: [&str; 8] = [
    "#3498DB", "#FF5733", "#2ECC71", "#F1C40F", "#E67E22", "#1E9496", "#B83B58", "#9B59B6",
];

/// Focus indication drawn around a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outline {
    pub color: &'static str,
    pub width_px: u8,
    pub offset_px: u8,
}

impl Outline {
    pub fn for_player(player_index: usize) -> Self {
        Self {
            color: PLAYER_PALETTE[player_index % PLAYER_PALETTE.len()],
            width_px: 2,
            offset_px: 4,
        }
    }
}

/// Position in a grid: group (row), then target within the group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Cursor {
    pub group: usize,
    pub target: usize,
}

impl Cursor {
    pub const fn new(group: usize, target: usize) -> Self {
        Self { group, target }
    }
}

/// Result of applying a direction to a cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    Moved,
    Unchanged,
    /// Cursor sits on the edge of the game gallery; the gallery should page
    PageEdge { direction: NavDirection },
}

/// Pull a cursor back into the grid
///
/// An empty grid leaves the cursor untouched; nothing can be focused anyway.
pub fn clamp<H: TargetHandle>(cursor: Cursor, grid: &ScreenGrid<H>) -> Cursor {
    if grid.is_empty() {
        return cursor;
    }
    let group = cursor.group.min(grid.group_count() - 1);
    let target = cursor.target.min(grid.group_len(group).saturating_sub(1));
    Cursor { group, target }
}

#[derive(Debug)]
pub struct FocusEngine<H> {
    cursors: BTreeMap<usize, Cursor>,
    highlighted: Vec<H>,
    anchors: BTreeMap<usize, String>,
}

impl<H> Default for FocusEngine<H> {
    fn default() -> Self {
        Self {
            cursors: BTreeMap::new(),
            highlighted: Vec::new(),
            anchors: BTreeMap::new(),
        }
    }
}

impl<H: TargetHandle> FocusEngine<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self, player_index: usize) -> Option<Cursor> {
        self.cursors.get(&player_index).copied()
    }

    pub fn cursors(&self) -> &BTreeMap<usize, Cursor> {
        &self.cursors
    }

    /// Give a player a cursor if it has none; true when one was created
    pub fn ensure_player(&mut self, player_index: usize, default: Cursor, grid: Option<&ScreenGrid<H>>) -> bool {
        if self.cursors.contains_key(&player_index) {
            return false;
        }
        let cursor = grid.map_or(default, |g| clamp(default, g));
        self.cursors.insert(player_index, cursor);
        true
    }

    pub fn remove_player(&mut self, player_index: usize) {
        self.cursors.remove(&player_index);
        self.anchors.remove(&player_index);
    }

    pub fn set_cursor(&mut self, player_index: usize, cursor: Cursor) {
        self.cursors.insert(player_index, cursor);
    }

    /// Clear every outline drawn by the last render
    pub fn clear_visuals(&mut self) {
        for handle in self.highlighted.drain(..) {
            handle.set_focus_visual(None);
        }
    }

    /// Put every listed player back on its default cursor
    pub fn reset(
        &mut self,
        players: impl IntoIterator<Item = usize>,
        default: impl Fn(usize) -> Cursor,
        grid: Option<&ScreenGrid<H>>,
    ) {
        self.clear_visuals();
        self.anchors.clear();
        self.cursors.clear();
        for player_index in players {
            let cursor = default(player_index);
            let cursor = grid.map_or(cursor, |g| clamp(cursor, g));
            self.cursors.insert(player_index, cursor);
        }
    }

    pub fn clamp_all(&mut self, grid: &ScreenGrid<H>) {
        for cursor in self.cursors.values_mut() {
            *cursor = clamp(*cursor, grid);
        }
    }

    /// Apply a d-pad direction to one player's cursor
    ///
    /// With `paging` set, LEFT on the first game tile and RIGHT on the last one
    /// report [`FocusOutcome::PageEdge`] and leave the cursor where it is.
    pub fn move_cursor(
        &mut self,
        player_index: usize,
        direction: NavDirection,
        grid: Option<&ScreenGrid<H>>,
        paging: bool,
    ) -> FocusOutcome {
        let (Some(grid), Some(current)) = (grid, self.cursor(player_index)) else {
            return FocusOutcome::Unchanged;
        };
        if grid.is_empty() {
            return FocusOutcome::Unchanged;
        }
        let current = clamp(current, grid);
        let last_group = grid.group_count() - 1;
        let last_target = grid.group_len(current.group).saturating_sub(1);
        let on_gallery = paging && grid.role_of(current.group) == Some(GroupRole::GameTiles);

        let next = match direction {
            NavDirection::Up => {
                let group = current.group.saturating_sub(1);
                Cursor::new(group, current.target.min(grid.group_len(group).saturating_sub(1)))
            },
            NavDirection::Down => {
                let group = (current.group + 1).min(last_group);
                Cursor::new(group, current.target.min(grid.group_len(group).saturating_sub(1)))
            },
            NavDirection::Left => {
                if on_gallery && current.target == 0 {
                    self.cursors.insert(player_index, current);
                    return FocusOutcome::PageEdge { direction };
                }
                Cursor::new(current.group, current.target.saturating_sub(1))
            },
            NavDirection::Right => {
                if on_gallery && current.target == last_target {
                    self.cursors.insert(player_index, current);
                    return FocusOutcome::PageEdge { direction };
                }
                Cursor::new(current.group, (current.target + 1).min(last_target))
            },
        };

        self.cursors.insert(player_index, next);
        if next == current {
            FocusOutcome::Unchanged
        } else {
            debug!("Player {} focus {:?} -> {:?}", player_index + 1, current, next);
            FocusOutcome::Moved
        }
    }

    /// Remember which target a player should stay on across a re-render
    pub fn set_anchor(&mut self, player_index: usize, data_id: String) {
        self.anchors.insert(player_index, data_id);
    }

    pub fn has_anchors(&self) -> bool {
        !self.anchors.is_empty()
    }

    /// Move anchored players onto their target in the rebuilt grid
    ///
    /// A target that scrolled out of the grid falls back to clamping.
    pub fn resolve_anchors(&mut self, grid: &ScreenGrid<H>) {
        for (player_index, data_id) in std::mem::take(&mut self.anchors) {
            let Some(cursor) = self.cursors.get_mut(&player_index) else {
                continue;
            };
            *cursor = grid.find(&data_id).unwrap_or_else(|| clamp(*cursor, grid));
        }
        self.clamp_all(grid);
    }

    /// Redraw focus: clear old outlines, then outline each listed player's target
    pub fn render(&mut self, grid: Option<&ScreenGrid<H>>, players: &[usize]) {
        self.clear_visuals();
        let Some(grid) = grid else {
            return;
        };
        for player_index in players {
            let Some(cursor) = self.cursor(*player_index) else {
                continue;
            };
            if let Some(handle) = grid.target(cursor) {
                handle.set_focus_visual(Some(Outline::for_player(*player_index)));
                self.highlighted.push(handle.clone());
            }
        }
    }
}
