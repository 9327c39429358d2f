//! Screen grid registry
//!
//! A [`ScreenGrid`] is the two-level layout of focusable targets on the active
//! screen: ordered groups (rows) of ordered target handles. Grids are
//! rebuilt from live discovery whenever the screen or its content changes, so
//! handles from an older grid must never be trusted.

pub mod ids;
mod layouts;

pub use layouts::get_grid;

use crate::focus::{Cursor, Outline};
use std::fmt;

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    ControllerConnect,
    Home,
    SearchModal,
    GameInfoModal,
    FilterModal,
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ControllerConnect => "controller connect",
            Self::Home => "home page",
            Self::SearchModal => "search modal",
            Self::GameInfoModal => "game info modal",
            Self::FilterModal => "filter modal",
        };
        f.write_str(name)
    }
}

/// What a grid group holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupRole {
    /// One chunk (up to four) of player tiles
    PlayerTiles,
    ConnectConfirm,
    Navigation,
    GameTiles,
    Close,
    SearchReadout,
    KeyboardRow(u8),
    Confirm,
    Tabs,
    LeaderboardToggle,
    /// Options of one filter category
    FilterOptions(u8),
    /// Clear and submit
    FilterActions,
}

/// How to find targets by data id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// data id equals
    Exact(String),
    /// data id starts with
    Prefix(String),
    /// direct children of the element `parent` whose data id starts with `child_prefix`
    ChildrenOf { parent: String, child_prefix: String },
}

impl Selector {
    pub fn exact(id: impl Into<String>) -> Self {
        Self::Exact(id.into())
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    pub fn children_of(parent: impl Into<String>, child_prefix: impl Into<String>) -> Self {
        Self::ChildrenOf {
            parent: parent.into(),
            child_prefix: child_prefix.into(),
        }
    }

    /// Whether a data id matches, ignoring the parent constraint
    pub fn matches_id(&self, data_id: &str) -> bool {
        match self {
            Self::Exact(id) => data_id == id,
            Self::Prefix(prefix) => data_id.starts_with(prefix.as_str()),
            Self::ChildrenOf { child_prefix, .. } => data_id.starts_with(child_prefix.as_str()),
        }
    }
}

/// An opaque reference to a rendered focusable element
pub trait TargetHandle: Clone + fmt::Debug {
    fn data_id(&self) -> String;

    /// Simulate a click on the element
    fn click(&self);

    /// Draw (`Some`) or clear (`None`) the focus outline
    fn set_focus_visual(&self, outline: Option<Outline>);

    fn is_disabled(&self) -> bool;
}

/// Live lookup of rendered targets, in display order
pub trait TargetDiscovery {
    type Handle: TargetHandle;

    fn query(&self, selector: &Selector) -> Vec<Self::Handle>;

    fn query_one(&self, selector: &Selector) -> Option<Self::Handle> {
        self.query(selector).into_iter().next()
    }
}

#[derive(Debug, Clone)]
pub struct GridGroup<H> {
    pub role: GroupRole,
    pub targets: Vec<H>,
}

/// Groups of targets, contiguous from 0, none of them empty
#[derive(Debug, Clone)]
pub struct ScreenGrid<H> {
    groups: Vec<GridGroup<H>>,
}

impl<H: TargetHandle> ScreenGrid<H> {
    /// Build a grid, dropping groups that rendered no targets
    pub fn from_groups(groups: impl IntoIterator<Item = (GroupRole, Vec<H>)>) -> Self {
        let groups = groups
            .into_iter()
            .filter(|(_, targets)| !targets.is_empty())
            .map(|(role, targets)| GridGroup { role, targets })
            .collect();
        Self { groups }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of targets in a group (0 when the group does not exist)
    pub fn group_len(&self, index: usize) -> usize {
        self.groups.get(index).map_or(0, |g| g.targets.len())
    }

    pub fn role_of(&self, index: usize) -> Option<GroupRole> {
        self.groups.get(index).map(|g| g.role)
    }

    pub fn target(&self, cursor: Cursor) -> Option<&H> {
        self.groups.get(cursor.group)?.targets.get(cursor.target)
    }

    /// First group with this role
    pub fn position_of(&self, role: GroupRole) -> Option<usize> {
        self.groups.iter().position(|g| g.role == role)
    }

    /// Locate a target by data id
    pub fn find(&self, data_id: &str) -> Option<Cursor> {
        self.groups.iter().enumerate().find_map(|(group, g)| {
            g.targets
                .iter()
                .position(|t| t.data_id() == data_id)
                .map(|target| Cursor { group, target })
        })
    }

    pub fn groups(&self) -> &[GridGroup<H>] {
        &self.groups
    }

    pub fn targets(&self) -> impl Iterator<Item = &H> {
        self.groups.iter().flat_map(|g| g.targets.iter())
    }

    /// Group lengths in order, for logs and status output
    pub fn shape(&self) -> Vec<usize> {
        self.groups.iter().map(|g| g.targets.len()).collect()
    }
}
