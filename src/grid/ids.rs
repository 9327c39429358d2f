//! Data ids carried by focusable widgets
//!
//! Presentation code tags every focusable or clickable element with one of
//! these; navigation discovers targets by them and nothing else.

pub const PLAYER_TILE: &str = "player-tile-label";
pub const CONNECT_CONFIRM: &str = "controller-connect-modal-confirm-button";

pub const NAVIGATION_PREFIX: &str = "navigation";
pub const NAV_SEARCH_BAR: &str = "navigation-search-bar";
pub const NAV_SORT_BUTTON: &str = "navigation-sort-button";
pub const NAV_FILTER_BUTTON: &str = "navigation-filter-button";
pub const NAV_MENU_BUTTON: &str = "navigation-menu-button";

pub const GAME_CONTAINER: &str = "game-container";
pub const GAME_PREFIX: &str = "game";

pub const CAROUSEL_LEFT_CARET: &str = "carousel-left-caret";
pub const CAROUSEL_RIGHT_CARET: &str = "carousel-right-caret";

pub const SEARCH_CLOSE: &str = "search-modal-close-button";
pub const KEYBOARD_SEARCH_BAR: &str = "keyboard-search-bar";
pub const KEYBOARD_KEY_PREFIX: &str = "keyboard-key";
pub const KEYBOARD_ROW_COUNT: u8 = 5;
pub const SEARCH_CONFIRM: &str = "search-modal-confirm-button";

pub const GAME_INFO_CLOSE: &str = "game-info-close-button";
pub const TAB_PREFIX: &str = "tab";
pub const GAME_INFO_CONFIRM: &str = "game-info-confirm-button";
pub const LEADERBOARD_TOGGLE: &str = "leaderboard-toggle-ascending-checkbox";

pub const FILTER_BACK: &str = "filter-modal-back-button";
pub const FILTER_OPTION_PREFIX: &str = "filter-option";
pub const FILTER_CATEGORY_COUNT: u8 = 3;
pub const FILTER_CLEAR: &str = "filter-modal-clear-button";
pub const FILTER_SUBMIT: &str = "filter-modal-submit-button";

/// `keyboard-row-<n>`
pub fn keyboard_row(row: u8) -> String {
    format!("keyboard-row-{}", row)
}

/// `keyboard-key-<key>`
pub fn keyboard_key(key: &str) -> String {
    format!("{}-{}", KEYBOARD_KEY_PREFIX, key)
}

/// `game-<id>`
pub fn game_tile(game_id: &str) -> String {
    format!("{}-{}", GAME_PREFIX, game_id)
}

/// `tab-<name>`
pub fn tab(name: &str) -> String {
    format!("{}-{}", TAB_PREFIX, name)
}

/// `filter-category-<n>`
pub fn filter_category(category: u8) -> String {
    format!("filter-category-{}", category)
}

/// `filter-option-<slug>`, the label lowercased with spaces as dashes
pub fn filter_option(label: &str) -> String {
    format!("{}-{}", FILTER_OPTION_PREFIX, label.to_lowercase().replace(' ', "-"))
}
