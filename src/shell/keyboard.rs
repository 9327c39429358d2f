//! On-screen keyboard layout

/// Key rows top to bottom; the last row holds the editing keys
pub const KEYBOARD_ROWS: [&[&str]; 5] = [
    &["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"],
    &["q", "w", "e", "r", "t", "y", "u", "i", "o", "p"],
    &["a", "s", "d", "f", "g", "h", "j", "k", "l"],
    &["z", "x", "c", "v", "b", "n", "m"],
    &["space", "delete", "clear"],
];

/// Key name carried by a `keyboard-key-<key>` data id
pub fn key_of(data_id: &str) -> Option<&str> {
    data_id
        .strip_prefix(crate::grid::ids::KEYBOARD_KEY_PREFIX)?
        .strip_prefix('-')
        .filter(|key| !key.is_empty())
}
