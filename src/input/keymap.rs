//! Keyboard-as-controller key tables
//!
//! Each virtual player gets one key per raw button index. A separate pair of
//! key sets attaches and detaches whole virtual controllers, and the kill
//! switch terminates the process. Key names are matched case-sensitively
//! (`"C"` attaches, `"c"` does not).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// What a single key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyBinding {
    /// Drive raw button `raw` on virtual slot `slot`
    Button { slot: usize, raw: usize },
    /// Plug in virtual controller `slot`
    Attach(usize),
    /// Unplug virtual controller `slot`
    Detach(usize),
}

/// Serializable keymap layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeymapConfig {
    /// One key → raw button table per virtual slot (slot = list position)
    #[serde(default = "default_players")]
    pub players: Vec<BTreeMap<String, usize>>,

    /// Key → slot to attach
    #[serde(default = "default_attach")]
    pub attach: BTreeMap<String, usize>,

    /// Key → slot to detach
    #[serde(default = "default_detach")]
    pub detach: BTreeMap<String, usize>,

    /// Keys that all have to be held to trigger the kill switch
    #[serde(default = "default_kill_switch")]
    pub kill_switch: Vec<String>,
}

fn table(entries: &[(&str, usize)]) -> BTreeMap<String, usize> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn default_players() -> Vec<BTreeMap<String, usize>> {
    vec![
        table(&[
            ("k", 0),
            ("l", 1),
            ("j", 2),
            ("i", 3),
            ("u", 4),
            ("o", 5),
            ("9", 8),
            ("0", 9),
            ("ArrowUp", 12),
            ("ArrowDown", 13),
            ("ArrowLeft", 14),
            ("ArrowRight", 15),
        ]),
        table(&[
            ("g", 0),
            ("h", 1),
            ("f", 2),
            ("t", 3),
            ("r", 4),
            ("y", 5),
            ("4", 8),
            ("5", 9),
            ("w", 12),
            ("s", 13),
            ("a", 14),
            ("d", 15),
        ]),
    ]
}

fn default_attach() -> BTreeMap<String, usize> {
    table(&[("C", 0), ("D", 1)])
}

fn default_detach() -> BTreeMap<String, usize> {
    table(&[("N", 0), ("J", 1)])
}

fn default_kill_switch() -> Vec<String> {
    vec!["Escape".to_string()]
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            players: default_players(),
            attach: default_attach(),
            detach: default_detach(),
            kill_switch: default_kill_switch(),
        }
    }
}

impl KeymapConfig {
    /// Check for keys bound twice and slots without a player table
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen: HashMap<&str, &'static str> = HashMap::new();

        for (slot, buttons) in self.players.iter().enumerate() {
            for (key, raw) in buttons {
                if *raw >= super::snapshot::STANDARD_BUTTON_COUNT {
                    anyhow::bail!("Key '{}' on slot {} maps to invalid button index {}", key, slot, raw);
                }
                claim(&mut seen, key, "button")?;
            }
        }
        for (key, slot) in self.attach.iter().chain(self.detach.iter()) {
            if *slot >= self.players.len() {
                anyhow::bail!("Key '{}' refers to slot {} with no player table", key, slot);
            }
        }
        for key in self.attach.keys() {
            claim(&mut seen, key, "attach")?;
        }
        for key in self.detach.keys() {
            claim(&mut seen, key, "detach")?;
        }
        for key in &self.kill_switch {
            claim(&mut seen, key, "kill switch")?;
        }
        Ok(())
    }
}

/// Every key may carry exactly one role
fn claim<'a>(
    seen: &mut HashMap<&'a str, &'static str>,
    key: &'a str,
    what: &'static str,
) -> anyhow::Result<()> {
    if let Some(previous) = seen.insert(key, what) {
        anyhow::bail!("Key '{}' is bound as both {} and {}", key, previous, what);
    }
    Ok(())
}

/// Compiled key lookup
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<String, KeyBinding>,
    kill_switch: Vec<String>,
    slot_count: usize,
}

impl Keymap {
    pub fn from_config(config: &KeymapConfig) -> Self {
        let mut bindings = HashMap::new();
        for (slot, buttons) in config.players.iter().enumerate() {
            for (key, raw) in buttons {
                bindings.insert(key.clone(), KeyBinding::Button { slot, raw: *raw });
            }
        }
        for (key, slot) in &config.attach {
            bindings.insert(key.clone(), KeyBinding::Attach(*slot));
        }
        for (key, slot) in &config.detach {
            bindings.insert(key.clone(), KeyBinding::Detach(*slot));
        }

        Self {
            bindings,
            kill_switch: config.kill_switch.clone(),
            slot_count: config.players.len(),
        }
    }

    pub fn lookup(&self, key: &str) -> Option<KeyBinding> {
        self.bindings.get(key).copied()
    }

    pub fn kill_switch_keys(&self) -> &[String] {
        &self.kill_switch
    }

    pub fn is_kill_switch_key(&self, key: &str) -> bool {
        self.kill_switch.iter().any(|k| k == key)
    }

    /// Number of virtual controller slots
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_config(&KeymapConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_player_one() {
        let keymap = Keymap::default();
        assert_eq!(keymap.lookup("l"), Some(KeyBinding::Button { slot: 0, raw: 1 }));
        assert_eq!(keymap.lookup("ArrowLeft"), Some(KeyBinding::Button { slot: 0, raw: 14 }));
        assert_eq!(keymap.lookup("o"), Some(KeyBinding::Button { slot: 0, raw: 5 }));
    }

    #[test]
    fn test_default_layout_player_two() {
        let keymap = Keymap::default();
        assert_eq!(keymap.lookup("h"), Some(KeyBinding::Button { slot: 1, raw: 1 }));
        assert_eq!(keymap.lookup("w"), Some(KeyBinding::Button { slot: 1, raw: 12 }));
        assert_eq!(keymap.slot_count(), 2);
    }

    #[test]
    fn test_attach_detach_are_case_sensitive() {
        let keymap = Keymap::default();
        assert_eq!(keymap.lookup("C"), Some(KeyBinding::Attach(0)));
        assert_eq!(keymap.lookup("D"), Some(KeyBinding::Attach(1)));
        assert_eq!(keymap.lookup("N"), Some(KeyBinding::Detach(0)));
        assert_eq!(keymap.lookup("J"), Some(KeyBinding::Detach(1)));
        // lowercase "d" is player two's RIGHT, lowercase "c" is unbound
        assert_eq!(keymap.lookup("d"), Some(KeyBinding::Button { slot: 1, raw: 15 }));
        assert_eq!(keymap.lookup("c"), None);
    }

    #[test]
    fn test_kill_switch() {
        let keymap = Keymap::default();
        assert!(keymap.is_kill_switch_key("Escape"));
        assert_eq!(keymap.lookup("Escape"), None);
    }

    #[test]
    fn test_default_config_validates() {
        assert!(KeymapConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_key() {
        let mut config = KeymapConfig::default();
        config.attach.insert("k".to_string(), 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_slot() {
        let mut config = KeymapConfig::default();
        config.detach.insert("Q".to_string(), 5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_button_index() {
        let mut config = KeymapConfig::default();
        config.players[0].insert("z".to_string(), 16);
        assert!(config.validate().is_err());
    }
}
