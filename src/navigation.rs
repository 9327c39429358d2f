//! Search, sort and filter state of the home screen

use crate::catalog::GameRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    #[default]
    None,
    Alphabetical,
    ReverseAlphabetical,
}

impl SortOption {
    /// none → alphabetical → reverse alphabetical → none
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::Alphabetical,
            Self::Alphabetical => Self::ReverseAlphabetical,
            Self::ReverseAlphabetical => Self::None,
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Alphabetical => "alphabetical",
            Self::ReverseAlphabetical => "reverse alphabetical",
        })
    }
}

/// One filter criterion; a new selection replaces the previous one
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameFilter {
    SinglePlayer,
    Multiplayer,
    Genre(String),
    /// Release year, matched against the third `/`-separated field of the release date
    Year(String),
}

impl GameFilter {
    pub fn matches(&self, game: &GameRecord) -> bool {
        match self {
            Self::SinglePlayer => !game.multiplayer,
            Self::Multiplayer => game.multiplayer,
            Self::Genre(genre) => game.genres.iter().any(|g| g.eq_ignore_ascii_case(genre)),
            Self::Year(year) => game.release_date.split('/').nth(2).is_some_and(|y| y.trim() == year),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::SinglePlayer => "Single Player",
            Self::Multiplayer => "Multiplayer",
            Self::Genre(label) | Self::Year(label) => label,
        }
    }
}

impl fmt::Display for GameFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    search_value: String,
    saved_search_value: String,
    sort_option: SortOption,
    /// Selection in the filter modal, applied on submit
    selected_filter: Option<GameFilter>,
    active_filter: Option<GameFilter>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_value(&self) -> &str {
        &self.search_value
    }

    pub fn saved_search_value(&self) -> &str {
        &self.saved_search_value
    }

    pub fn sort_option(&self) -> SortOption {
        self.sort_option
    }

    /// Apply one on-screen keyboard key
    ///
    /// `delete`, `space` and `clear` are editing keys; anything else is typed.
    pub fn update_search_value(&mut self, key: &str) {
        match key {
            "delete" => {
                self.search_value.pop();
            },
            "space" => {
                if !self.search_value.trim().is_empty() && !self.search_value.ends_with(' ') {
                    self.search_value.push(' ');
                }
            },
            "clear" => self.search_value.clear(),
            other => self.search_value.push_str(other),
        }
    }

    pub fn clear_search_value(&mut self) {
        self.search_value.clear();
    }

    pub fn save_search_value(&mut self) {
        self.saved_search_value = self.search_value.clone();
    }

    /// Search modal opened: resume editing the active search
    pub fn open_search(&mut self) {
        if !self.saved_search_value.is_empty() {
            self.search_value = self.saved_search_value.clone();
        }
    }

    /// Search modal closed without confirming: drop unsaved edits
    pub fn close_search(&mut self) {
        if self.search_value != self.saved_search_value {
            self.clear_search_value();
        }
    }

    /// Search modal confirmed
    pub fn confirm_search(&mut self) {
        self.save_search_value();
    }

    pub fn cycle_sort(&mut self) -> SortOption {
        self.sort_option = self.sort_option.next();
        self.sort_option
    }

    pub fn selected_filter(&self) -> Option<&GameFilter> {
        self.selected_filter.as_ref()
    }

    pub fn active_filter(&self) -> Option<&GameFilter> {
        self.active_filter.as_ref()
    }

    /// Filter modal opened: start from the applied filter
    pub fn open_filter(&mut self) {
        self.selected_filter = self.active_filter.clone();
    }

    pub fn select_filter(&mut self, filter: GameFilter) {
        self.selected_filter = Some(filter);
    }

    /// Filter modal closed without submitting: drop the selection
    pub fn close_filter(&mut self) {
        self.selected_filter = self.active_filter.clone();
    }

    pub fn clear_filter(&mut self) {
        self.selected_filter = None;
        self.active_filter = None;
    }

    /// Apply the selection; returns false when nothing is selected
    pub fn submit_filter(&mut self) -> bool {
        if self.selected_filter.is_none() {
            return false;
        }
        self.active_filter = self.selected_filter.clone();
        true
    }

    /// Games in display order
    ///
    /// The active filter applies first. An active search then keeps titles
    /// containing it (case-insensitive) and ignores the sort option. Sorting
    /// keeps placeholders at the end.
    pub fn arrange(&self, games: &[GameRecord]) -> Vec<GameRecord> {
        let filtered = games
            .iter()
            .filter(|g| self.active_filter.as_ref().map_or(true, |f| f.matches(g)));

        if !self.saved_search_value.is_empty() {
            let needle = self.saved_search_value.to_lowercase();
            return filtered
                .filter(|g| g.title.to_lowercase().contains(&needle))
                .cloned()
                .collect();
        }

        if self.sort_option == SortOption::None {
            return filtered.cloned().collect();
        }

        let (mut listed, placeholders): (Vec<GameRecord>, Vec<GameRecord>) =
            filtered.cloned().partition(|g| !g.is_placeholder());
        listed.sort_by_key(|g| g.title.to_lowercase());
        if self.sort_option == SortOption::ReverseAlphabetical {
            listed.reverse();
        }
        listed.extend(placeholders);
        listed
    }

    /// Gallery heading for the current search and filter
    pub fn heading(&self) -> String {
        match (self.saved_search_value.as_str(), &self.active_filter) {
            ("", None) => "Explore the Collection".to_string(),
            ("", Some(filter)) => format!("Filtered by: {}", filter),
            (search, None) => format!("Searching for: {}", search),
            (search, Some(filter)) => format!("Searching for: {} ({})", search, filter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(title: &str) -> GameRecord {
        serde_json::from_value(serde_json::json!({ "title": title })).unwrap()
    }

    fn detailed(title: &str, multiplayer: bool, genres: &[&str], release_date: &str) -> GameRecord {
        serde_json::from_value(serde_json::json!({
            "title": title,
            "multiplayer": multiplayer,
            "genres": genres,
            "release_date": release_date,
        }))
        .unwrap()
    }

    fn titles(games: &[GameRecord]) -> Vec<&str> {
        games.iter().map(|g| g.title.as_str()).collect()
    }

    #[test]
    fn test_sort_cycle_returns_to_start() {
        let mut state = NavigationState::new();
        assert_eq!(state.cycle_sort(), SortOption::Alphabetical);
        assert_eq!(state.cycle_sort(), SortOption::ReverseAlphabetical);
        assert_eq!(state.cycle_sort(), SortOption::None);
    }

    #[test]
    fn test_search_editing_keys() {
        let mut state = NavigationState::new();
        state.update_search_value("space");
        assert_eq!(state.search_value(), "");
        state.update_search_value("d");
        state.update_search_value("u");
        state.update_search_value("space");
        state.update_search_value("space");
        assert_eq!(state.search_value(), "du ");
        state.update_search_value("delete");
        assert_eq!(state.search_value(), "du");
        state.update_search_value("clear");
        assert_eq!(state.search_value(), "");
        state.update_search_value("delete");
        assert_eq!(state.search_value(), "");
    }

    #[test]
    fn test_close_discards_unsaved_search() {
        let mut state = NavigationState::new();
        state.update_search_value("q");
        state.confirm_search();
        state.open_search();
        state.update_search_value("x");
        state.close_search();
        assert_eq!(state.search_value(), "");
        assert_eq!(state.saved_search_value(), "q");

        state.open_search();
        assert_eq!(state.search_value(), "q");
        state.close_search();
        assert_eq!(state.search_value(), "q");
    }

    #[test]
    fn test_arrange_sorts_with_placeholders_last() {
        let games = vec![game("coming soon"), game("banana"), game("Apple"), game("cherry")];
        let mut state = NavigationState::new();
        assert_eq!(titles(&state.arrange(&games)), vec!["coming soon", "banana", "Apple", "cherry"]);

        state.cycle_sort();
        assert_eq!(titles(&state.arrange(&games)), vec!["Apple", "banana", "cherry", "coming soon"]);

        state.cycle_sort();
        assert_eq!(titles(&state.arrange(&games)), vec!["cherry", "banana", "Apple", "coming soon"]);
    }

    #[test]
    fn test_search_takes_precedence_over_sort() {
        let games = vec![game("Duck Hunt"), game("Goose"), game("Rubber Duck")];
        let mut state = NavigationState::new();
        state.cycle_sort();
        state.cycle_sort();
        for key in ["d", "u", "c", "k"] {
            state.update_search_value(key);
        }
        state.confirm_search();
        assert_eq!(titles(&state.arrange(&games)), vec!["Duck Hunt", "Rubber Duck"]);
        assert_eq!(state.heading(), "Searching for: duck");
    }

    #[test]
    fn test_filter_criteria() {
        let games = vec![
            detailed("Pond Racer", true, &["Platformer"], "03/14/2024"),
            detailed("Goose", false, &["strategy", "Survival"], "11/02/2023"),
            detailed("Duck Hunt", false, &["First Person Shooter"], "2024"),
        ];
        let run = |filter: GameFilter| {
            let mut state = NavigationState::new();
            state.select_filter(filter);
            assert!(state.submit_filter());
            titles(&state.arrange(&games)).join(",")
        };
        assert_eq!(run(GameFilter::Multiplayer), "Pond Racer");
        assert_eq!(run(GameFilter::SinglePlayer), "Goose,Duck Hunt");
        assert_eq!(run(GameFilter::Genre("Strategy".into())), "Goose");
        assert_eq!(run(GameFilter::Year("2024".into())), "Pond Racer");
    }

    #[test]
    fn test_filter_applies_on_submit_only() {
        let games = vec![
            detailed("Pond Racer", true, &[], ""),
            detailed("Goose", false, &[], ""),
        ];
        let mut state = NavigationState::new();
        assert!(!state.submit_filter());

        state.open_filter();
        state.select_filter(GameFilter::SinglePlayer);
        state.select_filter(GameFilter::Multiplayer);
        assert_eq!(state.arrange(&games).len(), 2);
        state.close_filter();
        assert_eq!(state.selected_filter(), None);

        state.open_filter();
        state.select_filter(GameFilter::Multiplayer);
        assert!(state.submit_filter());
        assert_eq!(titles(&state.arrange(&games)), vec!["Pond Racer"]);
        assert_eq!(state.heading(), "Filtered by: Multiplayer");

        state.open_filter();
        assert_eq!(state.selected_filter(), Some(&GameFilter::Multiplayer));
        state.clear_filter();
        assert_eq!(state.active_filter(), None);
        assert_eq!(state.arrange(&games).len(), 2);
    }

    #[test]
    fn test_search_within_filter() {
        let games = vec![
            detailed("Duck Hunt", false, &[], ""),
            detailed("Duck Race", true, &[], ""),
            detailed("Goose", true, &[], ""),
        ];
        let mut state = NavigationState::new();
        state.select_filter(GameFilter::Multiplayer);
        state.submit_filter();
        for key in ["d", "u", "c", "k"] {
            state.update_search_value(key);
        }
        state.confirm_search();
        assert_eq!(titles(&state.arrange(&games)), vec!["Duck Race"]);
        assert_eq!(state.heading(), "Searching for: duck (Multiplayer)");
    }
}
