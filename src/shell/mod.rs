//! Headless launcher shell
//!
//! Renders each screen as a [`WidgetTree`] carrying the navigation data ids
//! and turns clicks on those widgets into session and navigation actions.
//! Backend work (launching, leaderboards) is returned as [`ShellCommand`]s for
//! the caller to run asynchronously.

pub mod carousel;
pub mod filters;
pub mod keyboard;
pub mod widgets;

pub use carousel::Carousel;
pub use widgets::{Widget, WidgetHandle, WidgetTree};

use crate::catalog::{GameRecord, Leaderboard};
use crate::focus::PLAYER_PALETTE;
use crate::grid::{ids, ScreenId};
use crate::notify::NoticeLevel;
use crate::session::Session;
use colored::Colorize;
use std::fmt::Write as _;
use std::time::Instant;
use tracing::{debug, info};

/// Backend work requested by a click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    LaunchGame(String),
    LoadLeaderboard(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InfoTab {
    #[default]
    About,
    Leaderboard,
}

impl InfoTab {
    const ABOUT: &'static str = "about";
    const LEADERBOARD: &'static str = "leaderboard";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            Self::ABOUT => Some(Self::About),
            Self::LEADERBOARD => Some(Self::Leaderboard),
            _ => None,
        }
    }
}

pub struct Shell {
    tree: WidgetTree,
    games: Vec<GameRecord>,
    carousel: Carousel,
    selected: Option<GameRecord>,
    tab: InfoTab,
    /// Leaderboard of the game with this title
    leaderboard: Option<(String, Leaderboard)>,
    ascending: bool,
    rendered: Option<Vec<Widget>>,
}

impl Shell {
    pub fn new(tree: WidgetTree) -> Self {
        Self {
            tree,
            games: Vec::new(),
            carousel: Carousel::default(),
            selected: None,
            tab: InfoTab::About,
            leaderboard: None,
            ascending: false,
            rendered: None,
        }
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn set_games(&mut self, games: Vec<GameRecord>) {
        info!("Catalog loaded: {} game(s)", games.len());
        self.games = games;
    }

    pub fn set_leaderboard(&mut self, game_title: String, leaderboard: Leaderboard) {
        self.leaderboard = Some((game_title, leaderboard));
    }

    pub fn selected_game(&self) -> Option<&GameRecord> {
        self.selected.as_ref()
    }

    /// Re-render when anything visible changed
    ///
    /// A re-render invalidates every handle, so the session is asked to
    /// re-query its grid afterwards. Returns true when the tree was replaced.
    pub fn render<D>(&mut self, session: &mut Session<D>) -> bool
    where
        D: crate::grid::TargetDiscovery,
    {
        let len = session.navigation().arrange(&self.games).len();
        self.carousel.clamp(len);

        let widgets = self.build(session);
        if self.rendered.as_ref() == Some(&widgets) {
            return false;
        }
        self.tree.replace(widgets.clone());
        self.rendered = Some(widgets);
        session.update_page_elements();
        true
    }

    fn build<D: crate::grid::TargetDiscovery>(&self, session: &Session<D>) -> Vec<Widget> {
        let screen = session.presented_screen();
        if screen == ScreenId::ControllerConnect {
            return self.connect_widgets(session);
        }

        let mut widgets = self.home_widgets(session);
        match screen {
            ScreenId::SearchModal => widgets.extend(self.search_widgets(session)),
            ScreenId::GameInfoModal => widgets.extend(self.game_info_widgets()),
            ScreenId::FilterModal => widgets.extend(self.filter_widgets(session)),
            ScreenId::Home | ScreenId::ControllerConnect => {},
        }
        widgets
    }

    fn connect_widgets<D: crate::grid::TargetDiscovery>(&self, session: &Session<D>) -> Vec<Widget> {
        let mut widgets: Vec<Widget> = session
            .registry()
            .players()
            .iter()
            .map(|p| {
                let state = if p.is_connected { "connected" } else { "press the right trigger" };
                Widget::new(ids::PLAYER_TILE, format!("Player {} ({})", p.player_index + 1, state))
            })
            .collect();
        widgets.push(Widget::new(ids::CONNECT_CONFIRM, "Done"));
        widgets
    }

    fn home_widgets<D: crate::grid::TargetDiscovery>(&self, session: &Session<D>) -> Vec<Widget> {
        let navigation = session.navigation();
        let search_label = match navigation.saved_search_value() {
            "" => "Search",
            saved => saved,
        };
        let filter_label = match navigation.active_filter() {
            Some(filter) => format!("Filter: {}", filter),
            None => "Filter".to_string(),
        };
        let mut widgets = vec![
            Widget::new(ids::NAV_SEARCH_BAR, search_label),
            Widget::new(ids::NAV_SORT_BUTTON, format!("Sort: {}", navigation.sort_option())),
            Widget::new(ids::NAV_FILTER_BUTTON, filter_label),
            Widget::new(ids::NAV_MENU_BUTTON, "Menu").disabled(true),
            Widget::new(ids::GAME_CONTAINER, navigation.heading()),
        ];

        let games = navigation.arrange(&self.games);
        let window = self.carousel.window(games.len());
        widgets.extend(
            games[window]
                .iter()
                .map(|g| Widget::new(ids::game_tile(&g.id), g.title.as_str()).child_of(ids::GAME_CONTAINER)),
        );
        widgets.push(Widget::new(ids::CAROUSEL_LEFT_CARET, "<").disabled(!self.carousel.can_step_left()));
        widgets.push(
            Widget::new(ids::CAROUSEL_RIGHT_CARET, ">").disabled(!self.carousel.can_step_right(games.len())),
        );
        widgets
    }

    fn search_widgets<D: crate::grid::TargetDiscovery>(&self, session: &Session<D>) -> Vec<Widget> {
        let mut widgets = vec![
            Widget::new(ids::SEARCH_CLOSE, "X"),
            Widget::new(ids::KEYBOARD_SEARCH_BAR, session.navigation().search_value()),
        ];
        for (row, keys) in keyboard::KEYBOARD_ROWS.iter().enumerate() {
            let row_id = ids::keyboard_row(row as u8);
            widgets.push(Widget::new(row_id.as_str(), ""));
            widgets.extend(
                keys.iter()
                    .map(|key| Widget::new(ids::keyboard_key(key), *key).child_of(row_id.as_str())),
            );
        }
        widgets.push(Widget::new(ids::SEARCH_CONFIRM, "Search"));
        widgets
    }

    fn filter_widgets<D: crate::grid::TargetDiscovery>(&self, session: &Session<D>) -> Vec<Widget> {
        let selected = session.navigation().selected_filter();
        let mut widgets = vec![Widget::new(ids::FILTER_BACK, "Back")];
        for (category, (title, options)) in filters::categories().into_iter().enumerate() {
            let category_id = ids::filter_category(category as u8);
            widgets.push(Widget::new(category_id.as_str(), title));
            widgets.extend(options.iter().map(|option| {
                let label = if selected == Some(option) {
                    format!("{} (selected)", option)
                } else {
                    option.to_string()
                };
                Widget::new(ids::filter_option(option.label()), label).child_of(category_id.as_str())
            }));
        }
        widgets.push(Widget::new(ids::FILTER_CLEAR, "Clear Filters"));
        widgets.push(Widget::new(ids::FILTER_SUBMIT, "Submit"));
        widgets
    }

    fn game_info_widgets(&self) -> Vec<Widget> {
        let Some(game) = &self.selected else {
            return vec![Widget::new(ids::GAME_INFO_CLOSE, "X")];
        };

        let players = if game.multiplayer { "multiplayer" } else { "single player" };
        let mut widgets = vec![
            Widget::new(ids::GAME_INFO_CLOSE, "X"),
            Widget::new(
                "game-info-details",
                format!("{} by {} ({}) [{}]", game.title, game.author, game.release_date, players),
            ),
            Widget::new(ids::tab(InfoTab::ABOUT), "About"),
            Widget::new(ids::tab(InfoTab::LEADERBOARD), "Leaderboard"),
        ];

        match self.tab {
            InfoTab::About => widgets.push(Widget::new("game-info-summary", game.summary.as_str())),
            InfoTab::Leaderboard => widgets.extend(self.leaderboard_widgets(&game.title)),
        }

        widgets.push(Widget::new(ids::GAME_INFO_CONFIRM, "Play").disabled(game.is_placeholder()));
        if self.tab == InfoTab::Leaderboard {
            let label = if self.ascending { "Ascending: on" } else { "Ascending: off" };
            widgets.push(Widget::new(ids::LEADERBOARD_TOGGLE, label));
        }
        widgets
    }

    fn leaderboard_widgets(&self, title: &str) -> Vec<Widget> {
        let Some((_, board)) = self.leaderboard.as_ref().filter(|(t, _)| t == title) else {
            return vec![Widget::new("leaderboard-empty", "No scores yet")];
        };
        let mut widgets = Vec::new();
        for (metric, entries) in board {
            let mut entries = entries.clone();
            entries.sort_by(|a, b| a.value.total_cmp(&b.value));
            if !self.ascending {
                entries.reverse();
            }
            widgets.push(Widget::new(format!("leaderboard-{}", metric), metric.as_str()));
            widgets.extend(entries.iter().enumerate().map(|(rank, e)| {
                Widget::new(
                    format!("leaderboard-{}-{}", metric, rank + 1),
                    format!("{}. {} {}", rank + 1, e.username, e.value),
                )
            }));
        }
        widgets
    }

    /// Apply clicks recorded since the last call
    pub fn process_clicks<D>(&mut self, session: &mut Session<D>, now: Instant) -> Vec<ShellCommand>
    where
        D: crate::grid::TargetDiscovery,
    {
        let mut commands = Vec::new();
        for data_id in self.tree.drain_clicks() {
            debug!("Click: {}", data_id);
            match data_id.as_str() {
                ids::CONNECT_CONFIRM => {
                    // A rejection has already been shown to the players
                    let _ = session.confirm_players(now);
                },
                ids::NAV_SEARCH_BAR => {
                    session.navigation_mut().open_search();
                    session.request_page(ScreenId::SearchModal);
                },
                ids::NAV_SORT_BUTTON => {
                    let sort = session.navigation_mut().cycle_sort();
                    info!("Sorting: {}", sort);
                    self.carousel.rewind();
                },
                ids::NAV_FILTER_BUTTON => {
                    session.navigation_mut().open_filter();
                    session.request_page(ScreenId::FilterModal);
                },
                ids::CAROUSEL_LEFT_CARET => {
                    self.carousel.step_left();
                },
                ids::CAROUSEL_RIGHT_CARET => {
                    let len = session.navigation().arrange(&self.games).len();
                    self.carousel.step_right(len);
                },
                ids::SEARCH_CLOSE => {
                    session.navigation_mut().close_search();
                    session.request_page(ScreenId::Home);
                },
                ids::SEARCH_CONFIRM => {
                    session.navigation_mut().confirm_search();
                    self.carousel.rewind();
                    session.request_page(ScreenId::Home);
                },
                ids::KEYBOARD_SEARCH_BAR => {},
                ids::FILTER_BACK => {
                    session.navigation_mut().close_filter();
                    session.request_page(ScreenId::Home);
                },
                ids::FILTER_CLEAR => {
                    session.navigation_mut().clear_filter();
                    self.carousel.rewind();
                    session.request_page(ScreenId::Home);
                },
                ids::FILTER_SUBMIT => {
                    if session.navigation_mut().submit_filter() {
                        info!("Filtering: {}", session.navigation().heading());
                        self.carousel.rewind();
                    }
                    session.request_page(ScreenId::Home);
                },
                ids::GAME_INFO_CLOSE => {
                    self.selected = None;
                    session.request_page(ScreenId::Home);
                },
                ids::GAME_INFO_CONFIRM => {
                    if let Some(game) = self.selected.take() {
                        commands.push(ShellCommand::LaunchGame(game.id));
                    }
                    session.request_page(ScreenId::Home);
                },
                ids::LEADERBOARD_TOGGLE => self.ascending = !self.ascending,
                other => {
                    if let Some(command) = self.handle_dynamic_click(other, session) {
                        commands.push(command);
                    }
                },
            }
        }
        commands
    }

    /// Clicks on widgets whose data id carries a parameter
    fn handle_dynamic_click<D>(&mut self, data_id: &str, session: &mut Session<D>) -> Option<ShellCommand>
    where
        D: crate::grid::TargetDiscovery,
    {
        if let Some(key) = keyboard::key_of(data_id) {
            session.navigation_mut().update_search_value(key);
            return None;
        }
        if let Some(filter) = filters::option_of(data_id) {
            session.navigation_mut().select_filter(filter);
            return None;
        }
        if let Some(tab) = data_id
            .strip_prefix(ids::TAB_PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(InfoTab::from_name)
        {
            self.tab = tab;
            return None;
        }
        if let Some(game_id) = data_id
            .strip_prefix(ids::GAME_PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
        {
            let game = self.games.iter().find(|g| g.id == game_id)?.clone();
            info!("Showing {}", game.title);
            let title = game.title.clone();
            self.selected = Some(game);
            self.tab = InfoTab::About;
            session.request_page(ScreenId::GameInfoModal);
            return Some(ShellCommand::LoadLeaderboard(title));
        }
        debug!("No action for {}", data_id);
        None
    }

    /// Text rendering of the current tree with player outlines and toasts
    pub fn describe<D: crate::grid::TargetDiscovery>(&self, session: &Session<D>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", format!("== {} ==", session.screen()).bold().cyan());
        let _ = writeln!(out, "{}", session.status_line().dimmed());

        for (widget, outline) in self.tree.outlined() {
            let indent = if widget.parent.is_some() { "    " } else { "  " };
            let mut line = format!("{}{} [{}]", indent, widget.label, widget.data_id);
            if widget.disabled {
                line = line.dimmed().to_string();
            }
            if let Some(outline) = outline {
                let player = PLAYER_PALETTE.iter().position(|c| *c == outline.color).unwrap_or(0);
                let (r, g, b) = hex_rgb(outline.color).unwrap_or((255, 255, 255));
                let _ = write!(line, " {}", format!("<P{}>", player + 1).truecolor(r, g, b).bold());
            }
            let _ = writeln!(out, "{}", line);
        }

        for notice in session.notifications().active() {
            let text = match notice.level {
                NoticeLevel::Warning => format!("! {}", notice.message).yellow(),
                NoticeLevel::Info => format!("i {}", notice.message).blue(),
            };
            let _ = writeln!(out, "{}", text);
        }
        out
    }
}

fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
