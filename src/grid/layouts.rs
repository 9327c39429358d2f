use super::ids;
use super::{GroupRole, ScreenGrid, ScreenId, Selector, TargetDiscovery};

/// Player tiles per controller-connect row
const PLAYER_TILES_PER_ROW: usize = 4;

/// Query the live target layout of a screen
pub fn get_grid<D: TargetDiscovery>(screen: ScreenId, discovery: &D) -> ScreenGrid<D::Handle> {
    let exact = |id: &str| discovery.query(&Selector::exact(id));

    let groups = match screen {
        ScreenId::ControllerConnect => {
            let tiles = exact(ids::PLAYER_TILE);
            let mut groups: Vec<_> = tiles
                .chunks(PLAYER_TILES_PER_ROW)
                .map(|chunk| (GroupRole::PlayerTiles, chunk.to_vec()))
                .collect();
            groups.push((GroupRole::ConnectConfirm, exact(ids::CONNECT_CONFIRM)));
            groups
        },
        ScreenId::Home => vec![
            (
                GroupRole::Navigation,
                discovery.query(&Selector::prefix(ids::NAVIGATION_PREFIX)),
            ),
            (
                GroupRole::GameTiles,
                discovery.query(&Selector::children_of(ids::GAME_CONTAINER, ids::GAME_PREFIX)),
            ),
        ],
        ScreenId::SearchModal => {
            let mut groups = vec![
                (GroupRole::Close, exact(ids::SEARCH_CLOSE)),
                (GroupRole::SearchReadout, exact(ids::KEYBOARD_SEARCH_BAR)),
            ];
            for row in 0..ids::KEYBOARD_ROW_COUNT {
                let keys = discovery.query(&Selector::children_of(ids::keyboard_row(row), ids::KEYBOARD_KEY_PREFIX));
                groups.push((GroupRole::KeyboardRow(row), keys));
            }
            groups.push((GroupRole::Confirm, exact(ids::SEARCH_CONFIRM)));
            groups
        },
        ScreenId::GameInfoModal => vec![
            (GroupRole::Close, exact(ids::GAME_INFO_CLOSE)),
            (GroupRole::Tabs, discovery.query(&Selector::prefix(ids::TAB_PREFIX))),
            (GroupRole::Confirm, exact(ids::GAME_INFO_CONFIRM)),
            (GroupRole::LeaderboardToggle, exact(ids::LEADERBOARD_TOGGLE)),
        ],
        ScreenId::FilterModal => {
            let mut groups = vec![(GroupRole::Close, exact(ids::FILTER_BACK))];
            for category in 0..ids::FILTER_CATEGORY_COUNT {
                let options =
                    discovery.query(&Selector::children_of(ids::filter_category(category), ids::FILTER_OPTION_PREFIX));
                groups.push((GroupRole::FilterOptions(category), options));
            }
            let mut actions = exact(ids::FILTER_CLEAR);
            actions.extend(exact(ids::FILTER_SUBMIT));
            groups.push((GroupRole::FilterActions, actions));
            groups
        },
    };

    ScreenGrid::from_groups(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::testing::FakeTarget;

    /// Flat list of (parent, data id) pairs
    struct FakePage(Vec<(Option<&'static str>, String)>);

    impl FakePage {
        fn with(entries: &[(Option<&'static str>, &str)]) -> Self {
            Self(entries.iter().map(|(p, id)| (*p, id.to_string())).collect())
        }
    }

    impl TargetDiscovery for FakePage {
        type Handle = FakeTarget;

        fn query(&self, selector: &Selector) -> Vec<FakeTarget> {
            self.0
                .iter()
                .filter(|(parent, id)| match selector {
                    Selector::ChildrenOf { parent: wanted, .. } => {
                        parent.is_some_and(|p| p == wanted.as_str()) && selector.matches_id(id)
                    },
                    _ => selector.matches_id(id),
                })
                .map(|(_, id)| FakeTarget::new(id))
                .collect()
        }
    }

    #[test]
    fn test_connect_screen_chunks_tiles_by_four() {
        let mut entries = vec![(None, ids::PLAYER_TILE); 6];
        entries.push((None, ids::CONNECT_CONFIRM));
        let grid = get_grid(ScreenId::ControllerConnect, &FakePage::with(&entries));
        assert_eq!(grid.shape(), vec![4, 2, 1]);
        assert_eq!(grid.role_of(2), Some(GroupRole::ConnectConfirm));
    }

    #[test]
    fn test_connect_screen_without_players() {
        let page = FakePage::with(&[(None, ids::CONNECT_CONFIRM)]);
        let grid = get_grid(ScreenId::ControllerConnect, &page);
        assert_eq!(grid.shape(), vec![1]);
    }

    #[test]
    fn test_home_grid_only_takes_gallery_children() {
        let page = FakePage::with(&[
            (None, ids::NAV_SEARCH_BAR),
            (None, ids::NAV_SORT_BUTTON),
            (None, ids::GAME_CONTAINER),
            (Some(ids::GAME_CONTAINER), "game-1"),
            (Some(ids::GAME_CONTAINER), "game-2"),
            (None, "game-stray"),
        ]);
        let grid = get_grid(ScreenId::Home, &page);
        assert_eq!(grid.shape(), vec![2, 2]);
        assert_eq!(grid.role_of(1), Some(GroupRole::GameTiles));
    }

    #[test]
    fn test_game_info_without_leaderboard_toggle() {
        let page = FakePage::with(&[
            (None, ids::GAME_INFO_CLOSE),
            (None, "tab-about"),
            (None, "tab-leaderboard"),
            (None, ids::GAME_INFO_CONFIRM),
        ]);
        let grid = get_grid(ScreenId::GameInfoModal, &page);
        assert_eq!(grid.shape(), vec![1, 2, 1]);
        assert_eq!(grid.position_of(GroupRole::LeaderboardToggle), None);
    }

    #[test]
    fn test_search_modal_rows_in_order() {
        let page = FakePage::with(&[
            (None, ids::SEARCH_CLOSE),
            (None, ids::KEYBOARD_SEARCH_BAR),
            (Some("keyboard-row-1"), "keyboard-key-q"),
            (Some("keyboard-row-0"), "keyboard-key-1"),
            (Some("keyboard-row-0"), "keyboard-key-2"),
            (None, ids::SEARCH_CONFIRM),
        ]);
        let grid = get_grid(ScreenId::SearchModal, &page);
        assert_eq!(grid.shape(), vec![1, 1, 2, 1, 1]);
        assert_eq!(grid.role_of(2), Some(GroupRole::KeyboardRow(0)));
        assert_eq!(grid.role_of(3), Some(GroupRole::KeyboardRow(1)));
    }

    #[test]
    fn test_filter_modal_rows_by_category() {
        let page = FakePage::with(&[
            (None, ids::FILTER_BACK),
            (Some("filter-category-0"), "filter-option-single-player"),
            (Some("filter-category-0"), "filter-option-multiplayer"),
            (Some("filter-category-2"), "filter-option-2024"),
            (None, "filter-option-stray"),
            (None, ids::FILTER_CLEAR),
            (None, ids::FILTER_SUBMIT),
        ]);
        let grid = get_grid(ScreenId::FilterModal, &page);
        // The empty genre category is dropped
        assert_eq!(grid.shape(), vec![1, 2, 1, 2]);
        assert_eq!(grid.role_of(2), Some(GroupRole::FilterOptions(2)));
        assert_eq!(grid.position_of(GroupRole::FilterActions), Some(3));
    }
}
