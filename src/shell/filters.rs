//! Filter modal options

use crate::grid::ids;
use crate::navigation::GameFilter;

pub const GENRES: [&str; 4] = ["Platformer", "Strategy", "First Person Shooter", "Survival"];
pub const YEARS: [&str; 1] = ["2024"];

/// Category titles with their options, top to bottom
pub fn categories() -> Vec<(&'static str, Vec<GameFilter>)> {
    vec![
        ("Players", vec![GameFilter::SinglePlayer, GameFilter::Multiplayer]),
        ("Genre", GENRES.iter().map(|g| GameFilter::Genre(g.to_string())).collect()),
        ("Year of Development", YEARS.iter().map(|y| GameFilter::Year(y.to_string())).collect()),
    ]
}

/// Option behind a `filter-option-<slug>` data id
pub fn option_of(data_id: &str) -> Option<GameFilter> {
    categories()
        .into_iter()
        .flat_map(|(_, options)| options)
        .find(|option| ids::filter_option(option.label()) == data_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_match_grid_rows() {
        assert_eq!(categories().len(), ids::FILTER_CATEGORY_COUNT as usize);
    }

    #[test]
    fn test_option_of() {
        assert_eq!(option_of("filter-option-single-player"), Some(GameFilter::SinglePlayer));
        assert_eq!(
            option_of("filter-option-first-person-shooter"),
            Some(GameFilter::Genre("First Person Shooter".into()))
        );
        assert_eq!(option_of("filter-option-2024"), Some(GameFilter::Year("2024".into())));
        assert_eq!(option_of("filter-option-racing"), None);
        assert_eq!(option_of(ids::FILTER_CLEAR), None);
    }
}
