use ratatui::style::Color;

/// Sentinel filter value meaning "no type filter".
pub const ALL_TYPES: &str = "all";

pub const TYPE_FILTERS: [&str; 19] = [
    ALL_TYPES, "normal", "fire", "water", "electric", "grass", "ice", "fighting", "poison",
    "ground", "flying", "psychic", "bug", "rock", "ghost", "dragon", "dark", "steel", "fairy",
];

pub fn type_color(name: &str) -> Color {
    match name {
        "fire" => Color::Rgb(238, 129, 48),
        "water" => Color::Rgb(99, 144, 240),
        "grass" => Color::Rgb(122, 199, 76),
        "electric" => Color::Rgb(247, 208, 44),
        "psychic" => Color::Rgb(249, 85, 135),
        "ice" => Color::Rgb(150, 217, 214),
        "dragon" => Color::Rgb(111, 53, 252),
        "dark" => Color::Rgb(112, 87, 70),
        "fairy" => Color::Rgb(214, 133, 173),
        "fighting" => Color::Rgb(194, 46, 40),
        "poison" => Color::Rgb(163, 62, 161),
        "ground" => Color::Rgb(226, 191, 101),
        "flying" => Color::Rgb(169, 143, 243),
        "bug" => Color::Rgb(166, 185, 26),
        "rock" => Color::Rgb(182, 161, 54),
        "ghost" => Color::Rgb(115, 87, 151),
        "steel" => Color::Rgb(183, 183, 206),
        _ => Color::Rgb(168, 167, 122),
    }
}

/// Light types get dark chip text.
pub fn type_text_color(name: &str) -> Color {
    match name {
        "electric" | "ice" | "fairy" | "flying" | "normal" => Color::Rgb(12, 18, 28),
        _ => Color::Rgb(248, 248, 248),
    }
}

/// Position of `filter` in [`TYPE_FILTERS`] moved by `step`, wrapping at both ends.
pub fn cycle_type(filter: Option<&str>, step: i16) -> Option<String> {
    let len = TYPE_FILTERS.len() as i16;
    let current = filter
        .and_then(|name| TYPE_FILTERS.iter().position(|t| *t == name))
        .unwrap_or(0) as i16;
    let next = (current + step).rem_euclid(len) as usize;
    if next == 0 {
        None
    } else {
        Some(TYPE_FILTERS[next].to_string())
    }
}
