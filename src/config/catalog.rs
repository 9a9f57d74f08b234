//! Values offered by the filter dropdowns and the submission form.

pub const GAMES: &[&str] = &["Valorant", "CS:GO", "Dota 2", "BGMI", "Free Fire"];

pub const REGIONS: &[&str] = &["India", "APAC", "SEA"];

pub const CURRENCIES: &[&str] = &["USD", "INR", "EUR"];

pub const STREAM_PLATFORMS: &[&str] = &["Twitch", "YouTube", "Kick", "Facebook Gaming"];

pub fn is_known_game(game: &str) -> bool {
    GAMES.iter().any(|known| known.eq_ignore_ascii_case(game.trim()))
}

pub fn is_known_region(region: &str) -> bool {
    REGIONS.iter().any(|known| known.eq_ignore_ascii_case(region.trim()))
}
