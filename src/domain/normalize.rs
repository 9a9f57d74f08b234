//! Mapping from the API's loosely shaped JSON into canonical domain types.
//!
//! Every response body passes through here exactly once, right after it is
//! fetched. Nothing downstream looks at raw field names.

use serde_json::{Map, Value};

use super::models::{DateFields, DateValue, PlatformStats, Tier, TournamentRecord, UserProfile};
use crate::calendar::resolver::{FREE_TEXT_DATE_FIELDS, STRUCTURED_DATE_FIELDS};

const ID_FIELDS: &[&str] = &["id", "_id", "tournamentId", "tournament_id"];
const TITLE_FIELDS: &[&str] = &["title", "name", "eventName", "event_name"];
const GAME_FIELDS: &[&str] = &["game", "gameTitle", "game_title"];
const REGION_FIELDS: &[&str] = &["region", "regionName"];
const TIER_FIELDS: &[&str] = &["tier", "tournamentTier"];
const ORGANIZER_FIELDS: &[&str] = &["organizer", "organiser", "host"];
const PRIZE_FIELDS: &[&str] = &["prize", "prizePool", "prize_pool"];
const PARTICIPANT_FIELDS: &[&str] = &["participants", "registeredParticipants", "teams"];
const MAX_PARTICIPANT_FIELDS: &[&str] = &["maxParticipants", "max_participants", "slots"];
const USER_ID_FIELDS: &[&str] = &["id", "_id", "userId", "userid"];

/// Map one listing entry into a [`TournamentRecord`]; non-objects yield `None`
pub fn normalize_tournament(raw: &Value) -> Option<TournamentRecord> {
    let obj = raw.as_object()?;

    let id = text_field(obj, ID_FIELDS).unwrap_or_default();
    let title = text_field(obj, TITLE_FIELDS).unwrap_or_else(|| "Untitled tournament".to_string());

    Some(TournamentRecord {
        id,
        title,
        game: text_field(obj, GAME_FIELDS),
        region: text_field(obj, REGION_FIELDS),
        tier: text_field(obj, TIER_FIELDS).and_then(|t| Tier::parse(&t)),
        organizer: text_field(obj, ORGANIZER_FIELDS),
        prize_pool: text_field(obj, PRIZE_FIELDS),
        currency: text_field(obj, &["currency"]),
        participants: count_field(obj, PARTICIPANT_FIELDS),
        max_participants: count_field(obj, MAX_PARTICIPANT_FIELDS),
        status: text_field(obj, &["status"]),
        format: text_field(obj, &["format"]),
        stream_url: text_field(obj, &["streamLink", "stream_link", "streamUrl"]),
        registration_url: text_field(obj, &["regLink", "registrationLink", "registrationUrl"]),
        date_fields: collect_date_fields(obj),
    })
}

pub fn normalize_tournaments(items: &[Value]) -> Vec<TournamentRecord> {
    items.iter().filter_map(normalize_tournament).collect()
}

/// Map a user object (login response, profile endpoint) into a [`UserProfile`]
pub fn normalize_user(raw: &Value) -> Option<UserProfile> {
    let obj = raw.as_object()?;

    Some(UserProfile {
        id: text_field(obj, USER_ID_FIELDS),
        username: text_field(obj, &["username", "userName"]),
        display_name: text_field(obj, &["displayName", "display_name", "name"]),
        email: text_field(obj, &["email"]),
        bio: text_field(obj, &["bio"]),
        games: text_field(obj, &["games", "primaryGames"]),
        career_history: text_field(obj, &["careerHistory", "career_history"]),
        organization: text_field(obj, &["organization", "org"]),
    })
}

pub fn normalize_stats(raw: &Value) -> PlatformStats {
    let Some(obj) = raw.as_object() else {
        return PlatformStats::default();
    };

    PlatformStats {
        live_tournaments: number_field(obj, &["liveTournaments", "live"]).unwrap_or(0),
        upcoming_tournaments: number_field(obj, &["upcomingTournaments", "upcoming"]).unwrap_or(0),
        active_regions: number_field(obj, &["activeRegions", "regions"]).unwrap_or(0),
        total_prize_pool: text_field(obj, &["totalPrizePool", "prizePool", "prizePoolTotal"])
            .unwrap_or_default(),
    }
}

// --- Helper Methods ---

fn collect_date_fields(obj: &Map<String, Value>) -> DateFields {
    let mut fields = DateFields::new();

    let names = STRUCTURED_DATE_FIELDS.iter().chain(FREE_TEXT_DATE_FIELDS.iter());
    for name in names {
        if let Some(value) = obj.get(*name).and_then(date_value) {
            fields.insert(*name, value);
        }
    }

    fields
}

fn date_value(value: &Value) -> Option<DateValue> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .map(DateValue::Timestamp),
        Value::String(s) if !s.trim().is_empty() => Some(DateValue::Text(s.trim().to_string())),
        _ => None,
    }
}

/// First non-empty string (or stringified number) among `keys`
fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn count_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<u32> {
    number_field(obj, keys).and_then(|n| u32::try_from(n).ok())
}

fn number_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Array(items) => Some(items.len() as u64),
        _ => None,
    })
}
