use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Competitive level of a tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Tier1,
    Tier2,
    Tier3,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Tier1, Tier::Tier2, Tier::Tier3];

    /// Parse the loose tier spellings seen in the API ("Tier 1", "tier1", "T1", "1")
    pub fn parse(raw: &str) -> Option<Self> {
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        match compact.as_str() {
            "tier1" | "t1" | "1" => Some(Tier::Tier1),
            "tier2" | "t2" | "2" => Some(Tier::Tier2),
            "tier3" | "t3" | "3" => Some(Tier::Tier3),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Tier1 => "Tier 1",
            Tier::Tier2 => "Tier 2",
            Tier::Tier3 => "Tier 3",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::parse(s).ok_or_else(|| format!("unknown tier '{}' (expected Tier 1, Tier 2 or Tier 3)", s))
    }
}

/// A raw date-like value as the API delivered it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DateValue {
    Timestamp(i64),
    Text(String),
}

/// Date-like fields of a record, keyed by their source field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateFields(Vec<(String, DateValue)>);

impl DateFields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, field: impl Into<String>, value: DateValue) {
        let field = field.into();
        match self.0.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.0.push((field, value)),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: DateValue) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&DateValue> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DateValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Canonical tournament record, produced once at the normalization boundary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentRecord {
    pub id: String,
    pub title: String,
    pub game: Option<String>,
    pub region: Option<String>,
    pub tier: Option<Tier>,
    pub organizer: Option<String>,
    pub prize_pool: Option<String>,
    pub currency: Option<String>,
    pub participants: Option<u32>,
    pub max_participants: Option<u32>,
    pub status: Option<String>,
    pub format: Option<String>,
    pub stream_url: Option<String>,
    pub registration_url: Option<String>,
    pub date_fields: DateFields,
}

impl TournamentRecord {
    pub fn is_live(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("live"))
    }
}

/// Where a resolved date came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSource {
    pub field: String,
    pub strategy: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DateResolution {
    Resolved { date: NaiveDate, source: DateSource },
    Unresolved,
}

/// A record paired with its single calendar date, if any
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEvent {
    pub record: TournamentRecord,
    pub resolution: DateResolution,
}

impl ResolvedEvent {
    pub fn date(&self) -> Option<NaiveDate> {
        match &self.resolution {
            DateResolution::Resolved { date, .. } => Some(*date),
            DateResolution::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.date().is_some()
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }
}

/// One page of the tournament listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TournamentPage {
    pub items: Vec<TournamentRecord>,
    pub total: usize,
    pub page: usize,
    pub size: usize,
}

impl TournamentPage {
    pub fn empty(page: usize, size: usize) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page,
            size,
        }
    }

    pub fn has_more(&self) -> bool {
        if self.items.is_empty() || self.size == 0 {
            return false;
        }
        (self.page + 1) * self.size < self.total
    }
}

/// Aggregate statistics shown on the homepage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub live_tournaments: u64,
    pub upcoming_tournaments: u64,
    pub active_regions: u64,
    pub total_prize_pool: String,
}

/// User account as cached in the session and edited on the profile page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Option<String>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub games: Option<String>,
    pub career_history: Option<String>,
    pub organization: Option<String>,
}

impl UserProfile {
    pub fn display_label(&self) -> String {
        self.display_name
            .clone()
            .or_else(|| self.username.clone())
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "Unknown user".to_string())
    }
}

/// Logged-in identity: auth token plus the cached user object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub org: Option<String>,
}

/// Tournament submitted by an organizer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventSubmission {
    pub name: String,
    pub game: String,
    pub tier: String,
    pub region: String,
    pub start_date: String,
    pub end_date: String,
    pub reg_deadline: String,
    pub prize: String,
    pub currency: String,
    pub format: String,
    pub max_participants: String,
    pub reg_link: String,
    pub stream_platform: String,
    pub stream_link: String,
    pub organizer: String,
    pub email: String,
    pub phone: String,
    pub description: String,
    pub rules: String,
}

impl EventSubmission {
    pub fn new() -> Self {
        Self {
            tier: Tier::Tier2.label().to_string(),
            currency: "USD".to_string(),
            ..Self::default()
        }
    }
}
