use chrono::{Datelike, Days, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::calendar::grid::{first_of_month, last_of_month};
use crate::domain::{ResolvedEvent, Tier, TournamentRecord};

/// One filter axis: either the "all" sentinel or a single selected value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T> Choice<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }

    pub fn selected(&self) -> Option<&T> {
        match self {
            Choice::All => None,
            Choice::Only(value) => Some(value),
        }
    }
}

impl Choice<String> {
    /// Treats empty input and "all" (any case) as the sentinel
    pub fn text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Choice::All
        } else {
            Choice::Only(trimmed.to_string())
        }
    }

    pub fn admits(&self, value: Option<&str>) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => value.is_some_and(|v| v.trim().eq_ignore_ascii_case(wanted)),
        }
    }
}

impl Choice<Tier> {
    pub fn admits(&self, value: Option<Tier>) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => value == Some(*wanted),
        }
    }
}

impl FromStr for Choice<Tier> {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("all") {
            return Ok(Choice::All);
        }
        s.parse().map(Choice::Only)
    }
}

/// Date window applied to resolved event dates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRange {
    #[default]
    All,
    Today,
    ThisWeek,
    ThisMonth,
    Between { from: NaiveDate, to: NaiveDate },
}

impl DateRange {
    /// Inclusive bounds relative to `today`; `None` for [`DateRange::All`]
    pub fn bounds(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            DateRange::All => None,
            DateRange::Today => Some((today, today)),
            DateRange::ThisWeek => {
                let start = today - Days::new(u64::from(today.weekday().num_days_from_sunday()));
                Some((start, start + Days::new(6)))
            }
            DateRange::ThisMonth => Some((first_of_month(today), last_of_month(today))),
            DateRange::Between { from, to } => Some((from.min(to), from.max(to))),
        }
    }

    /// Unresolved events (no date) only pass the `All` range
    pub fn admits(&self, date: Option<NaiveDate>, today: NaiveDate) -> bool {
        match self.bounds(today) {
            None => true,
            Some((from, to)) => date.is_some_and(|d| from <= d && d <= to),
        }
    }

    pub fn query_value(&self) -> Option<String> {
        match self {
            DateRange::All => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRange::All => f.write_str("all"),
            DateRange::Today => f.write_str("today"),
            DateRange::ThisWeek => f.write_str("this-week"),
            DateRange::ThisMonth => f.write_str("this-month"),
            DateRange::Between { from, to } => write!(f, "{}..{}", from, to),
        }
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "" | "all" => Ok(DateRange::All),
            "today" => Ok(DateRange::Today),
            "this-week" | "week" => Ok(DateRange::ThisWeek),
            "this-month" | "month" => Ok(DateRange::ThisMonth),
            range => {
                let (from, to) = range
                    .split_once("..")
                    .ok_or_else(|| format!("unknown date range '{}'", s))?;
                let parse = |part: &str| {
                    NaiveDate::parse_from_str(part, "%Y-%m-%d")
                        .map_err(|e| format!("invalid date '{}' in range: {}", part, e))
                };
                Ok(DateRange::Between {
                    from: parse(from)?,
                    to: parse(to)?,
                })
            }
        }
    }
}

/// The five independent filter axes of the tournament views
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub game: Choice<String>,
    pub region: Choice<String>,
    pub tier: Choice<Tier>,
    pub date_range: DateRange,
    pub search: String,
}

impl FilterSelection {
    pub fn is_unfiltered(&self) -> bool {
        *self == FilterSelection::default()
    }

    /// Conjunction of every non-"all" axis
    pub fn matches(&self, event: &ResolvedEvent, today: NaiveDate) -> bool {
        let record = &event.record;

        self.game.admits(record.game.as_deref())
            && self.region.admits(record.region.as_deref())
            && self.tier.admits(record.tier)
            && self.date_range.admits(event.date(), today)
            && self.matches_search(record)
    }

    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }

    fn matches_search(&self, record: &TournamentRecord) -> bool {
        let Some(term) = self.search_term() else {
            return true;
        };
        let needle = term.to_lowercase();

        [Some(record.title.as_str()), record.game.as_deref(), record.organizer.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}
