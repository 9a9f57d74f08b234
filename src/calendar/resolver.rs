use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use log::debug;
use regex::Regex;

use super::clock::CalendarClock;
use crate::domain::{DateResolution, DateSource, DateValue, ResolvedEvent, TournamentRecord};

/// Structured date fields, highest priority first
pub const STRUCTURED_DATE_FIELDS: &[&str] = &[
    "startDate",
    "start_date",
    "startDateTime",
    "startTime",
    "start_time",
    "startsAt",
    "starts_at",
    "start",
    "eventDate",
    "event_date",
    "date",
    "scheduledDate",
];

/// Free-text fields scanned by the month/day heuristic
pub const FREE_TEXT_DATE_FIELDS: &[&str] = &["date", "dateText", "displayDate", "when", "schedule", "dates"];

const MIN_PLAUSIBLE_YEAR: i32 = 2000;
const MAX_PLAUSIBLE_YEAR: i32 = 2100;
const MILLIS_THRESHOLD: u64 = 100_000_000_000;

const NATURAL_DATE_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d %B, %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
];

const NATURAL_DATETIME_FORMATS: &[&str] = &[
    "%B %d, %Y %H:%M",
    "%b %d, %Y %H:%M",
    "%B %d, %Y %I:%M %p",
    "%b %d, %Y %I:%M %p",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M",
];

/// Outcome of one parsing strategy against one field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyOutcome {
    Parsed(NaiveDate),
    /// The strategy owns this value but it is not a usable date
    Rejected,
    /// Not this strategy's kind of value; try the next one
    NotApplicable,
}

/// One step of the date fallback chain
pub trait DateStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn attempt(&self, value: &DateValue, clock: &CalendarClock) -> StrategyOutcome;
}

/// Epoch seconds or milliseconds, numeric or all-digit text
pub struct TimestampStrategy;

impl DateStrategy for TimestampStrategy {
    fn name(&self) -> &'static str {
        "timestamp"
    }

    fn attempt(&self, value: &DateValue, clock: &CalendarClock) -> StrategyOutcome {
        let raw = match value {
            DateValue::Timestamp(n) => *n,
            DateValue::Text(text) if is_digit_timestamp(text) => match text.parse() {
                Ok(n) => n,
                Err(_) => return StrategyOutcome::Rejected,
            },
            DateValue::Text(_) => return StrategyOutcome::NotApplicable,
        };

        let instant = if raw.unsigned_abs() >= MILLIS_THRESHOLD {
            DateTime::from_timestamp_millis(raw)
        } else {
            DateTime::from_timestamp(raw, 0)
        };

        match instant {
            Some(instant) => StrategyOutcome::Parsed(clock.local_date(&instant)),
            None => StrategyOutcome::Rejected,
        }
    }
}

/// `YYYY-MM-DD`, optionally followed by a time, parsed strictly
pub struct StrictIsoStrategy {
    pattern: Regex,
}

impl StrictIsoStrategy {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(r"^(\d{4})-(\d{2})-(\d{2})(?:[T ].*)?$")
            .context("Failed to compile ISO date regex")?;
        Ok(Self { pattern })
    }
}

impl DateStrategy for StrictIsoStrategy {
    fn name(&self) -> &'static str {
        "iso-date"
    }

    fn attempt(&self, value: &DateValue, clock: &CalendarClock) -> StrategyOutcome {
        let DateValue::Text(text) = value else {
            return StrategyOutcome::NotApplicable;
        };
        let Some(caps) = self.pattern.captures(text) else {
            return StrategyOutcome::NotApplicable;
        };

        // A full timestamp with an offset is an instant; shift it to local time.
        if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
            return StrategyOutcome::Parsed(clock.local_date(&instant));
        }

        let parts = (caps[1].parse(), caps[2].parse(), caps[3].parse());
        match parts {
            (Ok(year), Ok(month), Ok(day)) => NaiveDate::from_ymd_opt(year, month, day)
                .map_or(StrategyOutcome::Rejected, StrategyOutcome::Parsed),
            _ => StrategyOutcome::Rejected,
        }
    }
}

/// Permissive parsing of human-written dates, guarded by a plausible year
pub struct NaturalDateStrategy {
    ordinal_suffix: Regex,
}

impl NaturalDateStrategy {
    pub fn new() -> Result<Self> {
        let ordinal_suffix = Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b")
            .context("Failed to compile ordinal suffix regex")?;
        Ok(Self { ordinal_suffix })
    }

    fn parse(&self, text: &str, clock: &CalendarClock) -> Option<NaiveDate> {
        let cleaned = self.ordinal_suffix.replace_all(text.trim(), "$1");
        let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

        if let Ok(instant) = DateTime::parse_from_rfc3339(&cleaned) {
            return Some(clock.local_date(&instant));
        }
        if let Ok(instant) = DateTime::parse_from_rfc2822(&cleaned) {
            return Some(clock.local_date(&instant));
        }

        NATURAL_DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
            .or_else(|| {
                NATURAL_DATETIME_FORMATS
                    .iter()
                    .find_map(|format| NaiveDateTime::parse_from_str(&cleaned, format).ok())
                    .map(|dt| dt.date())
            })
    }
}

impl DateStrategy for NaturalDateStrategy {
    fn name(&self) -> &'static str {
        "natural-date"
    }

    fn attempt(&self, value: &DateValue, clock: &CalendarClock) -> StrategyOutcome {
        let DateValue::Text(text) = value else {
            return StrategyOutcome::NotApplicable;
        };

        match self.parse(text, clock) {
            Some(date) if is_plausible_year(date.year()) => StrategyOutcome::Parsed(date),
            Some(_) => StrategyOutcome::Rejected,
            None => StrategyOutcome::NotApplicable,
        }
    }
}

/// Last resort: "Feb 15" / "15 February" anywhere in the text, current year
pub struct MonthDayHeuristic {
    month_first: Regex,
    day_first: Regex,
}

impl MonthDayHeuristic {
    pub fn new() -> Result<Self> {
        let month_first = Regex::new(
            r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b",
        )
        .context("Failed to compile month-first regex")?;
        let day_first = Regex::new(
            r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\b",
        )
        .context("Failed to compile day-first regex")?;

        Ok(Self {
            month_first,
            day_first,
        })
    }

    fn month_and_day(&self, text: &str) -> Option<(u32, u32)> {
        if let Some(caps) = self.month_first.captures(text) {
            return Some((month_number(&caps[1])?, caps[2].parse().ok()?));
        }
        let caps = self.day_first.captures(text)?;
        Some((month_number(&caps[2])?, caps[1].parse().ok()?))
    }
}

impl DateStrategy for MonthDayHeuristic {
    fn name(&self) -> &'static str {
        "month-day-heuristic"
    }

    fn attempt(&self, value: &DateValue, clock: &CalendarClock) -> StrategyOutcome {
        let DateValue::Text(text) = value else {
            return StrategyOutcome::NotApplicable;
        };

        self.month_and_day(text)
            .and_then(|(month, day)| NaiveDate::from_ymd_opt(clock.today().year(), month, day))
            .map_or(StrategyOutcome::Rejected, StrategyOutcome::Parsed)
    }
}

enum ChainOutcome {
    Resolved(DateResolution),
    Rejected,
    Unmatched,
}

/// Assigns each record at most one calendar date
pub struct EventDateResolver {
    clock: CalendarClock,
    structured: Vec<Box<dyn DateStrategy>>,
    heuristic: MonthDayHeuristic,
}

impl EventDateResolver {
    pub fn new(clock: CalendarClock) -> Result<Self> {
        let structured: Vec<Box<dyn DateStrategy>> = vec![
            Box::new(TimestampStrategy),
            Box::new(StrictIsoStrategy::new()?),
            Box::new(NaturalDateStrategy::new()?),
        ];

        Ok(Self {
            clock,
            structured,
            heuristic: MonthDayHeuristic::new()?,
        })
    }

    pub fn clock(&self) -> &CalendarClock {
        &self.clock
    }

    pub fn resolve(&self, record: &TournamentRecord) -> DateResolution {
        let mut rejected = Vec::new();
        if let Some(resolution) = self.resolve_structured(record, &mut rejected) {
            return resolution;
        }
        if let Some(resolution) = self.resolve_free_text(record, &rejected) {
            return resolution;
        }

        debug!("No usable date on tournament '{}' ({})", record.title, record.id);
        DateResolution::Unresolved
    }

    pub fn resolve_event(&self, record: TournamentRecord) -> ResolvedEvent {
        let resolution = self.resolve(&record);
        ResolvedEvent { record, resolution }
    }

    pub fn resolve_all(&self, records: Vec<TournamentRecord>) -> Vec<ResolvedEvent> {
        records.into_iter().map(|r| self.resolve_event(r)).collect()
    }

    // --- Helper Methods ---

    /// Fields a strategy owned but refused are pushed onto `rejected`
    fn resolve_structured(
        &self,
        record: &TournamentRecord,
        rejected: &mut Vec<&'static str>,
    ) -> Option<DateResolution> {
        for &field in STRUCTURED_DATE_FIELDS {
            let Some(value) = record.date_fields.get(field) else {
                continue;
            };
            match self.run_chain(field, value) {
                ChainOutcome::Resolved(resolution) => return Some(resolution),
                ChainOutcome::Rejected => rejected.push(field),
                ChainOutcome::Unmatched => {}
            }
        }
        None
    }

    fn run_chain(&self, field: &str, value: &DateValue) -> ChainOutcome {
        for strategy in &self.structured {
            match strategy.attempt(value, &self.clock) {
                StrategyOutcome::Parsed(date) => {
                    return ChainOutcome::Resolved(Self::resolved(date, field, strategy.name()));
                }
                StrategyOutcome::Rejected => {
                    debug!("Field '{}' rejected by {}", field, strategy.name());
                    return ChainOutcome::Rejected;
                }
                StrategyOutcome::NotApplicable => continue,
            }
        }
        ChainOutcome::Unmatched
    }

    /// A field already rejected is not rescanned for a bare month and day
    fn resolve_free_text(&self, record: &TournamentRecord, rejected: &[&str]) -> Option<DateResolution> {
        FREE_TEXT_DATE_FIELDS.iter().find_map(|field| {
            if rejected.contains(field) {
                return None;
            }
            let value = record.date_fields.get(field)?;
            match self.heuristic.attempt(value, &self.clock) {
                StrategyOutcome::Parsed(date) => {
                    Some(Self::resolved(date, field, self.heuristic.name()))
                }
                _ => None,
            }
        })
    }

    fn resolved(date: NaiveDate, field: &str, strategy: &'static str) -> DateResolution {
        DateResolution::Resolved {
            date,
            source: DateSource {
                field: field.to_string(),
                strategy,
            },
        }
    }
}

fn is_digit_timestamp(text: &str) -> bool {
    text.len() >= 9 && text.chars().all(|c| c.is_ascii_digit())
}

fn is_plausible_year(year: i32) -> bool {
    (MIN_PLAUSIBLE_YEAR..=MAX_PLAUSIBLE_YEAR).contains(&year)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
