use chrono::NaiveDate;

use crate::domain::ResolvedEvent;

const PRODUCT_ID: &str = "-//Esports Calendar//Tournament Export//EN";
const MAX_LINE_OCTETS: usize = 75;
const CRLF: &str = "\r\n";

/// What an export covers; decides the download's file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    /// The whole calendar for the month containing this date
    Calendar(NaiveDate),
    Day(NaiveDate),
}

impl ExportScope {
    pub fn file_name(&self) -> String {
        match self {
            ExportScope::Calendar(month) => format!("esports-calendar-{}.ics", month.format("%Y-%m")),
            ExportScope::Day(day) => format!("esports-{}.ics", day.format("%Y-%m-%d")),
        }
    }
}

/// Serialize resolved events as an iCalendar document.
///
/// Unresolved events are skipped. Output depends only on the input order.
pub fn export_ics<'a, I>(events: I) -> String
where
    I: IntoIterator<Item = &'a ResolvedEvent>,
{
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODUCT_ID),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
    ];

    for event in events {
        if let Some(date) = event.date() {
            lines.extend(event_block(event, date));
        }
    }

    lines.push("END:VCALENDAR".to_string());

    lines
        .iter()
        .map(|line| fold_line(line))
        .map(|line| line + CRLF)
        .collect()
}

fn event_block(event: &ResolvedEvent, date: NaiveDate) -> Vec<String> {
    let record = &event.record;
    let day = date.format("%Y%m%d");

    vec![
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}-{}@esports-calendar", escape_text(&record.id), day),
        format!("DTSTAMP:{}T000000Z", day),
        format!("DTSTART;VALUE=DATE:{}", day),
        format!("SUMMARY:{}", escape_text(&record.title)),
        format!("DESCRIPTION:{}", escape_text(&description(event))),
        "END:VEVENT".to_string(),
    ]
}

/// `game / region / tier`, skipping whatever the record lacks
fn description(event: &ResolvedEvent) -> String {
    let record = &event.record;
    [
        record.game.clone(),
        record.region.clone(),
        record.tier.map(|t| t.label().to_string()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" / ")
}

/// RFC 5545 TEXT escaping
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

/// Fold at 75 octets without splitting a UTF-8 character
fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut folded = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut octets = 0;
    for c in line.chars() {
        // Continuation lines start with a space, which counts toward the limit.
        if octets + c.len_utf8() > MAX_LINE_OCTETS {
            folded.push_str(CRLF);
            folded.push(' ');
            octets = 1;
        }
        folded.push(c);
        octets += c.len_utf8();
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateResolution, DateSource, Tier, TournamentRecord};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn event(id: &str, title: &str, on: Option<NaiveDate>) -> ResolvedEvent {
        ResolvedEvent {
            record: TournamentRecord {
                id: id.to_string(),
                title: title.to_string(),
                game: Some("Valorant".to_string()),
                region: Some("APAC".to_string()),
                tier: Some(Tier::Tier1),
                ..TournamentRecord::default()
            },
            resolution: match on {
                Some(date) => DateResolution::Resolved {
                    date,
                    source: DateSource {
                        field: "date".to_string(),
                        strategy: "iso-date",
                    },
                },
                None => DateResolution::Unresolved,
            },
        }
    }

    #[test]
    fn two_events_two_blocks_with_matching_start_lines() {
        let events = vec![
            event("1", "VCT Champions 2026 - APAC Qualifier", Some(date(2026, 1, 29))),
            event("2", "BGMI Pro Series S4", Some(date(2026, 1, 30))),
        ];

        let doc = export_ics(&events);

        assert_eq!(doc.matches("BEGIN:VEVENT").count(), 2);
        assert!(doc.contains("DTSTART;VALUE=DATE:20260129\r\n"));
        assert!(doc.contains("DTSTART;VALUE=DATE:20260130\r\n"));
        assert!(doc.contains("DESCRIPTION:Valorant / APAC / Tier 1\r\n"));
        assert!(doc.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(doc.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn unresolved_events_are_skipped() {
        let events = vec![event("1", "Dated", Some(date(2026, 2, 2))), event("2", "TBD", None)];
        let doc = export_ics(&events);

        assert_eq!(doc.matches("BEGIN:VEVENT").count(), 1);
        assert!(!doc.contains("SUMMARY:TBD"));
    }

    #[test]
    fn output_is_deterministic() {
        let events = vec![event("1", "Cup", Some(date(2026, 2, 2)))];
        assert_eq!(export_ics(&events), export_ics(&events));
    }

    #[test]
    fn text_values_are_escaped() {
        assert_eq!(escape_text("Finals; Day 1, Mumbai\nLAN"), "Finals\\; Day 1\\, Mumbai\\nLAN");
    }

    #[test]
    fn long_lines_fold_within_limit() {
        let long = format!("SUMMARY:{}", "Ω".repeat(60));
        let folded = fold_line(&long);

        for physical in folded.split(CRLF) {
            assert!(physical.len() <= MAX_LINE_OCTETS, "{} octets", physical.len());
        }
        assert_eq!(folded.replace("\r\n ", ""), long);
    }

    #[test]
    fn file_names_follow_scope() {
        assert_eq!(ExportScope::Calendar(date(2026, 1, 1)).file_name(), "esports-calendar-2026-01.ics");
        assert_eq!(ExportScope::Day(date(2026, 1, 29)).file_name(), "esports-2026-01-29.ics");
    }
}
