use chrono::{Datelike, NaiveDate};
use colored::{ColoredString, Colorize};
use std::fmt::Write;

use super::mode::{CalendarView, ViewContent};
use crate::domain::{PlatformStats, ResolvedEvent, Tier};
use crate::filter::FilterState;

const MAX_MARKERS: usize = 3;
const WEEKDAY_HEADER: &str = "Su    Mo    Tu    We    Th    Fr    Sa";

/// Render the calendar page for the view's current mode
pub fn render_calendar(view: &CalendarView, state: &FilterState) -> String {
    let mut out = String::new();
    match view.content(state) {
        ViewContent::Grid { weeks, by_date } => {
            let _ = writeln!(out, "{}", view.focused_month().format("%B %Y").to_string().bold());
            let _ = writeln!(out, "{}", WEEKDAY_HEADER.dimmed());
            for week in weeks {
                let row: Vec<String> = week
                    .iter()
                    .map(|cell| {
                        let events = by_date.get(&cell.date).map(Vec::as_slice).unwrap_or_default();
                        grid_cell(cell.date, events, cell.in_focused_month, cell.is_today, cell.date == view.selected_date())
                    })
                    .collect();
                let _ = writeln!(out, "{}", row.join(" "));
            }
            out.push('\n');
            out.push_str(&render_day_panel(view.selected_date(), &view.events_for_selected(state)));
        }
        ViewContent::List(events) => out.push_str(&render_list(&events)),
        ViewContent::Timeline(by_date) => {
            if by_date.is_empty() {
                let _ = writeln!(out, "{}", "No tournaments match the current filters".dimmed());
            }
            for (date, events) in by_date {
                let _ = writeln!(out, "{}", date.format("%A, %B %-d, %Y").to_string().bold());
                for event in events {
                    let _ = writeln!(out, "  {}", event_line(event));
                }
            }
        }
    }
    out
}

/// Side panel listing the selected day's tournaments
pub fn render_day_panel(date: NaiveDate, events: &[&ResolvedEvent]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", date.format("%A, %B %-d, %Y").to_string().dimmed());

    if events.is_empty() {
        let _ = writeln!(out, "{}", "No Tournaments Scheduled".bold());
        let _ = writeln!(
            out,
            "There are no tournaments scheduled for this date. Check other dates or adjust your filters."
        );
        return out;
    }

    let _ = writeln!(out, "{}", format!("{} tournaments scheduled", events.len()).bold());
    for event in events {
        let _ = writeln!(out, "  {}", event_line(event));
    }
    out
}

/// Flat list in fetch order; undated events show as TBD
pub fn render_list(events: &[&ResolvedEvent]) -> String {
    if events.is_empty() {
        return format!("{}\n", "No tournaments match the current filters".dimmed());
    }

    let mut out = String::new();
    for event in events {
        let date = match event.date() {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => "TBD".to_string(),
        };
        let _ = writeln!(out, "{:<10}  {}", date, event_line(event));
    }
    out
}

pub fn render_stats(stats: &PlatformStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<22}{}", "Live tournaments", stats.live_tournaments.to_string().bold());
    let _ = writeln!(out, "{:<22}{}", "Upcoming tournaments", stats.upcoming_tournaments.to_string().bold());
    let _ = writeln!(out, "{:<22}{}", "Active regions", stats.active_regions.to_string().bold());
    let prize = if stats.total_prize_pool.is_empty() { "-" } else { stats.total_prize_pool.as_str() };
    let _ = writeln!(out, "{:<22}{}", "Total prize pool", prize.bold());
    out
}

// --- Helper Methods ---

fn grid_cell(date: NaiveDate, events: &[&ResolvedEvent], in_month: bool, is_today: bool, selected: bool) -> String {
    let day = format!("{:>2}", date.day());
    let day = match (in_month, is_today, selected) {
        (_, _, true) => day.reversed(),
        (_, true, _) => day.bold().underline(),
        (false, _, _) => day.dimmed(),
        _ => day.normal(),
    };

    let markers: Vec<ColoredString> = events
        .iter()
        .take(MAX_MARKERS)
        .map(|event| tier_marker(event.record.tier))
        .collect();
    let padding = " ".repeat(MAX_MARKERS - markers.len());
    let markers: String = markers.iter().map(ToString::to_string).collect();

    format!("{}{}{}", day, markers, padding)
}

fn tier_marker(tier: Option<Tier>) -> ColoredString {
    match tier {
        Some(Tier::Tier1) => "●".yellow(),
        Some(Tier::Tier2) => "●".blue(),
        Some(Tier::Tier3) => "●".red(),
        None => "●".white(),
    }
}

fn event_line(event: &ResolvedEvent) -> String {
    let record = &event.record;
    let details: Vec<&str> = [
        record.game.as_deref(),
        record.region.as_deref(),
        record.tier.map(|t| t.label()),
    ]
    .into_iter()
    .flatten()
    .collect();

    let title = if record.is_live() {
        format!("{} {}", record.title.bold(), "LIVE".red().bold())
    } else {
        record.title.bold().to_string()
    };

    if details.is_empty() {
        title
    } else {
        format!("{}  {}", title, details.join(" | ").dimmed())
    }
}
