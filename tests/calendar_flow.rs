use chrono::{Datelike, NaiveDate, Weekday};
use pretty_assertions::assert_eq;
use serde_json::json;

use esports_calendar::api::parsers::parse_page;
use esports_calendar::calendar::{CalendarClock, EventDateResolver, month_grid};
use esports_calendar::domain::{ResolvedEvent, Tier};
use esports_calendar::export::export_ics;
use esports_calendar::filter::{Choice, DateRange, FilterState};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

fn resolver() -> EventDateResolver {
    EventDateResolver::new(CalendarClock::utc(date(2026, 1, 29))).expect("resolver builds")
}

fn listing() -> serde_json::Value {
    json!({
        "content": [
            { "id": 1, "name": "VCT Champions 2026 - APAC Qualifier", "game": "Valorant",
              "date": "2026-01-29", "tier": "Tier 1", "region": "APAC", "organizer": "Riot Games" },
            { "id": 2, "name": "BGMI Pro Series S4", "game": "BGMI",
              "startDate": "2026-01-30T12:00:00Z", "tier": "Tier 2", "region": "India" },
            { "id": 3, "name": "Free Fire Clash", "game": "Free Fire",
              "dateText": "Feb 15", "tier": "Tier 3", "region": "India" },
            { "id": 4, "name": "Valorant Open", "game": "Valorant", "region": "India", "tier": "Tier 2" },
            "not an object"
        ],
        "totalElements": 4
    })
}

fn load() -> FilterState {
    let page = parse_page(&listing(), 0, 50);
    let mut state = FilterState::new(date(2026, 1, 29));
    state.replace_events(resolver().resolve_all(page.items));
    state
}

fn ids(events: &[&ResolvedEvent]) -> Vec<String> {
    events.iter().map(|e| e.id().to_string()).collect()
}

#[test]
fn listing_flows_into_calendar_days() {
    let state = load();

    assert_eq!(state.all_events().len(), 4);
    assert_eq!(ids(&state.events_on(date(2026, 1, 29))), vec!["1"]);
    assert_eq!(ids(&state.events_on(date(2026, 1, 30))), vec!["2"]);
    assert_eq!(ids(&state.events_on(date(2026, 2, 15))), vec!["3"]);

    // No date at all: listed, never placed on a day
    let placed: Vec<String> = state
        .visible_by_date()
        .values()
        .flat_map(|events| events.iter().map(|e| e.id().to_string()))
        .collect();
    assert!(!placed.contains(&"4".to_string()));
    assert!(ids(&state.visible()).contains(&"4".to_string()));
}

#[test]
fn filters_narrow_the_calendar_conjunctively() {
    let mut state = load();
    state.set_region(Choice::Only("India".to_string()));
    state.set_tier(Choice::Only(Tier::Tier2));

    assert_eq!(ids(&state.visible()), vec!["2", "4"]);

    state.set_date_range(DateRange::ThisMonth);
    assert_eq!(ids(&state.visible()), vec!["2"]);

    state.reset();
    state.set_search("riot");
    assert_eq!(ids(&state.visible()), vec!["1"]);
}

#[test]
fn every_month_grid_is_whole_weeks() {
    for year in [2024, 2025, 2026] {
        for month in 1..=12 {
            let reference = date(year, month, 1);
            let grid = month_grid(reference);
            let days: Vec<NaiveDate> = grid.days().collect();

            assert_eq!(days.len() % 7, 0);
            assert_eq!(days.first().map(|d| d.weekday()), Some(Weekday::Sun));
            assert_eq!(days.last().map(|d| d.weekday()), Some(Weekday::Sat));

            let in_month = days.iter().filter(|d| d.month() == month && d.year() == year).count();
            let expected = reference
                .checked_add_months(chrono::Months::new(1))
                .map(|next| (next - reference).num_days() as usize);
            assert_eq!(Some(in_month), expected);

            assert_eq!(grid, month_grid(date(year, month, 20)));
        }
    }
}

#[test]
fn exported_month_matches_the_grid() {
    let state = load();
    let grid = month_grid(date(2026, 1, 1));
    let (first, last) = (
        grid.first_day().expect("grid has days"),
        grid.last_day().expect("grid has days"),
    );

    let doc = export_ics(state.visible_between(first, last));

    assert_eq!(doc.matches("BEGIN:VEVENT").count(), 2);
    assert!(doc.contains("DTSTART;VALUE=DATE:20260129"));
    assert!(doc.contains("DTSTART;VALUE=DATE:20260130"));
    assert!(doc.contains("SUMMARY:BGMI Pro Series S4"));
    assert!(doc.contains("DESCRIPTION:BGMI / India / Tier 2"));
}
