use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::selection::{Choice, DateRange, FilterSelection};
use crate::domain::{ResolvedEvent, Tier};

/// Active filter selection plus the most recently fetched events
#[derive(Debug, Clone)]
pub struct FilterState {
    selection: FilterSelection,
    events: Vec<ResolvedEvent>,
    today: NaiveDate,
}

impl FilterState {
    pub fn new(today: NaiveDate) -> Self {
        Self::with_selection(FilterSelection::default(), today)
    }

    pub fn with_selection(selection: FilterSelection, today: NaiveDate) -> Self {
        Self {
            selection,
            events: Vec::new(),
            today,
        }
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    // --- Mutators (each returns whether the selection changed) ---

    pub fn set_game(&mut self, game: Choice<String>) -> bool {
        Self::replace(&mut self.selection.game, game)
    }

    pub fn set_region(&mut self, region: Choice<String>) -> bool {
        Self::replace(&mut self.selection.region, region)
    }

    pub fn set_tier(&mut self, tier: Choice<Tier>) -> bool {
        Self::replace(&mut self.selection.tier, tier)
    }

    pub fn set_date_range(&mut self, range: DateRange) -> bool {
        Self::replace(&mut self.selection.date_range, range)
    }

    pub fn set_search(&mut self, search: impl Into<String>) -> bool {
        Self::replace(&mut self.selection.search, search.into())
    }

    pub fn reset(&mut self) -> bool {
        Self::replace(&mut self.selection, FilterSelection::default())
    }

    /// Swap in a freshly derived event set from a completed fetch
    pub fn replace_events(&mut self, events: Vec<ResolvedEvent>) {
        self.events = events;
    }

    pub fn all_events(&self) -> &[ResolvedEvent] {
        &self.events
    }

    // --- Derived views ---

    pub fn visible(&self) -> Vec<&ResolvedEvent> {
        self.events
            .iter()
            .filter(|event| self.selection.matches(event, self.today))
            .collect()
    }

    pub fn events_on(&self, date: NaiveDate) -> Vec<&ResolvedEvent> {
        self.visible()
            .into_iter()
            .filter(|event| event.date() == Some(date))
            .collect()
    }

    /// Visible resolved events keyed by date; unresolved ones are left out
    pub fn visible_by_date(&self) -> BTreeMap<NaiveDate, Vec<&ResolvedEvent>> {
        let mut by_date: BTreeMap<NaiveDate, Vec<&ResolvedEvent>> = BTreeMap::new();
        for event in self.visible() {
            if let Some(date) = event.date() {
                by_date.entry(date).or_default().push(event);
            }
        }
        by_date
    }

    pub fn visible_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<&ResolvedEvent> {
        self.visible()
            .into_iter()
            .filter(|event| event.date().is_some_and(|d| from <= d && d <= to))
            .collect()
    }

    fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateResolution, DateSource, TournamentRecord};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn event(id: &str, game: &str, region: &str, tier: Tier, on: Option<NaiveDate>) -> ResolvedEvent {
        ResolvedEvent {
            record: TournamentRecord {
                id: id.to_string(),
                title: format!("{game} Cup"),
                game: Some(game.to_string()),
                region: Some(region.to_string()),
                tier: Some(tier),
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

    fn ids(events: &[&ResolvedEvent]) -> Vec<String> {
        events.iter().map(|e| e.id().to_string()).collect()
    }

    fn sample_state() -> FilterState {
        let mut state = FilterState::new(date(2026, 1, 29));
        state.replace_events(vec![
            event("A", "Valorant", "India", Tier::Tier1, Some(date(2026, 1, 29))),
            event("B", "BGMI", "India", Tier::Tier2, Some(date(2026, 1, 30))),
            event("C", "Free Fire", "SEA", Tier::Tier3, Some(date(2026, 2, 2))),
            event("D", "Valorant", "APAC", Tier::Tier1, None),
        ]);
        state
    }

    #[test]
    fn filters_are_conjunctive() {
        let mut state = sample_state();
        state.set_game(Choice::Only("Valorant".to_string()));
        state.set_region(Choice::Only("India".to_string()));

        assert_eq!(ids(&state.visible()), vec!["A"]);
    }

    #[test]
    fn mutating_one_axis_keeps_the_others() {
        let mut state = sample_state();
        state.set_region(Choice::Only("India".to_string()));
        state.set_tier(Choice::Only(Tier::Tier2));
        state.set_search("bgmi");

        assert_eq!(state.selection().region, Choice::Only("India".to_string()));
        assert_eq!(ids(&state.visible()), vec!["B"]);
    }

    #[test]
    fn unchanged_values_report_no_change() {
        let mut state = sample_state();
        assert!(state.set_search("val"));
        assert!(!state.set_search("val"));
        assert!(!state.set_game(Choice::All));
    }

    #[test]
    fn unresolved_events_stay_in_flat_list_but_not_on_days() {
        let state = sample_state();

        assert_eq!(state.visible().len(), 4);
        assert_eq!(ids(&state.events_on(date(2026, 1, 29))), vec!["A"]);
        let placed: usize = state.visible_by_date().values().map(Vec::len).sum();
        assert_eq!(placed, 3);
    }

    #[test]
    fn date_range_uses_resolved_dates() {
        let mut state = sample_state();
        state.set_date_range(DateRange::ThisMonth);
        assert_eq!(ids(&state.visible()), vec!["A", "B"]);
    }
}
