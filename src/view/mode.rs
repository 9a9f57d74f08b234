use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::calendar::grid::{first_of_month, next_month, previous_month};
use crate::calendar::{CalendarCell, MonthGrid, month_grid};
use crate::domain::ResolvedEvent;
use crate::filter::FilterState;

/// Presentation mode of the calendar page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
    Timeline,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Grid, ViewMode::List, ViewMode::Timeline];

    /// Grid → List → Timeline → Grid
    pub fn next(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Timeline,
            ViewMode::Timeline => ViewMode::Grid,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
            ViewMode::Timeline => "timeline",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewMode::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown view '{}' (expected grid, list or timeline)", s))
    }
}

/// What a mode shows, derived from the shared filtered event set
#[derive(Debug)]
pub enum ViewContent<'a> {
    Grid {
        weeks: Vec<[CalendarCell; 7]>,
        by_date: BTreeMap<NaiveDate, Vec<&'a ResolvedEvent>>,
    },
    /// Every visible event, undated ones included
    List(Vec<&'a ResolvedEvent>),
    Timeline(BTreeMap<NaiveDate, Vec<&'a ResolvedEvent>>),
}

impl ViewContent<'_> {
    /// Ids of every event this content would render
    pub fn event_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = match self {
            ViewContent::Grid { by_date, .. } | ViewContent::Timeline(by_date) => by_date
                .values()
                .flat_map(|events| events.iter().map(|e| e.id()))
                .collect(),
            ViewContent::List(events) => events.iter().map(|e| e.id()).collect(),
        };
        ids.sort_unstable();
        ids
    }
}

/// Calendar page state: mode, focused month and selected day.
///
/// Holds no events of its own; everything shown is read from a
/// [`FilterState`], so changing mode or month never needs a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarView {
    mode: ViewMode,
    focused_month: NaiveDate,
    selected_date: NaiveDate,
    today: NaiveDate,
}

impl CalendarView {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            mode: ViewMode::default(),
            focused_month: first_of_month(today),
            selected_date: today,
            today,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    pub fn cycle_mode(&mut self) -> ViewMode {
        self.mode = self.mode.next();
        self.mode
    }

    pub fn focused_month(&self) -> NaiveDate {
        self.focused_month
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Select a day; the focused month follows the selection
    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
        self.focused_month = first_of_month(date);
    }

    pub fn show_previous_month(&mut self) {
        self.focused_month = previous_month(self.focused_month);
    }

    pub fn show_next_month(&mut self) {
        self.focused_month = next_month(self.focused_month);
    }

    pub fn show_today(&mut self) {
        self.select_date(self.today);
    }

    pub fn grid(&self) -> MonthGrid {
        month_grid(self.focused_month)
    }

    pub fn events_for_selected<'a>(&self, state: &'a FilterState) -> Vec<&'a ResolvedEvent> {
        state.events_on(self.selected_date)
    }

    /// Content for the current mode
    pub fn content<'a>(&self, state: &'a FilterState) -> ViewContent<'a> {
        match self.mode {
            ViewMode::Grid => {
                let grid = self.grid();
                let by_date = match (grid.first_day(), grid.last_day()) {
                    (Some(first), Some(last)) => group_by_date(state.visible_between(first, last)),
                    _ => BTreeMap::new(),
                };
                ViewContent::Grid {
                    weeks: grid.cells(self.today),
                    by_date,
                }
            }
            ViewMode::List => ViewContent::List(state.visible()),
            ViewMode::Timeline => ViewContent::Timeline(state.visible_by_date()),
        }
    }
}

fn group_by_date(events: Vec<&ResolvedEvent>) -> BTreeMap<NaiveDate, Vec<&ResolvedEvent>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&ResolvedEvent>> = BTreeMap::new();
    for event in events {
        if let Some(date) = event.date() {
            by_date.entry(date).or_default().push(event);
        }
    }
    by_date
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn modes_cycle_through_all_three() {
        let mut view = CalendarView::new(date(2026, 1, 29));
        assert_eq!(view.mode(), ViewMode::Grid);
        assert_eq!(view.cycle_mode(), ViewMode::List);
        assert_eq!(view.cycle_mode(), ViewMode::Timeline);
        assert_eq!(view.cycle_mode(), ViewMode::Grid);
    }

    #[test]
    fn month_navigation_crosses_years() {
        let mut view = CalendarView::new(date(2026, 1, 29));
        view.show_previous_month();
        assert_eq!(view.focused_month(), date(2025, 12, 1));
        view.show_next_month();
        view.show_next_month();
        assert_eq!(view.focused_month(), date(2026, 2, 1));
        assert_eq!(view.selected_date(), date(2026, 1, 29));
    }

    #[test]
    fn selecting_a_day_focuses_its_month() {
        let mut view = CalendarView::new(date(2026, 1, 29));
        view.select_date(date(2026, 3, 14));
        assert_eq!(view.focused_month(), date(2026, 3, 1));

        view.show_today();
        assert_eq!(view.selected_date(), date(2026, 1, 29));
        assert_eq!(view.focused_month(), date(2026, 1, 1));
    }

    #[test]
    fn view_mode_parses_names() {
        assert_eq!("Timeline".parse::<ViewMode>(), Ok(ViewMode::Timeline));
        assert!("agenda".parse::<ViewMode>().is_err());
    }
}
