use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::TournamentApiClient;
use crate::calendar::grid::{first_of_month, last_of_month};
use crate::calendar::{CalendarClock, EventDateResolver};
use crate::config::AppConfig;
use crate::export::{ExportScope, export_ics};
use crate::filter::{FilterSelection, FilterState};
use crate::pagination::{ListingQuery, PaginationConfig};
use crate::view::{CalendarView, ViewMode, render_calendar, render_list, render_stats};

/// What the calendar page should show
#[derive(Debug, Clone, Default)]
pub struct CalendarRequest {
    pub selection: FilterSelection,
    pub mode: ViewMode,
    /// Any date in the month to display; defaults to the current month
    pub month: Option<NaiveDate>,
    pub selected: Option<NaiveDate>,
}

/// Read side of the app: listing, calendar, statistics and export
pub struct CalendarService {
    config: AppConfig,
    client: Arc<TournamentApiClient>,
    resolver: Arc<EventDateResolver>,
}

impl CalendarService {
    pub fn new(config: AppConfig, client: Arc<TournamentApiClient>, clock: CalendarClock) -> Result<Self> {
        let resolver = EventDateResolver::new(clock)?;
        Ok(Self {
            config,
            client,
            resolver: Arc::new(resolver),
        })
    }

    pub fn client(&self) -> Arc<TournamentApiClient> {
        Arc::clone(&self.client)
    }

    pub fn resolver(&self) -> Arc<EventDateResolver> {
        Arc::clone(&self.resolver)
    }

    pub fn today(&self) -> NaiveDate {
        self.resolver.clock().today()
    }

    /// Fetch every page for `selection` and derive a fresh filter state
    pub async fn load(&self, selection: FilterSelection) -> FilterState {
        let refresh = &self.config.refresh;
        let query = ListingQuery::new(selection.clone(), 0, refresh.page_size);
        let pagination = PaginationConfig::new(refresh.page_size).with_max_pages(refresh.max_pages);

        let records = self.client.fetch_all_tournaments(&query, pagination).await;
        let events = self.resolver.resolve_all(records);

        let unresolved = events.iter().filter(|e| !e.is_resolved()).count();
        if unresolved > 0 {
            info!("{} tournaments have no usable date and stay out of the calendar", unresolved);
        }

        let mut state = FilterState::with_selection(selection, self.today());
        state.replace_events(events);
        state
    }

    pub async fn show(&self, request: CalendarRequest) -> Result<String> {
        let state = self.load(request.selection.clone()).await;
        let view = self.view_for(&request);
        Ok(render_calendar(&view, &state))
    }

    pub async fn list(&self, selection: FilterSelection) -> Result<String> {
        let state = self.load(selection).await;
        Ok(render_list(&state.visible()))
    }

    pub async fn stats(&self) -> Result<String> {
        let stats = self.client.fetch_stats_or_default().await;
        Ok(render_stats(&stats))
    }

    /// Write an iCalendar file for `scope` into `output_dir`
    pub async fn export(&self, selection: FilterSelection, scope: ExportScope, output_dir: &Path) -> Result<PathBuf> {
        let state = self.load(selection).await;
        write_export(&state, scope, output_dir)
    }

    /// A selected day also focuses its month; the CLI never sends both
    pub fn view_for(&self, request: &CalendarRequest) -> CalendarView {
        let mut view = CalendarView::new(self.today());
        if let Some(month) = request.month {
            view.select_date(month);
        }
        if let Some(selected) = request.selected {
            view.select_date(selected);
        }
        view.set_mode(request.mode);
        view
    }
}

/// Serialize the events `scope` covers and write them under `output_dir`
pub fn write_export(state: &FilterState, scope: ExportScope, output_dir: &Path) -> Result<PathBuf> {
    let events = match scope {
        ExportScope::Calendar(month) => state.visible_between(first_of_month(month), last_of_month(month)),
        ExportScope::Day(day) => state.events_on(day),
    };

    let path = output_dir.join(scope.file_name());
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create export directory: {}", output_dir.display()))?;
    fs::write(&path, export_ics(events))
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;

    info!("Exported calendar to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateResolution, DateSource, ResolvedEvent, TournamentRecord};
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn event(id: &str, on: NaiveDate) -> ResolvedEvent {
        ResolvedEvent {
            record: TournamentRecord {
                id: id.to_string(),
                title: format!("Cup {id}"),
                ..TournamentRecord::default()
            },
            resolution: DateResolution::Resolved {
                date: on,
                source: DateSource {
                    field: "date".to_string(),
                    strategy: "iso-date",
                },
            },
        }
    }

    fn state() -> FilterState {
        let mut state = FilterState::new(date(2026, 1, 29));
        state.replace_events(vec![
            event("1", date(2026, 1, 29)),
            event("2", date(2026, 1, 30)),
            event("3", date(2026, 2, 2)),
        ]);
        state
    }

    #[test]
    fn month_export_covers_only_that_month() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_export(&state(), ExportScope::Calendar(date(2026, 1, 10)), dir.path()).expect("export");

        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("esports-calendar-2026-01.ics"));
        let doc = fs::read_to_string(path).expect("readable");
        assert_eq!(doc.matches("BEGIN:VEVENT").count(), 2);
    }

    #[test]
    fn day_export_covers_one_day() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_export(&state(), ExportScope::Day(date(2026, 2, 2)), dir.path()).expect("export");

        let doc = fs::read_to_string(path).expect("readable");
        assert_eq!(doc.matches("BEGIN:VEVENT").count(), 1);
        assert!(doc.contains("DTSTART;VALUE=DATE:20260202"));
    }
}
