use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

use super::state::FilterState;
use crate::api::TournamentSource;
use crate::calendar::EventDateResolver;
use crate::debounce::Debouncer;
use crate::pagination::ListingQuery;

/// Monotonic request ids; only a newer response than the last applied one wins
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Claim the right to update state for `id`
    pub fn try_apply(&self, id: u64) -> bool {
        self.applied.fetch_max(id, Ordering::SeqCst) < id
    }

    pub fn last_applied(&self) -> u64 {
        self.applied.load(Ordering::SeqCst)
    }
}

/// Refetches the listing whenever the filter selection changes.
///
/// Changes are debounced; every fired request is sequenced so a slow,
/// superseded response can never overwrite newer results.
pub struct RefreshCoordinator<S: TournamentSource> {
    source: Arc<S>,
    resolver: Arc<EventDateResolver>,
    state: Arc<Mutex<FilterState>>,
    sequencer: Arc<RequestSequencer>,
    debouncer: Debouncer,
    page_size: usize,
}

impl<S: TournamentSource> RefreshCoordinator<S> {
    pub fn new(
        source: Arc<S>,
        resolver: Arc<EventDateResolver>,
        state: FilterState,
        debounce_ms: u64,
        page_size: usize,
    ) -> Self {
        Self {
            source,
            resolver,
            state: Arc::new(Mutex::new(state)),
            sequencer: Arc::new(RequestSequencer::new()),
            debouncer: Debouncer::new(debounce_ms),
            page_size,
        }
    }

    pub fn state(&self) -> Arc<Mutex<FilterState>> {
        Arc::clone(&self.state)
    }

    /// Run `read` against the current state without holding the lock afterwards
    pub fn with_state<R>(&self, read: impl FnOnce(&FilterState) -> R) -> R {
        read(&lock(&self.state))
    }

    /// Apply a filter mutation; a change schedules a debounced refetch
    pub fn update(&self, mutate: impl FnOnce(&mut FilterState) -> bool) -> Option<JoinHandle<bool>> {
        let changed = mutate(&mut lock(&self.state));
        if !changed {
            return None;
        }
        Some(self.schedule_refresh())
    }

    /// Debounced refetch; the query is read when the timer fires
    pub fn schedule_refresh(&self) -> JoinHandle<bool> {
        let source = Arc::clone(&self.source);
        let resolver = Arc::clone(&self.resolver);
        let state = Arc::clone(&self.state);
        let sequencer = Arc::clone(&self.sequencer);
        let page_size = self.page_size;

        self.debouncer.schedule(move || async move {
            let query = current_query(&state, page_size);
            let id = sequencer.issue();
            run_fetch(source, resolver, state, sequencer, query, id).await;
        })
    }

    /// Fetch immediately with the current selection (initial load)
    pub fn refresh_now(&self) -> JoinHandle<()> {
        let query = current_query(&self.state, self.page_size);
        let id = self.sequencer.issue();

        tokio::spawn(run_fetch(
            Arc::clone(&self.source),
            Arc::clone(&self.resolver),
            Arc::clone(&self.state),
            Arc::clone(&self.sequencer),
            query,
            id,
        ))
    }
}

async fn run_fetch<S: TournamentSource>(
    source: Arc<S>,
    resolver: Arc<EventDateResolver>,
    state: Arc<Mutex<FilterState>>,
    sequencer: Arc<RequestSequencer>,
    query: ListingQuery,
    id: u64,
) {
    debug!("Request #{} for page {}", id, query.page);

    let events = match source.fetch_page(query).await {
        Ok(page) => resolver.resolve_all(page.items),
        Err(e) => {
            warn!("Tournament fetch #{} failed, showing no results: {}", id, e);
            Vec::new()
        }
    };

    if sequencer.try_apply(id) {
        lock(&state).replace_events(events);
    } else {
        debug!("Discarding stale response #{}", id);
    }
}

fn current_query(state: &Mutex<FilterState>, page_size: usize) -> ListingQuery {
    let selection = lock(state).selection().clone();
    ListingQuery::new(selection, 0, page_size)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarClock;
    use crate::domain::{DateFields, DateValue, TournamentPage, TournamentRecord};
    use crate::errors::ClientError;
    use crate::filter::Choice;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::time::sleep;

    /// Records every query and answers with one record titled after the search
    #[derive(Default)]
    struct ScriptedSource {
        queries: Mutex<Vec<ListingQuery>>,
        fail: bool,
    }

    impl ScriptedSource {
        fn searches(&self) -> Vec<String> {
            self.queries
                .lock()
                .expect("lock")
                .iter()
                .map(|q| q.selection.search.clone())
                .collect()
        }
    }

    impl TournamentSource for ScriptedSource {
        async fn fetch_page(&self, query: ListingQuery) -> Result<TournamentPage, ClientError> {
            self.queries.lock().expect("lock").push(query.clone());
            if self.fail {
                return Err(ClientError::NotFound("/tournaments".to_string()));
            }
            if query.selection.search == "slow" {
                sleep(Duration::from_secs(2)).await;
            }

            let record = TournamentRecord {
                id: query.selection.search.clone(),
                title: query.selection.search.clone(),
                date_fields: DateFields::new().with("date", DateValue::Text("2026-02-15".to_string())),
                ..TournamentRecord::default()
            };
            Ok(TournamentPage {
                items: vec![record],
                total: 1,
                page: 0,
                size: query.size,
            })
        }
    }

    fn coordinator(source: Arc<ScriptedSource>) -> RefreshCoordinator<ScriptedSource> {
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid date");
        let resolver = EventDateResolver::new(CalendarClock::utc(today)).expect("resolver");
        RefreshCoordinator::new(source, Arc::new(resolver), FilterState::new(today), 300, 20)
    }

    fn visible_ids(coordinator: &RefreshCoordinator<ScriptedSource>) -> Vec<String> {
        coordinator.with_state(|state| state.visible().iter().map(|e| e.id().to_string()).collect())
    }

    #[tokio::test(start_paused = true)]
    async fn typing_burst_fetches_once_with_final_text() {
        let source = Arc::new(ScriptedSource::default());
        let coordinator = coordinator(Arc::clone(&source));

        let mut handles = Vec::new();
        for text in ["v", "va", "val", "valo", "valorant"] {
            handles.extend(coordinator.update(|state| state.set_search(text)));
            sleep(Duration::from_millis(40)).await;
        }
        for handle in handles {
            handle.await.expect("task completes");
        }

        assert_eq!(source.searches(), vec!["valorant"]);
        assert_eq!(visible_ids(&coordinator), vec!["valorant"]);
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_filter_does_not_refetch() {
        let source = Arc::new(ScriptedSource::default());
        let coordinator = coordinator(Arc::clone(&source));

        assert!(coordinator.update(|state| state.set_game(Choice::All)).is_none());
        sleep(Duration::from_secs(1)).await;
        assert!(source.searches().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_never_overwrites_newer_one() {
        let source = Arc::new(ScriptedSource::default());
        let coordinator = coordinator(Arc::clone(&source));

        lock(&coordinator.state()).set_search("slow");
        let slow = coordinator.refresh_now();
        lock(&coordinator.state()).set_search("fast");
        let fast = coordinator.refresh_now();

        fast.await.expect("fast completes");
        slow.await.expect("slow completes");

        let mut searches = source.searches();
        searches.sort();
        assert_eq!(searches, vec!["fast", "slow"]);
        assert_eq!(visible_ids(&coordinator), vec!["fast"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_degrades_to_empty_results() {
        let source = Arc::new(ScriptedSource {
            fail: true,
            ..ScriptedSource::default()
        });
        let coordinator = coordinator(Arc::clone(&source));

        coordinator.refresh_now().await.expect("task completes");

        assert!(visible_ids(&coordinator).is_empty());
        assert_eq!(source.searches().len(), 1);
    }

    #[test]
    fn sequencer_rejects_older_ids() {
        let sequencer = RequestSequencer::new();
        let first = sequencer.issue();
        let second = sequencer.issue();

        assert!(sequencer.try_apply(second));
        assert!(!sequencer.try_apply(first));
        assert_eq!(sequencer.last_applied(), second);
    }
}
