use anyhow::{Result, bail};
use chrono::NaiveDate;
use log::{debug, warn};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use super::calendar::write_export;
use crate::api::TournamentSource;
use crate::calendar::parse_day;
use crate::config::catalog;
use crate::domain::Tier;
use crate::export::ExportScope;
use crate::filter::{Choice, DateRange, FilterState, RefreshCoordinator};
use crate::view::{CalendarView, ViewMode, render_calendar};

pub const BROWSE_HELP: &str = "\
Commands:
  search <text>          filter by title, game or organizer (empty clears)
  game <name|all>        region <name|all>        tier <1|2|3|all>
  range <all|today|this-week|this-month|YYYY-MM-DD..YYYY-MM-DD>
  reset                  clear every filter
  view <grid|list|timeline>, cycle
  prev, next, today, select <YYYY-MM-DD>
  export [day]           write an .ics file for the month or the selected day
  refresh, help, quit";

/// One line of input in the interactive calendar
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    Search(String),
    Game(Choice<String>),
    Region(Choice<String>),
    Tier(Choice<Tier>),
    Range(DateRange),
    Reset,
    View(ViewMode),
    Cycle,
    PreviousMonth,
    NextMonth,
    Today,
    Select(NaiveDate),
    Export { day: bool },
    Refresh,
    Help,
    Quit,
}

impl BrowseCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "search" | "s" => BrowseCommand::Search(rest.to_string()),
            "game" => BrowseCommand::Game(Choice::text(rest)),
            "region" => BrowseCommand::Region(Choice::text(rest)),
            "tier" => BrowseCommand::Tier(rest.parse().map_err(anyhow::Error::msg)?),
            "range" => BrowseCommand::Range(rest.parse().map_err(anyhow::Error::msg)?),
            "reset" => BrowseCommand::Reset,
            "view" => BrowseCommand::View(rest.parse().map_err(anyhow::Error::msg)?),
            "cycle" => BrowseCommand::Cycle,
            "prev" | "p" => BrowseCommand::PreviousMonth,
            "next" | "n" => BrowseCommand::NextMonth,
            "today" => BrowseCommand::Today,
            "select" => BrowseCommand::Select(parse_day(rest).map_err(anyhow::Error::msg)?),
            "export" => BrowseCommand::Export {
                day: rest.eq_ignore_ascii_case("day"),
            },
            "refresh" | "r" => BrowseCommand::Refresh,
            "help" | "?" => BrowseCommand::Help,
            "quit" | "exit" | "q" => BrowseCommand::Quit,
            "" => bail!("Empty command"),
            other => bail!("Unknown command '{}', type help for a list", other),
        };
        Ok(command)
    }
}

/// What the caller should do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseOutcome {
    Render(String),
    Message(String),
    Quit,
}

enum Input {
    Line(Option<String>),
    Refreshed(bool),
}

/// Interactive calendar page driven by line commands.
///
/// Filter commands go through the debounced, sequenced refresh and return
/// straight away; the page is redrawn once the last pending fetch lands.
/// View and navigation commands only re-render the events already held.
pub struct BrowseSession<S: TournamentSource> {
    coordinator: RefreshCoordinator<S>,
    view: CalendarView,
    export_dir: PathBuf,
    pending: Option<JoinHandle<bool>>,
}

impl<S: TournamentSource> BrowseSession<S> {
    pub fn new(coordinator: RefreshCoordinator<S>, view: CalendarView, export_dir: PathBuf) -> Self {
        Self {
            coordinator,
            view,
            export_dir,
            pending: None,
        }
    }

    pub fn view(&self) -> &CalendarView {
        &self.view
    }

    pub fn coordinator(&self) -> &RefreshCoordinator<S> {
        &self.coordinator
    }

    /// Initial load, then render
    pub async fn start(&self) -> Result<String> {
        self.coordinator.refresh_now().await?;
        Ok(self.render())
    }

    pub fn render(&self) -> String {
        self.coordinator.with_state(|state| render_calendar(&self.view, state))
    }

    /// True while a scheduled refetch is held and not yet waited on
    pub fn is_refreshing(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait for the pending refetch; the new page if it ran
    pub async fn settle(&mut self) -> Result<Option<String>> {
        let Some(handle) = self.pending.take() else {
            return Ok(None);
        };
        Ok(handle.await?.then(|| self.render()))
    }

    pub async fn apply(&mut self, command: BrowseCommand) -> Result<BrowseOutcome> {
        debug!("Browse command: {:?}", command);

        match command {
            BrowseCommand::Search(text) => self.filter(|state| state.set_search(text)),
            BrowseCommand::Game(game) => {
                if let Choice::Only(name) = &game {
                    if !catalog::is_known_game(name) {
                        warn!("{} is not one of the listed games", name);
                    }
                }
                self.filter(|state| state.set_game(game))
            }
            BrowseCommand::Region(region) => {
                if let Choice::Only(name) = &region {
                    if !catalog::is_known_region(name) {
                        warn!("{} is not one of the listed regions", name);
                    }
                }
                self.filter(|state| state.set_region(region))
            }
            BrowseCommand::Tier(tier) => self.filter(|state| state.set_tier(tier)),
            BrowseCommand::Range(range) => self.filter(|state| state.set_date_range(range)),
            BrowseCommand::Reset => self.filter(FilterState::reset),
            BrowseCommand::View(mode) => {
                self.view.set_mode(mode);
                Ok(BrowseOutcome::Render(self.render()))
            }
            BrowseCommand::Cycle => {
                self.view.cycle_mode();
                Ok(BrowseOutcome::Render(self.render()))
            }
            BrowseCommand::PreviousMonth => {
                self.view.show_previous_month();
                Ok(BrowseOutcome::Render(self.render()))
            }
            BrowseCommand::NextMonth => {
                self.view.show_next_month();
                Ok(BrowseOutcome::Render(self.render()))
            }
            BrowseCommand::Today => {
                self.view.show_today();
                Ok(BrowseOutcome::Render(self.render()))
            }
            BrowseCommand::Select(date) => {
                self.view.select_date(date);
                Ok(BrowseOutcome::Render(self.render()))
            }
            BrowseCommand::Export { day } => {
                let scope = if day {
                    ExportScope::Day(self.view.selected_date())
                } else {
                    ExportScope::Calendar(self.view.focused_month())
                };
                let path = self
                    .coordinator
                    .with_state(|state| write_export(state, scope, &self.export_dir))?;
                Ok(BrowseOutcome::Message(format!("Saved {}", path.display())))
            }
            BrowseCommand::Refresh => {
                self.coordinator.refresh_now().await?;
                Ok(BrowseOutcome::Render(self.render()))
            }
            BrowseCommand::Help => Ok(BrowseOutcome::Message(BROWSE_HELP.to_string())),
            BrowseCommand::Quit => Ok(BrowseOutcome::Quit),
        }
    }

    /// Read commands from stdin until quit or end of input
    pub async fn run(mut self) -> Result<()> {
        println!("{}", self.start().await?);
        println!("Type help for commands.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let mut pending = self.pending.take();
            let input = tokio::select! {
                line = lines.next_line() => Input::Line(line?),
                fired = wait_for(&mut pending) => Input::Refreshed(fired),
            };
            if let Input::Line(_) = input {
                self.pending = pending;
            }

            let line = match input {
                Input::Line(Some(line)) => line,
                Input::Line(None) => break,
                Input::Refreshed(true) => {
                    println!("{}", self.render());
                    continue;
                }
                Input::Refreshed(false) => continue,
            };
            if line.trim().is_empty() {
                continue;
            }
            let command = match BrowseCommand::parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    eprintln!("{}", e);
                    continue;
                }
            };

            match self.apply(command).await {
                Ok(BrowseOutcome::Render(page)) => println!("{}", page),
                Ok(BrowseOutcome::Message(message)) => println!("{}", message),
                Ok(BrowseOutcome::Quit) => break,
                Err(e) => eprintln!("Error: {:#}", e),
            }
        }
        Ok(())
    }

    fn filter(&mut self, mutate: impl FnOnce(&mut FilterState) -> bool) -> Result<BrowseOutcome> {
        match self.coordinator.update(mutate) {
            Some(handle) => {
                // A superseded handle resolves to false on its own
                self.pending = Some(handle);
                Ok(BrowseOutcome::Message("Refreshing...".to_string()))
            }
            None => Ok(BrowseOutcome::Render(self.render())),
        }
    }
}

/// Resolves with the debounced refetch, or never when none is pending
async fn wait_for(pending: &mut Option<JoinHandle<bool>>) -> bool {
    match pending {
        Some(handle) => handle.await.unwrap_or(false),
        None => std::future::pending().await,
    }
}
