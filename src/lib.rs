pub mod api;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod debounce;
pub mod domain;
pub mod errors;
pub mod export;
pub mod filter;
pub mod forms;
pub mod http;
pub mod pagination;
pub mod services;
pub mod session;
pub mod view;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::TournamentApiClient;
use crate::calendar::CalendarClock;
use crate::cli::{Cli, ProfileAction};
use crate::config::settings::AppConfig;
use crate::domain::{Credentials, SignupForm};
use crate::export::ExportScope;
use crate::filter::{FilterSelection, FilterState, RefreshCoordinator};
use crate::services::{AccountService, BrowseSession, CalendarRequest, CalendarService, ProfileChanges};
use crate::session::{SessionStorage, SessionStore};
use crate::view::CalendarView;

pub fn interpret() -> Cli {
    Cli::parse()
}

pub fn load_config(api_base: Option<String>) -> AppConfig {
    AppConfig::from_env().with_base_url(api_base)
}

pub fn handle_calendar(config: AppConfig, request: CalendarRequest) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = calendar_service(config)?;
        println!("{}", service.show(request).await?);
        Ok(())
    })
}

pub fn handle_browse(config: AppConfig, selection: FilterSelection, output: PathBuf) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let refresh = config.refresh.clone();
        let service = calendar_service(config)?;
        let today = service.today();

        let coordinator = RefreshCoordinator::new(
            service.client(),
            service.resolver(),
            FilterState::with_selection(selection, today),
            refresh.debounce_ms,
            refresh.page_size,
        );
        BrowseSession::new(coordinator, CalendarView::new(today), output)
            .run()
            .await
    })
}

pub fn handle_list(config: AppConfig, selection: FilterSelection) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = calendar_service(config)?;
        print!("{}", service.list(selection).await?);
        Ok(())
    })
}

pub fn handle_stats(config: AppConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = calendar_service(config)?;
        print!("{}", service.stats().await?);
        Ok(())
    })
}

pub fn handle_export(
    config: AppConfig,
    selection: FilterSelection,
    month: Option<NaiveDate>,
    day: Option<NaiveDate>,
    output: &Path,
) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = calendar_service(config)?;
        let scope = match (day, month) {
            (Some(day), _) => ExportScope::Day(day),
            (None, Some(month)) => ExportScope::Calendar(month),
            (None, None) => ExportScope::Calendar(service.today()),
        };
        let path = service.export(selection, scope, output).await?;
        println!("Saved {}", path.display());
        Ok(())
    })
}

pub fn handle_login(config: AppConfig, credentials: Credentials) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = account_service(config)?;
        println!("{}", service.login(credentials).await?);
        Ok(())
    })
}

pub fn handle_signup(config: AppConfig, form: SignupForm) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = account_service(config)?;
        println!("{}", service.signup(form).await?);
        Ok(())
    })
}

pub fn handle_logout(config: AppConfig) -> Result<()> {
    let service = account_service(config)?;
    println!("{}", service.logout()?);
    Ok(())
}

pub fn handle_profile(config: AppConfig, action: ProfileAction) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = account_service(config)?;
        match action {
            ProfileAction::Show => {
                let user = service.profile().await?;
                println!("{}", serde_json::to_string_pretty(&user)?);
            }
            ProfileAction::Update {
                display_name,
                bio,
                games,
                career_history,
                organization,
            } => {
                let changes = ProfileChanges {
                    display_name,
                    bio,
                    games,
                    career_history,
                    organization,
                };
                let user = service.update_profile(changes).await?;
                println!("Saved profile for {}", user.display_label());
            }
            ProfileAction::Delete { yes } => {
                if !yes {
                    bail!("Refusing to delete the account without --yes");
                }
                println!("{}", service.delete_account().await?);
            }
        }
        Ok(())
    })
}

pub fn handle_register(config: AppConfig, tournament_id: &str) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = account_service(config)?;
        println!("{}", service.register(tournament_id).await?);
        Ok(())
    })
}

pub fn handle_subscribe(config: AppConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = account_service(config)?;
        println!("{}", service.subscribe().await?);
        Ok(())
    })
}

pub fn handle_submit(config: AppConfig, file: &Path) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = account_service(config)?;
        println!("{}", service.submit(file).await?);
        Ok(())
    })
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}

// --- Wiring ---

fn open_session(config: &AppConfig) -> Result<Arc<SessionStore>> {
    let storage = SessionStorage::new(&config.session.storage_dir)?;
    Ok(Arc::new(SessionStore::open(storage)))
}

fn api_client(config: &AppConfig, session: Arc<SessionStore>) -> Result<Arc<TournamentApiClient>> {
    let client = TournamentApiClient::new(config.api.clone())?.with_session(session);
    Ok(Arc::new(client))
}

fn calendar_service(config: AppConfig) -> Result<CalendarService> {
    let session = open_session(&config)?;
    let client = api_client(&config, session)?;
    CalendarService::new(config, client, CalendarClock::local())
}

fn account_service(config: AppConfig) -> Result<AccountService> {
    let session = open_session(&config)?;
    let client = api_client(&config, Arc::clone(&session))?;
    AccountService::new(client, session)
}
