use anyhow::Result;

use esports_calendar::cli::{Cli, Command, ProfileAction};
use esports_calendar::config::AppConfig;
use esports_calendar::domain::{Credentials, SignupForm};
use esports_calendar::services::CalendarRequest;
use esports_calendar::{
    handle_browse, handle_calendar, handle_completions, handle_export, handle_list, handle_login,
    handle_logout, handle_profile, handle_register, handle_signup, handle_stats, handle_submit,
    handle_subscribe, interpret, load_config,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let cli: Cli = interpret();
    let config = load_config(cli.api_base.clone());
    execute_command(cli.command, config)
}

fn execute_command(command: Command, config: AppConfig) -> Result<()> {
    match command {
        Command::Calendar {
            filters,
            month,
            view,
            date,
        } => handle_calendar(
            config,
            CalendarRequest {
                selection: filters.selection(),
                mode: view,
                month,
                selected: date,
            },
        ),
        Command::Browse { filters, output } => handle_browse(config, filters.selection(), output),
        Command::List { filters } => handle_list(config, filters.selection()),
        Command::Stats => handle_stats(config),
        Command::Export {
            filters,
            month,
            day,
            output,
        } => handle_export(config, filters.selection(), month, day, &output),
        Command::Login { email, password } => handle_login(config, Credentials { email, password }),
        Command::Signup {
            name,
            email,
            password,
            org,
        } => handle_signup(
            config,
            SignupForm {
                name,
                email,
                password,
                org,
            },
        ),
        Command::Logout => handle_logout(config),
        Command::Profile { action } => handle_profile(config, action.unwrap_or(ProfileAction::Show)),
        Command::Register { tournament_id } => handle_register(config, &tournament_id),
        Command::Subscribe => handle_subscribe(config),
        Command::Submit { file } => handle_submit(config, &file),
        Command::Completions { shell } => handle_completions(shell),
    }
}
