use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::calendar::grid::{check_supported, first_of_month, parse_day};
use crate::domain::Tier;
use crate::filter::{Choice, DateRange, FilterSelection};
use crate::view::ViewMode;

#[derive(Parser, Debug)]
#[command(name = "esports-calendar", author, version, about = "Esports tournament calendar client")]
pub struct Cli {
    /// Tournament API base URL (overrides ESPORTS_API_BASE)
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

/// Filter flags shared by every listing command
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct FilterArgs {
    /// Game title, e.g. Valorant
    #[arg(long)]
    pub game: Option<String>,

    /// Region, e.g. India
    #[arg(long)]
    pub region: Option<String>,

    /// Tier 1, Tier 2 or Tier 3
    #[arg(long)]
    pub tier: Option<Tier>,

    /// today, this-week, this-month or YYYY-MM-DD..YYYY-MM-DD
    #[arg(long = "range")]
    pub date_range: Option<DateRange>,

    /// Case-insensitive text matched against title, game and organizer
    #[arg(long, short)]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            game: self.game.as_deref().map(Choice::<String>::text).unwrap_or_default(),
            region: self.region.as_deref().map(Choice::<String>::text).unwrap_or_default(),
            tier: self.tier.map(Choice::Only).unwrap_or_default(),
            date_range: self.date_range.unwrap_or_default(),
            search: self.search.clone().unwrap_or_default(),
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Show the tournament calendar for a month
    Calendar {
        #[command(flatten)]
        filters: FilterArgs,

        /// Month to show (YYYY-MM), defaults to the current month
        #[arg(long, short, value_parser = parse_month)]
        month: Option<NaiveDate>,

        /// grid, list or timeline
        #[arg(long, short, default_value = "grid")]
        view: ViewMode,

        /// Day whose tournaments are listed beside the grid; its month is shown
        #[arg(long, value_parser = parse_day, conflicts_with = "month")]
        date: Option<NaiveDate>,
    },
    /// Interactive calendar; filters refetch as you change them
    Browse {
        #[command(flatten)]
        filters: FilterArgs,

        /// Directory for .ics files written with `export`
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
    },
    /// List matching tournaments, undated ones included
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show platform statistics
    Stats,
    /// Write an iCalendar (.ics) file for a month or a single day
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Month to export (YYYY-MM), defaults to the current month
        #[arg(long, short, value_parser = parse_month, conflicts_with = "day")]
        month: Option<NaiveDate>,

        /// Export only this day (YYYY-MM-DD)
        #[arg(long, value_parser = parse_day)]
        day: Option<NaiveDate>,

        /// Output directory
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
    },
    /// Sign in and cache the session
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Organization (optional)
        #[arg(long)]
        org: Option<String>,
    },
    /// Forget the cached session
    Logout,
    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
    /// Register interest in a tournament
    Register {
        /// Tournament id
        tournament_id: String,
    },
    /// Subscribe to tournament notifications
    Subscribe,
    /// Submit a new tournament from a JSON file
    Submit {
        /// Path to the submission form (camelCase JSON fields)
        file: PathBuf,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum ProfileAction {
    Show,
    Update {
        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        bio: Option<String>,

        /// Games you play, comma separated
        #[arg(long)]
        games: Option<String>,

        #[arg(long)]
        career_history: Option<String>,

        #[arg(long)]
        organization: Option<String>,
    },
    /// Delete the account and sign out
    Delete {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Accepts YYYY-MM or a full date; yields the first of that month
fn parse_month(raw: &str) -> Result<NaiveDate, String> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d"))
        .map_err(|_| format!("expected YYYY-MM, got '{}'", raw))?;
    check_supported(first_of_month(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn calendar_flags_become_a_selection() {
        let cli = Cli::try_parse_from([
            "esports-calendar",
            "calendar",
            "--game",
            "Valorant",
            "--tier",
            "tier 1",
            "--range",
            "this-week",
            "--month",
            "2026-02",
            "--view",
            "timeline",
        ])
        .expect("parses");

        let Command::Calendar { filters, month, view, .. } = cli.command else {
            panic!("expected calendar command");
        };
        let selection = filters.selection();

        assert_eq!(selection.game, Choice::Only("Valorant".to_string()));
        assert_eq!(selection.region, Choice::All);
        assert_eq!(selection.tier, Choice::Only(Tier::Tier1));
        assert_eq!(selection.date_range, DateRange::ThisWeek);
        assert_eq!(month, NaiveDate::from_ymd_opt(2026, 2, 1));
        assert_eq!(view, ViewMode::Timeline);
    }

    #[test]
    fn export_month_and_day_conflict() {
        let parsed = Cli::try_parse_from([
            "esports-calendar",
            "export",
            "--month",
            "2026-01",
            "--day",
            "2026-01-29",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn calendar_date_and_month_conflict() {
        let parsed = Cli::try_parse_from([
            "esports-calendar",
            "calendar",
            "--month",
            "2026-03",
            "--date",
            "2026-01-29",
        ]);
        assert!(parsed.is_err());

        let cli = Cli::try_parse_from(["esports-calendar", "calendar", "--date", "2026-01-29"])
            .expect("parses");
        let Command::Calendar { date, month, .. } = cli.command else {
            panic!("expected calendar command");
        };
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 1, 29));
        assert_eq!(month, None);
    }

    #[test]
    fn out_of_range_years_rejected() {
        for args in [
            ["esports-calendar", "calendar", "--date", "+262142-12-15"],
            ["esports-calendar", "calendar", "--month", "+262142-12"],
            ["esports-calendar", "export", "--day", "+262142-12-15"],
        ] {
            assert!(Cli::try_parse_from(args).is_err(), "{args:?} should be rejected");
        }
    }

    #[test]
    fn api_base_is_global() {
        let cli = Cli::try_parse_from(["esports-calendar", "stats", "--api-base", "http://api.test"])
            .expect("parses");
        assert_eq!(cli.api_base.as_deref(), Some("http://api.test"));
        assert_eq!(cli.command, Command::Stats);
    }
}
