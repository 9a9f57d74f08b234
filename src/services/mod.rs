pub mod account;
pub mod browse;
pub mod calendar;

pub use account::{AccountService, ProfileChanges};
pub use browse::{BrowseCommand, BrowseOutcome, BrowseSession};
pub use calendar::{CalendarRequest, CalendarService};
