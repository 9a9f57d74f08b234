pub mod refresh;
pub mod selection;
pub mod state;

pub use refresh::{RefreshCoordinator, RequestSequencer};
pub use selection::{Choice, DateRange, FilterSelection};
pub use state::FilterState;
