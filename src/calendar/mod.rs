pub mod clock;
pub mod grid;
pub mod resolver;

pub use clock::{CalendarClock, ClockZone};
pub use grid::{CalendarCell, MonthGrid, SUPPORTED_YEARS, month_grid, parse_day};
pub use resolver::{DateStrategy, EventDateResolver, StrategyOutcome};
