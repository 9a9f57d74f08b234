//! Calendar page modes and their terminal rendering.

mod mode;
mod render;

pub use mode::{CalendarView, ViewContent, ViewMode};
pub use render::{render_calendar, render_day_panel, render_list, render_stats};
