mod ics;

pub use ics::{ExportScope, export_ics};
