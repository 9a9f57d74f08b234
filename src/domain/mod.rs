pub mod models;
pub mod normalize;

pub use models::*;
pub use normalize::{normalize_stats, normalize_tournament, normalize_tournaments, normalize_user};
