mod config;
mod iterator;
mod urls;

pub use config::PaginationConfig;
pub use iterator::PageIterator;
pub use urls::{ListingQuery, build_url_with_params};
