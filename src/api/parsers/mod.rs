mod auth;
mod errors;
mod page;

pub use auth::parse_auth_response;
pub use errors::extract_error_message;
pub use page::parse_page;
