//! Client-side form checks run before any write request is sent.

mod validation;

pub use validation::{FieldErrors, FormValidator};
