mod storage;
mod store;

pub use storage::SessionStorage;
pub use store::{SessionEvent, SessionStore, SubscriptionId};
