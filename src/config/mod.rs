pub mod catalog;
pub mod settings;

pub use settings::AppConfig;
