use log::warn;
use std::env;
use std::path::PathBuf;

pub const API_BASE_ENV: &str = "ESPORTS_API_BASE";
pub const SESSION_DIR_ENV: &str = "ESPORTS_SESSION_DIR";
pub const DEBOUNCE_ENV: &str = "ESPORTS_DEBOUNCE_MS";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub user_agent: &'static str,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            user_agent: "EsportsCalendar/0.1",
            timeout_secs: 30,
        }
    }
}

impl ApiSettings {
    /// Base URL without a trailing slash, ready for path joining
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub debounce_ms: u64,
    pub page_size: usize,
    pub max_pages: usize,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            page_size: 50,
            max_pages: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub storage_dir: PathBuf,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(".esports-calendar"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub refresh: RefreshSettings,
    pub session: SessionSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            api: ApiSettings::default(),
            refresh: RefreshSettings::default(),
            session: SessionSettings::default(),
        }
    }

    /// Defaults overlaid with whatever the environment provides
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(base_url) = env::var(API_BASE_ENV) {
            config.api.base_url = base_url;
        }
        if let Ok(dir) = env::var(SESSION_DIR_ENV) {
            config.session.storage_dir = PathBuf::from(dir);
        }
        if let Ok(raw) = env::var(DEBOUNCE_ENV) {
            match raw.parse() {
                Ok(ms) => config.refresh.debounce_ms = ms,
                Err(_) => warn!("Ignoring invalid {}: {}", DEBOUNCE_ENV, raw),
            }
        }

        config
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(base_url) = base_url {
            self.api.base_url = base_url;
        }
        self
    }
}
