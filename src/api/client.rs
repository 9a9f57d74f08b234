use anyhow::Result;
use log::{info, warn};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use super::models::ProfileUpdate;
use super::parsers::{parse_auth_response, parse_page};
use crate::config::settings::ApiSettings;
use crate::domain::{
    Credentials, EventSubmission, PlatformStats, Session, SignupForm, TournamentPage,
    TournamentRecord, UserProfile, normalize_stats, normalize_tournament, normalize_user,
};
use crate::errors::{ClientError, fetch_context};
use crate::http::ApiHttpClient;
use crate::pagination::{ListingQuery, PageIterator, PaginationConfig, build_url_with_params};
use crate::session::SessionStore;

/// Anything that can serve a page of the tournament listing
pub trait TournamentSource: Send + Sync + 'static {
    fn fetch_page(
        &self,
        query: ListingQuery,
    ) -> impl Future<Output = Result<TournamentPage, ClientError>> + Send;
}

/// Client for the tournament platform's HTTP API
pub struct TournamentApiClient {
    http: ApiHttpClient,
    settings: ApiSettings,
    session: Option<Arc<SessionStore>>,
}

impl TournamentApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self> {
        let http = ApiHttpClient::new(settings.user_agent, settings.timeout_secs)?;
        Ok(Self {
            http,
            settings,
            session: None,
        })
    }

    /// Attach the session store so requests carry the bearer token
    pub fn with_session(mut self, session: Arc<SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    // --- Read paths ---

    pub async fn fetch_tournaments(&self, query: &ListingQuery) -> Result<TournamentPage, ClientError> {
        let url = query.to_url(&self.settings.endpoint("tournaments"));
        let data = self.http.get(&url, self.token().as_deref()).await?;
        Ok(parse_page(&data, query.page, query.size))
    }

    /// Every page for `query`, up to the configured cap; failures end the walk
    pub async fn fetch_all_tournaments(
        &self,
        query: &ListingQuery,
        config: PaginationConfig,
    ) -> Vec<TournamentRecord> {
        let mut pages = PageIterator::new(config);
        let mut records = Vec::new();

        loop {
            if pages.has_reached_max() {
                break;
            }

            let page_query = ListingQuery {
                size: pages.page_size(),
                ..query.with_page(pages.current_page())
            };
            let page = match self.fetch_tournaments(&page_query).await {
                Ok(page) => page,
                Err(e) => {
                    let url = page_query.to_url(&self.settings.endpoint("tournaments"));
                    warn!("{}: {}", fetch_context(&url), e);
                    break;
                }
            };

            let has_more = page.has_more();
            records.extend(page.items);
            if !has_more {
                break;
            }
            pages.advance();
        }

        info!("Fetched {} tournaments", records.len());
        records
    }

    pub async fn fetch_stats(&self) -> Result<PlatformStats, ClientError> {
        let url = self.settings.endpoint("stats");
        let data = self.http.get(&url, self.token().as_deref()).await?;
        Ok(normalize_stats(&data))
    }

    /// Homepage statistics; failures degrade to zeroes
    pub async fn fetch_stats_or_default(&self) -> PlatformStats {
        self.fetch_stats().await.unwrap_or_else(|e| {
            warn!("Falling back to empty statistics: {}", e);
            PlatformStats::default()
        })
    }

    pub async fn fetch_user(&self, user_id: &str) -> Result<UserProfile, ClientError> {
        let url = self.user_url(user_id);
        let data = self.http.get(&url, self.token().as_deref()).await?;
        normalize_user(&data).ok_or_else(|| ClientError::Decode(format!("user {} is not an object", user_id)))
    }

    // --- Write paths ---

    pub async fn register_interest(&self, tournament_id: &str, user_id: &str) -> Result<(), ClientError> {
        let base = self
            .settings
            .endpoint(&format!("tournaments/{}/register", urlencoding::encode(tournament_id)));
        let url = build_url_with_params(&base, &[("userId", user_id.to_string())]);

        self.http.post::<Value>(&url, None, self.token().as_deref()).await?;
        info!("Registered user {} for tournament {}", user_id, tournament_id);
        Ok(())
    }

    pub async fn subscribe_notifications(&self, user_id: &str) -> Result<(), ClientError> {
        let base = self.settings.endpoint("notifications/subscribe");
        let url = build_url_with_params(&base, &[("userId", user_id.to_string())]);

        self.http.post::<Value>(&url, None, self.token().as_deref()).await?;
        info!("Subscribed user {} to notifications", user_id);
        Ok(())
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ClientError> {
        let url = self.settings.endpoint("users/login");
        let data = self.http.post(&url, Some(credentials), None).await?;
        Self::session_from(&data)
    }

    pub async fn signup(&self, form: &SignupForm) -> Result<Session, ClientError> {
        let url = self.settings.endpoint("users/signup");
        let data = self.http.post(&url, Some(form), None).await?;
        Self::session_from(&data)
    }

    /// Save profile edits, then reload the stored copy
    pub async fn update_user(&self, user_id: &str, user: &UserProfile) -> Result<UserProfile, ClientError> {
        let url = self.user_url(user_id);
        self.http
            .put(&url, &ProfileUpdate::from(user), self.token().as_deref())
            .await?;
        self.fetch_user(user_id).await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<(), ClientError> {
        let url = self.user_url(user_id);
        self.http.delete(&url, self.token().as_deref()).await?;
        info!("Deleted user {}", user_id);
        Ok(())
    }

    /// Submit an event; returns the created record when the server echoes it
    pub async fn submit_tournament(
        &self,
        submission: &EventSubmission,
    ) -> Result<Option<TournamentRecord>, ClientError> {
        let url = self.settings.endpoint("tournaments");
        let data = self
            .http
            .post(&url, Some(submission), self.token().as_deref())
            .await?;
        Ok(normalize_tournament(&data))
    }

    // --- Helper Methods ---

    fn token(&self) -> Option<String> {
        self.session.as_ref().and_then(|s| s.token())
    }

    fn user_url(&self, user_id: &str) -> String {
        self.settings
            .endpoint(&format!("users/{}", urlencoding::encode(user_id)))
    }

    fn session_from(data: &Value) -> Result<Session, ClientError> {
        parse_auth_response(data)
            .ok_or_else(|| ClientError::Decode("response carried neither token nor user".to_string()))
    }
}

impl TournamentSource for TournamentApiClient {
    async fn fetch_page(&self, query: ListingQuery) -> Result<TournamentPage, ClientError> {
        self.fetch_tournaments(&query).await
    }
}
