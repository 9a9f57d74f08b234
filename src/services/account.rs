use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::api::TournamentApiClient;
use crate::domain::{Credentials, EventSubmission, SignupForm, UserProfile};
use crate::errors::ClientError;
use crate::forms::{FieldErrors, FormValidator};
use crate::session::{SessionEvent, SessionStore};

/// Profile fields the user can edit; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub games: Option<String>,
    pub career_history: Option<String>,
    pub organization: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.bio.is_none()
            && self.games.is_none()
            && self.career_history.is_none()
            && self.organization.is_none()
    }

    pub fn apply_to(self, user: &mut UserProfile) {
        let fields = [
            (self.display_name, &mut user.display_name),
            (self.bio, &mut user.bio),
            (self.games, &mut user.games),
            (self.career_history, &mut user.career_history),
            (self.organization, &mut user.organization),
        ];
        for (change, slot) in fields {
            if let Some(value) = change {
                *slot = Some(value);
            }
        }
    }
}

/// Write side of the app: authentication, profile and submissions
pub struct AccountService {
    client: Arc<TournamentApiClient>,
    session: Arc<SessionStore>,
    validator: FormValidator,
}

impl AccountService {
    pub fn new(client: Arc<TournamentApiClient>, session: Arc<SessionStore>) -> Result<Self> {
        session.subscribe(|event| match event {
            SessionEvent::SignedIn(user) => info!("Session started for {}", user.display_label()),
            SessionEvent::SignedOut => info!("Session cleared"),
            SessionEvent::ProfileUpdated(user) => info!("Cached profile refreshed for {}", user.display_label()),
        });

        Ok(Self {
            client,
            session,
            validator: FormValidator::new()?,
        })
    }

    pub async fn login(&self, credentials: Credentials) -> Result<String> {
        self.validator.validate_login(&credentials).map_err(invalid_form)?;

        let session = self.client.login(&credentials).await.map_err(surface)?;
        let label = session.user.display_label();
        self.session.sign_in(session)?;
        Ok(format!("Signed in as {}", label))
    }

    pub async fn signup(&self, form: SignupForm) -> Result<String> {
        self.validator.validate_signup(&form).map_err(invalid_form)?;

        let session = self.client.signup(&form).await.map_err(surface)?;
        let label = session.user.display_label();
        self.session.sign_in(session)?;
        Ok(format!("Welcome, {}", label))
    }

    pub fn logout(&self) -> Result<String> {
        if !self.session.is_signed_in() {
            return Ok("Not signed in".to_string());
        }
        self.session.sign_out()?;
        Ok("Signed out".to_string())
    }

    /// Server copy of the profile; the cached one when the server can't be reached
    pub async fn profile(&self) -> Result<UserProfile> {
        let user_id = self.require_user_id()?;
        match self.client.fetch_user(&user_id).await {
            Ok(user) => Ok(user),
            Err(e) => {
                warn!("Showing cached profile, fetch failed: {}", e);
                self.session.user().context("No cached profile available")
            }
        }
    }

    pub async fn update_profile(&self, changes: ProfileChanges) -> Result<UserProfile> {
        if changes.is_empty() {
            return Err(anyhow!("Nothing to update"));
        }

        let user_id = self.require_user_id()?;
        let mut user = self.session.user().unwrap_or_default();
        changes.apply_to(&mut user);
        self.validator.validate_profile(&user).map_err(invalid_form)?;

        let saved = self.client.update_user(&user_id, &user).await.map_err(surface)?;
        self.session.update_user(saved.clone())?;
        Ok(saved)
    }

    pub async fn delete_account(&self) -> Result<String> {
        let user_id = self.require_user_id()?;
        self.client.delete_user(&user_id).await.map_err(surface)?;
        self.session.sign_out()?;
        Ok("Account deleted".to_string())
    }

    pub async fn register(&self, tournament_id: &str) -> Result<String> {
        let user_id = self.require_user_id()?;
        self.client
            .register_interest(tournament_id, &user_id)
            .await
            .map_err(surface)?;
        Ok(format!("Registered interest in tournament {}", tournament_id))
    }

    pub async fn subscribe(&self) -> Result<String> {
        let user_id = self.require_user_id()?;
        self.client.subscribe_notifications(&user_id).await.map_err(surface)?;
        Ok("Subscribed to tournament notifications".to_string())
    }

    pub async fn submit(&self, path: &Path) -> Result<String> {
        let submission = load_submission(path)?;
        self.validator.validate_submission(&submission).map_err(invalid_form)?;

        let created = self.client.submit_tournament(&submission).await.map_err(surface)?;
        Ok(match created {
            Some(record) if !record.id.is_empty() => format!("Submitted {} (id {})", record.title, record.id),
            _ => format!("Submitted {}", submission.name),
        })
    }

    fn require_user_id(&self) -> Result<String> {
        self.session
            .user_id()
            .context("You need to sign in first (esports-calendar login)")
    }
}

/// Read a submission form from a JSON file, starting from the form defaults
pub fn load_submission(path: &Path) -> Result<EventSubmission> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read submission file: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse submission file: {}", path.display()))?;

    let mut merged = serde_json::to_value(EventSubmission::new())?;
    if let (Some(target), Some(fields)) = (merged.as_object_mut(), value.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
    serde_json::from_value(merged).context("Submission fields must all be text")
}

fn surface(error: ClientError) -> anyhow::Error {
    warn!("Request failed: {}", error);
    anyhow!(error.user_message())
}

fn invalid_form(errors: FieldErrors) -> anyhow::Error {
    let lines: Vec<String> = errors
        .iter()
        .map(|(field, message)| format!("  {}: {}", field, message))
        .collect();
    anyhow!("Please fix the following:\n{}", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn changes_only_touch_given_fields() {
        let mut user = UserProfile {
            display_name: Some("Rin".to_string()),
            bio: Some("IGL".to_string()),
            ..UserProfile::default()
        };
        ProfileChanges {
            bio: Some("Coach".to_string()),
            ..ProfileChanges::default()
        }
        .apply_to(&mut user);

        assert_eq!(user.display_name.as_deref(), Some("Rin"));
        assert_eq!(user.bio.as_deref(), Some("Coach"));
    }

    #[test]
    fn submission_file_keeps_form_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("event.json");
        fs::write(&path, r#"{"name": "Winter Clash", "game": "BGMI", "startDate": "2026-12-01"}"#).expect("write");

        let submission = load_submission(&path).expect("loads");

        assert_eq!(submission.name, "Winter Clash");
        assert_eq!(submission.start_date, "2026-12-01");
        assert_eq!(submission.tier, "Tier 2");
        assert_eq!(submission.currency, "USD");
    }

    #[test]
    fn form_errors_list_every_field() {
        let mut errors = FieldErrors::default();
        errors.add("email", "Enter a valid email");
        errors.add("password", "Password is required");

        let message = invalid_form(errors).to_string();
        assert_eq!(
            message,
            "Please fix the following:\n  email: Enter a valid email\n  password: Password is required"
        );
    }

    #[test]
    fn server_message_reaches_the_user() {
        let err = surface(ClientError::Validation {
            message: "Email already registered".to_string(),
        });
        assert_eq!(err.to_string(), "Email already registered");
    }
}
