use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeMap;

use crate::config::catalog;
use crate::domain::{Credentials, EventSubmission, SignupForm, Tier, UserProfile};

const MIN_PASSWORD_LEN: usize = 6;
const MAX_BIO_LEN: usize = 500;

/// Field name → message for every field that failed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    pub fn into_result(self) -> std::result::Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Client-side checks mirroring the server's form rules
pub struct FormValidator {
    email: Regex,
    url: Regex,
}

impl FormValidator {
    pub fn new() -> Result<Self> {
        let email = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").context("Failed to compile email regex")?;
        let url = Regex::new(r"^https?://[^\s/$.?#][^\s]*$").context("Failed to compile URL regex")?;
        Ok(Self { email, url })
    }

    pub fn validate_login(&self, credentials: &Credentials) -> std::result::Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        self.check_email(&mut errors, "email", &credentials.email, true);
        Self::check_password(&mut errors, &credentials.password);
        errors.into_result()
    }

    pub fn validate_signup(&self, form: &SignupForm) -> std::result::Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if form.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        self.check_email(&mut errors, "email", &form.email, true);
        Self::check_password(&mut errors, &form.password);
        errors.into_result()
    }

    pub fn validate_profile(&self, user: &UserProfile) -> std::result::Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if user.display_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            errors.add("displayName", "Display name cannot be blank");
        }
        if user.bio.as_deref().is_some_and(|b| b.chars().count() > MAX_BIO_LEN) {
            errors.add("bio", format!("Bio must be at most {} characters", MAX_BIO_LEN));
        }
        if let Some(email) = user.email.as_deref() {
            self.check_email(&mut errors, "email", email, false);
        }
        errors.into_result()
    }

    pub fn validate_submission(&self, form: &EventSubmission) -> std::result::Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        for (field, value, label) in [
            ("name", &form.name, "Event name"),
            ("game", &form.game, "Game title"),
            ("region", &form.region, "Region"),
            ("startDate", &form.start_date, "Start date"),
        ] {
            if value.trim().is_empty() {
                errors.add(field, format!("{} is required", label));
            }
        }

        if Tier::parse(&form.tier).is_none() {
            errors.add("tier", "Select Tier 1, Tier 2 or Tier 3");
        }

        let currency = form.currency.trim();
        if !currency.is_empty() && !catalog::CURRENCIES.iter().any(|known| *known == currency) {
            errors.add("currency", format!("Currency must be one of {}", catalog::CURRENCIES.join(", ")));
        }
        let platform = form.stream_platform.trim();
        if !platform.is_empty() && !catalog::STREAM_PLATFORMS.iter().any(|p| p.eq_ignore_ascii_case(platform)) {
            errors.add("streamPlatform", "Unknown streaming platform");
        }

        Self::check_dates(&mut errors, form);
        Self::check_max_participants(&mut errors, &form.max_participants);
        self.check_link(&mut errors, "regLink", &form.reg_link);
        self.check_link(&mut errors, "streamLink", &form.stream_link);
        self.check_email(&mut errors, "email", &form.email, false);

        errors.into_result()
    }

    // --- Helper Methods ---

    fn check_email(&self, errors: &mut FieldErrors, field: &'static str, email: &str, required: bool) {
        let email = email.trim();
        if email.is_empty() {
            if required {
                errors.add(field, "Email is required");
            }
        } else if !self.email.is_match(email) {
            errors.add(field, "Enter a valid email");
        }
    }

    fn check_password(errors: &mut FieldErrors, password: &str) {
        if password.is_empty() {
            errors.add("password", "Password is required");
        } else if password.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            );
        }
    }

    fn check_link(&self, errors: &mut FieldErrors, field: &'static str, link: &str) {
        let link = link.trim();
        if !link.is_empty() && !self.url.is_match(link) {
            errors.add(field, "Enter a valid http(s) link");
        }
    }

    fn check_dates(errors: &mut FieldErrors, form: &EventSubmission) {
        let start = Self::parse_form_date(errors, "startDate", &form.start_date);
        let end = Self::parse_form_date(errors, "endDate", &form.end_date);
        let deadline = Self::parse_form_date(errors, "regDeadline", &form.reg_deadline);

        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.add("endDate", "End date cannot be before the start date");
            }
        }
        if let (Some(start), Some(deadline)) = (start, deadline) {
            if deadline > start {
                errors.add("regDeadline", "Registration must close before the event starts");
            }
        }
    }

    fn parse_form_date(errors: &mut FieldErrors, field: &'static str, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add(field, "Use the YYYY-MM-DD format");
                None
            }
        }
    }

    fn check_max_participants(errors: &mut FieldErrors, raw: &str) {
        let raw = raw.trim();
        if raw.is_empty() {
            return;
        }
        match raw.parse::<u32>() {
            Ok(n) if n > 0 => {}
            _ => errors.add("maxParticipants", "Max participants must be a positive number"),
        }
    }
}
