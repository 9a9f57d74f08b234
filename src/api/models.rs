use serde::Serialize;

use crate::domain::UserProfile;

/// Body of `PUT /users/{id}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate<'a> {
    pub display_name: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub games: Option<&'a str>,
    pub career_history: Option<&'a str>,
    pub organization: Option<&'a str>,
}

impl<'a> From<&'a UserProfile> for ProfileUpdate<'a> {
    fn from(user: &'a UserProfile) -> Self {
        Self {
            display_name: user.display_name.as_deref(),
            bio: user.bio.as_deref(),
            games: user.games.as_deref(),
            career_history: user.career_history.as_deref(),
            organization: user.organization.as_deref(),
        }
    }
}
