use serde_json::Value;

use crate::domain::{Session, UserProfile, normalize_user};

const TOKEN_FIELDS: &[&str] = &["token", "accessToken", "authToken"];

/// Parse a login/signup response into a session.
///
/// The token may sit under several names and the user object is either
/// nested under `user` or is the body itself.
pub fn parse_auth_response(data: &Value) -> Option<Session> {
    let token = extract_token(data);
    let user = extract_user(data);

    if token.is_none() && user.is_none() {
        return None;
    }

    Some(Session {
        token,
        user: user.unwrap_or_default(),
    })
}

fn extract_token(data: &Value) -> Option<String> {
    TOKEN_FIELDS
        .iter()
        .find_map(|field| data.get(*field)?.as_str())
        .map(str::to_string)
}

fn extract_user(data: &Value) -> Option<UserProfile> {
    let candidate = match data.get("user") {
        Some(user) if user.is_object() => user,
        _ => data,
    };
    normalize_user(candidate).filter(is_identified)
}

fn is_identified(user: &UserProfile) -> bool {
    user.id.is_some() || user.username.is_some() || user.email.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_user_with_access_token() {
        let session = parse_auth_response(&json!({
            "accessToken": "abc",
            "user": { "_id": "u1", "email": "rin@example.com" }
        }))
        .expect("session");

        assert_eq!(session.token.as_deref(), Some("abc"));
        assert_eq!(session.user.id.as_deref(), Some("u1"));
    }

    #[test]
    fn body_is_the_user() {
        let session = parse_auth_response(&json!({ "id": 3, "username": "kai", "authToken": "t" }))
            .expect("session");

        assert_eq!(session.user.username.as_deref(), Some("kai"));
        assert_eq!(session.token.as_deref(), Some("t"));
    }

    #[test]
    fn token_only_body_has_anonymous_user() {
        let session = parse_auth_response(&json!({ "token": "t" })).expect("session");
        assert_eq!(session.user, UserProfile::default());
    }

    #[test]
    fn empty_body_is_no_session() {
        assert!(parse_auth_response(&json!({})).is_none());
        assert!(parse_auth_response(&Value::Null).is_none());
    }
}
