//! Session state: who is logged in.

use serde::{Deserialize, Serialize};

use crate::store::PersistedState;

/// Profile of the authenticated user, as returned by the auth API.
///
/// Fields the client does not use are kept in `extra` so the profile is
/// persisted and restored verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UserProfile {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default)]
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    /// Creates a profile holding just an email address.
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    /// Returns true for the `admin` role.
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

/// Body of a successful login: `{ "data": <profile>, "token": "<jwt>" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub data: UserProfile,

    #[serde(default)]
    pub token: Option<String>,
}

/// Whether a user is logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Anonymous,
    Authenticated,
}

/// Persisted session: the user profile and access token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    user_data: Option<UserProfile>,

    #[serde(default)]
    user_token: Option<String>,
}

impl PersistedState for Session {
    fn storage_key() -> &'static str {
        "user-store"
    }
}

impl Session {
    pub fn user_data(&self) -> Option<&UserProfile> {
        self.user_data.as_ref()
    }

    pub fn user_token(&self) -> Option<&str> {
        self.user_token.as_deref()
    }

    /// Authenticated if and only if a non-empty token is held.
    pub fn is_authenticated(&self) -> bool {
        self.user_token().is_some_and(|token| !token.is_empty())
    }

    /// True for an authenticated user whose profile has the `admin` role.
    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.user_data().is_some_and(UserProfile::is_admin)
    }

    pub fn status(&self) -> SessionStatus {
        if self.is_authenticated() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Anonymous
        }
    }

    /// Stores the profile and token from an authentication response.
    #[must_use]
    pub fn set_user_data(&self, response: &LoginResponse) -> Self {
        Self {
            user_data: Some(response.data.clone()),
            user_token: response.token.clone(),
        }
    }

    /// Forgets the profile and token.
    #[must_use]
    pub fn clear_user_data(&self) -> Self {
        Self::default()
    }
}
