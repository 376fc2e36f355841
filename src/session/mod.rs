pub mod manager;
pub mod storage;
pub mod sync;

pub use manager::*;
pub use storage::*;
pub use sync::*;

use serde::{Deserialize, Serialize};

use crate::api::models::AuthResponse;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Question bank administration (create/update/delete).
    pub fn can_manage_questions(self) -> bool {
        match self {
            Role::Admin => true,
            Role::User => false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl Profile {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Bearer token plus the profile it was issued for.
///
/// There is no way to hold a token without a profile or the reverse: a
/// session either owns a whole `Credential` or none at all.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    profile: Profile,
}

impl Credential {
    pub fn new(token: impl Into<String>, profile: Profile) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return None;
        }
        Some(Self { token, profile })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub(crate) fn is_complete(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("profile", &self.profile)
            .finish()
    }
}

impl TryFrom<AuthResponse> for Credential {
    type Error = crate::api::ApiError;

    fn try_from(response: AuthResponse) -> std::result::Result<Self, Self::Error> {
        let profile = Profile {
            id: response.id,
            email: response.email,
            first_name: response.first_name,
            last_name: response.last_name,
            role: response.role,
        };
        Credential::new(response.token, profile).ok_or_else(|| {
            crate::api::ApiError::Decode("auth response carried an empty token".to_string())
        })
    }
}

#[cfg(test)]
pub(crate) fn test_credential(token: &str, role: Role) -> Credential {
    let profile = Profile {
        id: 7,
        email: "ada@example.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        role,
    };
    Credential::new(token, profile).expect("non-empty token")
}
