use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::Role;

/// An authenticated actor, as persisted in `users.json`.
///
/// The password is stored as a PBKDF2-SHA256 hash with a per-user salt.
/// This struct never leaves the API; responses carry [`UserSummary`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password_hash: String,
    pub salt: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// The user shape exposed over the API — no credential material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_omits_credential_material() {
        let user = User {
            id: 1,
            username: "admin".into(),
            password_hash: "aGFzaA".into(),
            salt: "c2FsdA".into(),
            name: "System Administrator".into(),
            email: "admin@setu.gov.in".into(),
            role: Role::Admin,
            created_at: Utc::now(),
        };
        let summary = UserSummary::from(&user);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["username"], "admin");
        assert_eq!(json["role"], "admin");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("salt").is_none());
    }
}
