//! `ApiKeyRecord`/`Role` (§10.5) — backs the admin API's auth (C14).
//!
//! Grounded on the same secret-redaction discipline as [`crate::ca`] and
//! [`crate::leaf_cert`]: the token itself is hashed, never stored or
//! logged in cleartext.

use chrono::{DateTime, Utc};

/// Permission tier for an API key (§4.13, §10.5): `Viewer` may call the
/// `view`-permission GET endpoints, `Operator` may additionally
/// pause/resume/refresh-rules/clear-cache, `Admin` may additionally
/// update configuration and manage other keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Operator,
    Admin,
}

impl Role {
    /// Whether this role meets or exceeds the permission level an
    /// endpoint requires. Roles are totally ordered Viewer < Operator <
    /// Admin, matching §4.13's view/operator/admin tiers.
    pub fn satisfies(&self, required: Role) -> bool {
        *self >= required
    }
}

/// A single issued API key, persisted in `api_keys.json` as a list of
/// these records. The bearer token is never stored directly — only a
/// SHA-256 hash of it — so a leaked `api_keys.json` does not itself hand
/// out working credentials.
#[derive(Clone, serde::Deserialize, serde::Serialize)]
pub struct ApiKeyRecord {
    pub id: String,
    pub label: String,
    pub token_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    /// Set by revocation; the record is kept (not deleted) for audit (§10.5).
    #[serde(default)]
    pub revoked: bool,
}

impl ApiKeyRecord {
    pub fn new(id: String, label: String, token_hash: String, role: Role, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            label,
            token_hash,
            role,
            created_at,
            last_used_at: None,
            revoked: false,
        }
    }

    pub fn mark_used(&mut self, at: DateTime<Utc>) {
        self.last_used_at = Some(at);
    }

    pub fn revoke(&mut self) {
        self.revoked = true;
    }

    pub fn is_usable(&self) -> bool {
        !self.revoked
    }
}

impl std::fmt::Debug for ApiKeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyRecord")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("token_hash", &"<redacted>")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("last_used_at", &self.last_used_at)
            .field("revoked", &self.revoked)
            .finish()
    }
}
