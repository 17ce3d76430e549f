//! User model - registry-owned user records.

use super::tier::PrivilegeTier;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Input for creating a user record.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub home_address: String,
    #[serde(default)]
    pub phone_number: String,
    pub password: Secret<String>,
    pub tier: PrivilegeTier,
}

/// User entity.
///
/// Contact fields are opaque and never validated. The tier can only be
/// changed by the access controller through the registry's write guard.
#[derive(Debug, Clone)]
pub struct UserRecord {
    user_id: Uuid,
    display_name: String,
    email: String,
    home_address: String,
    phone_number: String,
    credential: Secret<String>,
    tier: PrivilegeTier,
    created_utc: DateTime<Utc>,
}

impl UserRecord {
    /// Create a new user with a fresh identifier and the current time.
    pub fn new(new_user: NewUser) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            display_name: new_user.display_name,
            email: new_user.email,
            home_address: new_user.home_address,
            phone_number: new_user.phone_number,
            credential: new_user.password,
            tier: new_user.tier,
            created_utc: Utc::now(),
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn home_address(&self) -> &str {
        &self.home_address
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    /// Tier as of when this copy was taken from the registry.
    pub fn tier(&self) -> PrivilegeTier {
        self.tier
    }

    pub fn created_utc(&self) -> DateTime<Utc> {
        self.created_utc
    }

    /// Compare a candidate credential in constant time.
    pub fn verify_credential(&self, candidate: &str) -> bool {
        self.credential
            .expose_secret()
            .as_bytes()
            .ct_eq(candidate.as_bytes())
            .into()
    }

    pub(crate) fn set_tier(&mut self, tier: PrivilegeTier) -> PrivilegeTier {
        std::mem::replace(&mut self.tier, tier)
    }

    /// Convert to sanitized view (no credential).
    pub fn summary(&self) -> UserSummary {
        UserSummary::from(self)
    }
}

/// User view for display and logging, without the credential.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub user_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub home_address: String,
    pub phone_number: String,
    pub tier: PrivilegeTier,
    pub created_utc: DateTime<Utc>,
}

impl From<&UserRecord> for UserSummary {
    fn from(u: &UserRecord) -> Self {
        Self {
            user_id: u.user_id,
            display_name: u.display_name.clone(),
            email: u.email.clone(),
            home_address: u.home_address.clone(),
            phone_number: u.phone_number.clone(),
            tier: u.tier,
            created_utc: u.created_utc,
        }
    }
}
