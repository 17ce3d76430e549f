//! Privilege tiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Privilege tier held by every user record.
///
/// Capabilities nest (admin over employee over customer), but tiers are only
/// ever compared for identity, never ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivilegeTier {
    #[serde(alias = "ADMIN")]
    Admin,
    #[serde(alias = "EMPLOYEE")]
    Employee,
    #[serde(alias = "CUSTOMER")]
    Customer,
}

impl PrivilegeTier {
    pub const ALL: [PrivilegeTier; 3] = [
        PrivilegeTier::Admin,
        PrivilegeTier::Employee,
        PrivilegeTier::Customer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrivilegeTier::Admin => "admin",
            PrivilegeTier::Employee => "employee",
            PrivilegeTier::Customer => "customer",
        }
    }

    pub fn is_admin(&self) -> bool {
        *self == PrivilegeTier::Admin
    }
}

impl fmt::Display for PrivilegeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrivilegeTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(PrivilegeTier::Admin),
            "employee" => Ok(PrivilegeTier::Employee),
            "customer" => Ok(PrivilegeTier::Customer),
            other => Err(format!(
                "Invalid privilege tier '{}': expected admin, employee or customer",
                other
            )),
        }
    }
}
