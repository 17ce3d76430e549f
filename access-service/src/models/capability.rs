//! Capability tags and the per-tier feature table.

use super::tier::PrivilegeTier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Opaque label for one feature a tier may or may not access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Customer-facing features.
    Basic,
    /// Internal tooling available to staff.
    Internal,
    /// Full administrative access, including approving tier changes.
    Administration,
    /// Configuring and driving the external API connection.
    ApiIntegration,
}

impl Capability {
    pub fn tag(&self) -> &'static str {
        match self {
            Capability::Basic => "basic",
            Capability::Internal => "internal",
            Capability::Administration => "administration",
            Capability::ApiIntegration => "api-integration",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

const ADMIN_GRANTED: &[Capability] = &[
    Capability::Basic,
    Capability::Internal,
    Capability::Administration,
    Capability::ApiIntegration,
];
const ADMIN_DENIED: &[Capability] = &[];

const EMPLOYEE_GRANTED: &[Capability] = &[Capability::Basic, Capability::Internal];
const EMPLOYEE_DENIED: &[Capability] = &[Capability::Administration, Capability::ApiIntegration];

const CUSTOMER_GRANTED: &[Capability] = &[Capability::Basic];
const CUSTOMER_DENIED: &[Capability] = &[
    Capability::Internal,
    Capability::Administration,
    Capability::ApiIntegration,
];

/// Capabilities a tier is granted, and those it is explicitly denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSet {
    pub granted: BTreeSet<Capability>,
    pub denied: BTreeSet<Capability>,
}

impl FeatureSet {
    /// Look up the fixed feature set for `tier`.
    pub fn for_tier(tier: PrivilegeTier) -> Self {
        let (granted, denied) = match tier {
            PrivilegeTier::Admin => (ADMIN_GRANTED, ADMIN_DENIED),
            PrivilegeTier::Employee => (EMPLOYEE_GRANTED, EMPLOYEE_DENIED),
            PrivilegeTier::Customer => (CUSTOMER_GRANTED, CUSTOMER_DENIED),
        };

        Self {
            granted: granted.iter().copied().collect(),
            denied: denied.iter().copied().collect(),
        }
    }

    pub fn grants(&self, capability: Capability) -> bool {
        self.granted.contains(&capability)
    }
}

/// Outcome of dispatching a user to their tier's feature set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureAccess {
    pub user_id: Uuid,
    pub tier: PrivilegeTier,
    #[serde(flatten)]
    pub features: FeatureSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granted_sets_nest_by_tier() {
        let admin = FeatureSet::for_tier(PrivilegeTier::Admin);
        let employee = FeatureSet::for_tier(PrivilegeTier::Employee);
        let customer = FeatureSet::for_tier(PrivilegeTier::Customer);

        assert!(admin.granted.is_superset(&employee.granted));
        assert!(employee.granted.is_superset(&customer.granted));
    }

    #[test]
    fn test_denied_sets_are_nonempty_and_disjoint_from_granted() {
        for tier in [PrivilegeTier::Employee, PrivilegeTier::Customer] {
            let set = FeatureSet::for_tier(tier);
            assert!(!set.denied.is_empty(), "{} should deny something", tier);
            assert!(set.granted.is_disjoint(&set.denied));
        }
    }

    #[test]
    fn test_admin_has_full_access() {
        let admin = FeatureSet::for_tier(PrivilegeTier::Admin);
        assert!(admin.denied.is_empty());
        assert!(admin.grants(Capability::Administration));
        assert!(admin.grants(Capability::ApiIntegration));
    }

    #[test]
    fn test_employee_is_denied_admin_features() {
        let employee = FeatureSet::for_tier(PrivilegeTier::Employee);
        assert!(employee.grants(Capability::Internal));
        assert!(employee.denied.contains(&Capability::Administration));
        assert!(!employee.grants(Capability::ApiIntegration));
    }

    #[test]
    fn test_capability_tags_serialize_as_labels() {
        let json = serde_json::to_string(&Capability::ApiIntegration).unwrap();
        assert_eq!(json, format!("\"{}\"", Capability::ApiIntegration.tag()));
    }
}
