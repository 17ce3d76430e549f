//! Access controller - tier-gated feature dispatch and the elevation protocol.

use super::error::ServiceError;
use super::metrics;
use super::registry::IdentityRegistry;
use crate::models::{Capability, FeatureAccess, FeatureSet, PrivilegeTier, UserRecord};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Result of an approved tier change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierChange {
    pub user_id: Uuid,
    pub previous: PrivilegeTier,
    pub current: PrivilegeTier,
    pub approved_by: Uuid,
}

impl TierChange {
    /// True when the request re-asserted the tier the user already held.
    pub fn is_noop(&self) -> bool {
        self.previous == self.current
    }
}

/// Gates features by tier and applies approved tier changes.
///
/// Every decision uses the tier currently stored in the registry; tiers
/// carried on caller-supplied records are ignored.
#[derive(Debug, Clone)]
pub struct AccessController {
    registry: Arc<IdentityRegistry>,
}

impl AccessController {
    pub fn new(registry: Arc<IdentityRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    /// Resolve the user's live tier and return the capabilities it grants and denies.
    #[tracing::instrument(skip(self, user), fields(user_id = %user.user_id()))]
    pub fn execute_features(&self, user: &UserRecord) -> Result<FeatureAccess, ServiceError> {
        let tier = self.registry.find(&user.user_id())?.tier();
        metrics::record_feature_dispatch(tier.as_str());

        let features = FeatureSet::for_tier(tier);
        tracing::debug!(
            tier = %tier,
            granted = features.granted.len(),
            denied = features.denied.len(),
            "Feature set dispatched"
        );

        Ok(FeatureAccess {
            user_id: user.user_id(),
            tier,
            features,
        })
    }

    /// Check that the user's live tier grants `capability`.
    pub fn authorize(
        &self,
        user: &UserRecord,
        capability: Capability,
    ) -> Result<PrivilegeTier, ServiceError> {
        let tier = self.registry.find(&user.user_id())?.tier();

        if FeatureSet::for_tier(tier).grants(capability) {
            Ok(tier)
        } else {
            tracing::warn!(
                user_id = %user.user_id(),
                tier = %tier,
                capability = %capability,
                "Capability denied"
            );
            Err(ServiceError::CapabilityDenied { tier, capability })
        }
    }

    /// Change `subject`'s tier to `new_tier` with `approver`'s sign-off.
    ///
    /// The approver must currently hold the admin tier in the registry.
    /// Approval is required even when `new_tier` is the subject's current
    /// tier. An admin may approve a change to their own record.
    /// On any error the registry is left unchanged.
    #[tracing::instrument(
        skip(self, subject, approver),
        fields(subject_id = %subject.user_id(), new_tier = %new_tier)
    )]
    pub fn request_tier_change(
        &self,
        subject: &UserRecord,
        new_tier: PrivilegeTier,
        approver: Option<&UserRecord>,
    ) -> Result<TierChange, ServiceError> {
        let result = self.apply_tier_change(subject, new_tier, approver);

        match &result {
            Ok(change) => {
                metrics::record_tier_change("approved");
                tracing::info!(
                    previous = %change.previous,
                    current = %change.current,
                    approved_by = %change.approved_by,
                    "Tier change approved"
                );
            }
            Err(e) => {
                metrics::record_tier_change(e.error_type());
                tracing::warn!(error = %e, "Tier change rejected");
            }
        }

        result
    }

    fn apply_tier_change(
        &self,
        subject: &UserRecord,
        new_tier: PrivilegeTier,
        approver: Option<&UserRecord>,
    ) -> Result<TierChange, ServiceError> {
        let approver = approver.ok_or(ServiceError::ApprovalRequired)?;
        let subject_id = subject.user_id();
        let approver_id = approver.user_id();

        // Check and mutation share one guard so a concurrent demotion of the
        // approver cannot slip in between.
        let mut writer = self.registry.lock_for_update()?;
        writer.tier_of(&subject_id)?;

        let approver_tier = writer.tier_of(&approver_id)?;
        if !approver_tier.is_admin() {
            return Err(ServiceError::InsufficientApproverPrivilege {
                approver: approver_id,
                tier: approver_tier,
            });
        }

        let previous = writer.set_tier(&subject_id, new_tier)?;

        Ok(TierChange {
            user_id: subject_id,
            previous,
            current: new_tier,
            approved_by: approver_id,
        })
    }
}
