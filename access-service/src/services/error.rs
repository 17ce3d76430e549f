use crate::models::{Capability, PrivilegeTier};
use service_core::error::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("User {0} is already registered")]
    DuplicateIdentity(Uuid),

    #[error("User {0} not found")]
    NotFound(Uuid),

    #[error("Administrator approval is required to change a privilege tier")]
    ApprovalRequired,

    #[error("Approver {approver} holds tier {tier}; only an admin may approve tier changes")]
    InsufficientApproverPrivilege { approver: Uuid, tier: PrivilegeTier },

    #[error("Tier {tier} does not grant capability '{capability}'")]
    CapabilityDenied {
        tier: PrivilegeTier,
        capability: Capability,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    /// Low-cardinality label for metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            ServiceError::DuplicateIdentity(_) => "duplicate_identity",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::ApprovalRequired => "approval_required",
            ServiceError::InsufficientApproverPrivilege { .. } => "insufficient_approver_privilege",
            ServiceError::CapabilityDenied { .. } => "capability_denied",
            ServiceError::Internal(_) => "internal",
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::DuplicateIdentity(_) => AppError::Conflict(anyhow::anyhow!(err)),
            ServiceError::NotFound(_) => AppError::NotFound(anyhow::anyhow!(err)),
            ServiceError::ApprovalRequired => AppError::Unauthorized(anyhow::anyhow!(err)),
            ServiceError::InsufficientApproverPrivilege { .. }
            | ServiceError::CapabilityDenied { .. } => AppError::Forbidden(anyhow::anyhow!(err)),
        }
    }
}
