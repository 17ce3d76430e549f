//! Application startup and the demonstration walkthrough.

use crate::config::AccessConfig;
use crate::models::{FeatureAccess, PrivilegeTier, UserRecord, UserSummary};
use crate::services::{
    AccessController, ApiSession, CallMethod, HttpApiClient, IdentityRegistry, RemoteCallService,
    ServiceError, SessionError, TierChange, TransportError,
};
use serde::Serialize;
use service_core::error::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Everything the walkthrough observed, for the driver to present.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub users: Vec<UserSummary>,
    pub initial_access: Vec<FeatureAccess>,
    pub elevation: Option<ElevationReport>,
    pub api_call: Option<ApiCallReport>,
}

#[derive(Debug, Serialize)]
pub struct ElevationReport {
    pub subject_id: Uuid,
    /// Rejection returned when no approver was supplied.
    pub unapproved_rejection: Option<String>,
    pub change: Option<TierChange>,
    pub access_after: FeatureAccess,
}

#[derive(Debug, Serialize)]
pub struct ApiCallReport {
    pub operator_id: Uuid,
    pub method: CallMethod,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub detail: String,
}

pub struct Application {
    config: AccessConfig,
    controller: AccessController,
    remote: Option<Arc<dyn RemoteCallService>>,
}

impl Application {
    /// Seed the registry and configure the API client, if any.
    pub fn build(config: AccessConfig) -> Result<Self, AppError> {
        let registry = Arc::new(IdentityRegistry::new());
        for new_user in config.seed_users() {
            registry.register(UserRecord::new(new_user))?;
        }
        tracing::info!(users = registry.len()?, "Identity registry seeded");

        let remote = match &config.api {
            Some(api) => {
                let client = HttpApiClient::new(api.clone()).map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!("Failed to build API client: {}", e))
                })?;
                Some(Arc::new(client) as Arc<dyn RemoteCallService>)
            }
            None => {
                tracing::warn!("API connection not configured - API step will be skipped");
                None
            }
        };

        Ok(Self {
            config,
            controller: AccessController::new(registry),
            remote,
        })
    }

    /// Replace the remote call service.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteCallService>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn controller(&self) -> &AccessController {
        &self.controller
    }

    /// Dispatch every user's features, run the customer elevation, then
    /// issue the configured API call as the first admin.
    pub async fn run(&self) -> Result<RunReport, AppError> {
        let users: Vec<Arc<UserRecord>> = self.controller.registry().list_all()?.collect();

        let mut initial_access = Vec::with_capacity(users.len());
        for user in &users {
            initial_access.push(self.controller.execute_features(user)?);
        }

        let admin = first_with_tier(&users, PrivilegeTier::Admin);
        let customer = first_with_tier(&users, PrivilegeTier::Customer);

        let elevation = match customer {
            Some(customer) => Some(self.elevate(customer, admin)?),
            None => {
                tracing::info!("No customer registered - skipping elevation");
                None
            }
        };

        let api_call = match (admin, &self.remote) {
            (Some(admin), Some(remote)) => Some(self.call_api(admin, remote.clone()).await?),
            _ => None,
        };

        Ok(RunReport {
            users: users.iter().map(|u| u.summary()).collect(),
            initial_access,
            elevation,
            api_call,
        })
    }

    fn elevate(
        &self,
        customer: &UserRecord,
        admin: Option<&UserRecord>,
    ) -> Result<ElevationReport, AppError> {
        let unapproved_rejection =
            match self
                .controller
                .request_tier_change(customer, PrivilegeTier::Employee, None)
            {
                Err(e @ ServiceError::ApprovalRequired) => Some(e.to_string()),
                Err(e) => return Err(e.into()),
                Ok(_) => None,
            };

        let change = match admin {
            Some(admin) => Some(self.controller.request_tier_change(
                customer,
                PrivilegeTier::Employee,
                Some(admin),
            )?),
            None => {
                tracing::warn!("No admin registered - elevation cannot be approved");
                None
            }
        };

        Ok(ElevationReport {
            subject_id: customer.user_id(),
            unapproved_rejection,
            change,
            access_after: self.controller.execute_features(customer)?,
        })
    }

    async fn call_api(
        &self,
        admin: &UserRecord,
        remote: Arc<dyn RemoteCallService>,
    ) -> Result<ApiCallReport, AppError> {
        let (method, payload) = match &self.config.api {
            Some(api) => (api.action, api.payload.clone()),
            None => (CallMethod::Get, None),
        };

        let session = ApiSession::open(&self.controller, admin, remote)?;
        let outcome = session.send(method, payload.as_deref()).await;

        let report = match outcome {
            Ok(body) => ApiCallReport {
                operator_id: session.operator_id(),
                method,
                succeeded: true,
                status: None,
                detail: body,
            },
            Err(SessionError::Transport(TransportError::Status { status, body })) => {
                ApiCallReport {
                    operator_id: session.operator_id(),
                    method,
                    succeeded: false,
                    status: Some(status),
                    detail: body,
                }
            }
            Err(SessionError::Transport(e)) => ApiCallReport {
                operator_id: session.operator_id(),
                method,
                succeeded: false,
                status: None,
                detail: e.to_string(),
            },
            Err(SessionError::Access(e)) => return Err(e.into()),
        };

        Ok(report)
    }
}

fn first_with_tier(users: &[Arc<UserRecord>], tier: PrivilegeTier) -> Option<&UserRecord> {
    users.iter().map(Arc::as_ref).find(|u| u.tier() == tier)
}
