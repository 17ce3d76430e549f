//! Scoped API session owned by the driver.

use super::access::AccessController;
use super::api_client::{CallMethod, RemoteCallService, TransportError};
use super::error::ServiceError;
use crate::models::{Capability, UserRecord};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Access(#[from] ServiceError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A remote call service bound to the operator who opened it.
///
/// The operator's live tier is checked on open and again before every call,
/// so a demoted operator loses access mid-session.
pub struct ApiSession {
    controller: AccessController,
    operator: UserRecord,
    service: Arc<dyn RemoteCallService>,
}

impl ApiSession {
    pub fn open(
        controller: &AccessController,
        operator: &UserRecord,
        service: Arc<dyn RemoteCallService>,
    ) -> Result<Self, ServiceError> {
        controller.authorize(operator, Capability::ApiIntegration)?;
        tracing::info!(operator_id = %operator.user_id(), "API session opened");

        Ok(Self {
            controller: controller.clone(),
            operator: operator.clone(),
            service,
        })
    }

    pub fn operator_id(&self) -> Uuid {
        self.operator.user_id()
    }

    pub async fn send(
        &self,
        method: CallMethod,
        payload: Option<&str>,
    ) -> Result<String, SessionError> {
        self.controller
            .authorize(&self.operator, Capability::ApiIntegration)?;
        Ok(self.service.call(method, payload).await?)
    }
}

impl Drop for ApiSession {
    fn drop(&mut self) {
        tracing::info!(operator_id = %self.operator.user_id(), "API session closed");
    }
}
