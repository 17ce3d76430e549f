//! Test helpers for access-service integration tests.

#![allow(dead_code)]

use access_service::config::{ApiConnectionConfig, ApiType};
use access_service::models::{NewUser, PrivilegeTier, UserRecord};
use access_service::services::{
    AccessController, CallMethod, IdentityRegistry, RemoteCallService, TransportError,
};
use async_trait::async_trait;
use secrecy::Secret;
use std::sync::{Arc, Mutex};

pub fn new_user(name: &str, tier: PrivilegeTier) -> NewUser {
    NewUser {
        display_name: name.to_string(),
        email: format!("{}@company.com", name.to_lowercase().replace(' ', ".")),
        home_address: format!("1 {} St.", name),
        phone_number: "555-0100".to_string(),
        password: Secret::new(format!("{}-pass", name)),
        tier,
    }
}

pub fn api_config(url: &str, api_type: ApiType) -> ApiConnectionConfig {
    ApiConnectionConfig {
        url: url.to_string(),
        api_key: Secret::new("test-api-key".to_string()),
        api_type,
        timeout_seconds: 5,
        action: CallMethod::Get,
        payload: None,
    }
}

/// Registry plus controller, shared the way the application wires them.
pub struct TestApp {
    pub registry: Arc<IdentityRegistry>,
    pub controller: AccessController,
}

impl TestApp {
    pub fn new() -> Self {
        let registry = Arc::new(IdentityRegistry::new());
        let controller = AccessController::new(registry.clone());
        Self {
            registry,
            controller,
        }
    }

    pub fn register(&self, name: &str, tier: PrivilegeTier) -> UserRecord {
        let record = UserRecord::new(new_user(name, tier));
        self.registry.register(record.clone()).unwrap();
        record
    }

    /// Live tier as stored in the registry.
    pub fn tier_of(&self, user: &UserRecord) -> PrivilegeTier {
        self.registry.find(&user.user_id()).unwrap().tier()
    }
}

/// Remote call service that records calls and replays a fixed outcome.
pub struct MockRemoteCall {
    status: Option<u16>,
    body: String,
    pub calls: Mutex<Vec<(CallMethod, Option<String>)>>,
}

impl MockRemoteCall {
    pub fn ok(body: &str) -> Arc<Self> {
        Arc::new(Self {
            status: None,
            body: body.to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            status: Some(status),
            body: body.to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RemoteCallService for MockRemoteCall {
    async fn call(
        &self,
        method: CallMethod,
        payload: Option<&str>,
    ) -> Result<String, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((method, payload.map(str::to_string)));

        match self.status {
            None => Ok(self.body.clone()),
            Some(status) => Err(TransportError::Status {
                status,
                body: self.body.clone(),
            }),
        }
    }
}
