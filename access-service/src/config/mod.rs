use crate::models::{NewUser, PrivilegeTier};
use crate::services::CallMethod;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct AccessConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    /// External API the admin drives; the API step is skipped when unset.
    #[serde(default)]
    pub api: Option<ApiConnectionConfig>,
    /// Users seeded into the registry at startup.
    #[serde(default)]
    pub users: Vec<NewUser>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Prod,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiType {
    #[default]
    Rest,
    Soap,
    GraphQL,
}

impl fmt::Display for ApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApiType::Rest => "rest",
            ApiType::Soap => "soap",
            ApiType::GraphQL => "graphql",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConnectionConfig {
    pub url: String,
    pub api_key: Secret<String>,
    #[serde(default)]
    pub api_type: ApiType,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Call issued by the startup flow.
    #[serde(default = "default_action")]
    pub action: CallMethod,
    /// Body for POST; shaped according to `api_type`.
    #[serde(default)]
    pub payload: Option<String>,
}

fn default_service_name() -> String {
    "access-service".to_string()
}

fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_action() -> CallMethod {
    CallMethod::Get
}

impl AccessConfig {
    /// Load from `configuration.*` (if present) and `APP__` environment variables.
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(None)
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self, AppError> {
        let config: AccessConfig = core_config::load_layered(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Users to seed: the configured ones, or one demonstration user per tier.
    pub fn seed_users(&self) -> Vec<NewUser> {
        if self.users.is_empty() {
            demonstration_users()
        } else {
            self.users.clone()
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(api) = &self.api {
            if api.url.trim().is_empty() {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "api.url must not be empty"
                )));
            }

            if api.api_key.expose_secret().is_empty() {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "api.api_key must not be empty"
                )));
            }

            if api.timeout_seconds == 0 {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "api.timeout_seconds must be positive"
                )));
            }

            if api.action == CallMethod::Post && api.payload.is_none() {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "api.payload is required when api.action is post"
                )));
            }

            if api.action == CallMethod::Get && api.payload.is_some() {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "api.payload is not sent when api.action is get"
                )));
            }
        }

        let mut emails = HashSet::new();
        for user in &self.users {
            if !emails.insert(user.email.to_ascii_lowercase()) {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Duplicate seed user email '{}'",
                    user.email
                )));
            }
        }

        // In production, demonstration users are never seeded
        if self.environment == Environment::Prod
            && !self.users.iter().any(|u| u.tier == PrivilegeTier::Admin)
        {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "At least one admin user must be configured in production"
            )));
        }

        Ok(())
    }
}

/// One user per tier, matching the walkthrough run by the binary.
pub fn demonstration_users() -> Vec<NewUser> {
    let user = |name: &str, email: &str, address: &str, phone: &str, password: &str, tier| {
        NewUser {
            display_name: name.to_string(),
            email: email.to_string(),
            home_address: address.to_string(),
            phone_number: phone.to_string(),
            password: Secret::new(password.to_string()),
            tier,
        }
    };

    vec![
        user(
            "Admin User",
            "admin@company.com",
            "123 Admin St.",
            "123-456-7890",
            "adminpass",
            PrivilegeTier::Admin,
        ),
        user(
            "Employee User",
            "employee@company.com",
            "456 Employee Ave.",
            "987-654-3210",
            "employeepass",
            PrivilegeTier::Employee,
        ),
        user(
            "Customer User",
            "customer@company.com",
            "789 Customer Rd.",
            "555-555-5555",
            "customerpass",
            PrivilegeTier::Customer,
        ),
    ]
}
