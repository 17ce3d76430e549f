//! Authenticated client for the external API an administrator connects to.
//!
//! Supports REST GET/POST plus SOAP and GraphQL payload shaping. Every call
//! is logged as a request/response pair; the API key is never logged.

use crate::config::{ApiConnectionConfig, ApiType};
use crate::services::metrics;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use service_core::observability::{TracedClientExt, TracedRequest};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Error type for remote call operations.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("API connection not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Received non-success response: {status}")]
    Status { status: u16, body: String },

    #[error("Invalid payload: {0}")]
    Payload(String),
}

/// Call shape requested by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallMethod {
    Get,
    Post,
}

impl CallMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallMethod::Get => "GET",
            CallMethod::Post => "POST",
        }
    }
}

impl fmt::Display for CallMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated remote call: a body on success, a transport error otherwise.
#[async_trait]
pub trait RemoteCallService: Send + Sync {
    async fn call(&self, method: CallMethod, payload: Option<&str>)
        -> Result<String, TransportError>;
}

/// reqwest-backed client authenticated with a bearer API key.
#[derive(Clone)]
pub struct HttpApiClient {
    client: Client,
    config: ApiConnectionConfig,
}

impl HttpApiClient {
    /// Create a client for the configured connection.
    pub fn new(config: ApiConnectionConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        tracing::info!(
            url = %config.url,
            api_type = %config.api_type,
            "API connection configured"
        );

        Ok(Self { client, config })
    }

    /// Check if the connection has a URL and credential.
    pub fn is_configured(&self) -> bool {
        !self.config.url.is_empty() && !self.config.api_key.expose_secret().is_empty()
    }

    pub fn api_type(&self) -> ApiType {
        self.config.api_type
    }

    /// Send a GET request.
    pub async fn send_get(&self) -> Result<String, TransportError> {
        let request = self.client.traced_get(&self.config.url);
        self.execute(CallMethod::Get, request, None).await
    }

    /// Send a POST request with a JSON body.
    pub async fn send_post(&self, json_payload: &str) -> Result<String, TransportError> {
        let request = self
            .client
            .traced_post(&self.config.url)
            .header("Content-Type", "application/json")
            .body(json_payload.to_string());
        self.execute(CallMethod::Post, request, Some(json_payload))
            .await
    }

    /// Send a SOAP envelope.
    pub async fn send_soap(&self, xml_payload: &str) -> Result<String, TransportError> {
        let request = self
            .client
            .traced_post(&self.config.url)
            .header("Content-Type", "text/xml")
            .body(xml_payload.to_string());
        self.execute(CallMethod::Post, request, Some(xml_payload))
            .await
    }

    /// Send a GraphQL query wrapped as `{"query": ...}`.
    pub async fn send_graphql(&self, query: &str) -> Result<String, TransportError> {
        let json_payload = graphql_body(query);
        let request = self
            .client
            .traced_post(&self.config.url)
            .header("Content-Type", "application/json")
            .body(json_payload.clone());
        self.execute(CallMethod::Post, request, Some(&json_payload))
            .await
    }

    async fn execute(
        &self,
        method: CallMethod,
        request: TracedRequest,
        payload: Option<&str>,
    ) -> Result<String, TransportError> {
        if !self.is_configured() {
            return Err(TransportError::NotConfigured(
                "API url and key must be set".to_string(),
            ));
        }

        tracing::info!(
            method = %method,
            url = %self.config.url,
            api_type = %self.config.api_type,
            payload = payload.unwrap_or(""),
            "API request"
        );

        let response = request
            .bearer_auth(self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| {
                metrics::record_api_call(method.as_str(), "error");
                tracing::error!(method = %method, url = %self.config.url, error = %e, "API request failed");
                TransportError::Request(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            metrics::record_api_call(method.as_str(), "error");
            tracing::error!(
                method = %method,
                url = %self.config.url,
                status = %status,
                error = %e,
                "Failed to read API response body"
            );
            TransportError::Request(e)
        })?;

        tracing::info!(
            method = %method,
            url = %self.config.url,
            status = %status,
            body = %body,
            "API response"
        );

        let status_class = format!("{}xx", status.as_u16() / 100);
        metrics::record_api_call(method.as_str(), &status_class);

        if status.is_success() {
            Ok(body)
        } else {
            Err(TransportError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl RemoteCallService for HttpApiClient {
    async fn call(
        &self,
        method: CallMethod,
        payload: Option<&str>,
    ) -> Result<String, TransportError> {
        match (method, payload) {
            (CallMethod::Get, payload) => {
                if payload.is_some() {
                    tracing::warn!("Ignoring payload supplied with a GET call");
                }
                self.send_get().await
            }
            (CallMethod::Post, Some(payload)) => match self.config.api_type {
                ApiType::Rest => self.send_post(payload).await,
                ApiType::Soap => self.send_soap(payload).await,
                ApiType::GraphQL => self.send_graphql(payload).await,
            },
            (CallMethod::Post, None) => Err(TransportError::Payload(
                "POST requires a payload".to_string(),
            )),
        }
    }
}

fn graphql_body(query: &str) -> String {
    serde_json::json!({ "query": query }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_body_escapes_query() {
        let body = graphql_body("{ user(name: \"x\") { id } }");
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["query"], "{ user(name: \"x\") { id } }");
    }

    #[test]
    fn test_call_method_labels() {
        assert_eq!(CallMethod::Get.to_string(), "GET");
        assert_eq!(CallMethod::Post.as_str(), "POST");
    }
}
