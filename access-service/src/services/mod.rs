pub mod access;
pub mod api_client;
pub mod api_session;
pub mod error;
pub mod metrics;
pub mod registry;

pub use access::{AccessController, TierChange};
pub use api_client::{CallMethod, HttpApiClient, RemoteCallService, TransportError};
pub use api_session::{ApiSession, SessionError};
pub use error::ServiceError;
pub use metrics::{gather_metrics, init_metrics};
pub use registry::IdentityRegistry;
