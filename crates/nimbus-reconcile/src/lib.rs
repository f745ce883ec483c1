//! Lifecycle reconciliation for a single Nimbus Cloud server.
//!
//! Translates a desired-state description into create/read/update/delete
//! calls against the Nimbus API, projects the provider's authoritative
//! view back into a local record the surrounding manager persists, and
//! blocks until asynchronous provider-side transitions complete or time
//! out. The manager framework owns diffing and operation routing; this
//! crate owns the reconciliation semantics of a single server.

pub mod addr;
pub mod lifecycle;
pub mod project;
pub mod schema;
pub mod types;
pub mod wait;

use std::time::Duration;

use async_trait::async_trait;
use nimbus_api::{CreateServerRequest, NimbusClient, Server, UpdateServerRequest};

pub use lifecycle::ServerLifecycle;
pub use types::{ConnectionInfo, InterfaceKind, IpVersion, ServerRecord, ServerSpec};
pub use wait::WaitConfig;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The desired spec is malformed, or asks for an in-place change the
    /// resource does not support. Raised before any remote call.
    #[error("invalid server spec: {0}")]
    InvalidSpec(String),

    /// A provider call failed for a reason other than not-found.
    #[error("{op}: {source}")]
    Api {
        op: &'static str,
        #[source]
        source: nimbus_api::Error,
    },

    #[error(
        "timed out after {elapsed:?} waiting for server {uuid} {attribute} to reach \"{target}\""
    )]
    WaitTimeout {
        uuid: String,
        attribute: &'static str,
        target: String,
        elapsed: Duration,
    },

    #[error("cancelled while waiting for server {uuid} {attribute} to reach \"{target}\"")]
    WaitCancelled {
        uuid: String,
        attribute: &'static str,
        target: String,
    },

    #[error("missing env var: {0}")]
    MissingEnv(String),
}

impl Error {
    pub(crate) fn api(op: &'static str, source: nimbus_api::Error) -> Self {
        Self::Api { op, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The provider's server endpoint, as the lifecycle consumes it.
///
/// [`NimbusClient`] implements this against the real API; tests
/// substitute scripted fakes. `get_server` and `delete_server` report a
/// missing resource as [`nimbus_api::Error::NotFound`] so the lifecycle
/// can treat absence as a valid state.
#[async_trait]
pub trait ServerApi: Send + Sync {
    async fn create_server(&self, req: &CreateServerRequest) -> nimbus_api::Result<Server>;
    async fn get_server(&self, uuid: &str) -> nimbus_api::Result<Server>;
    async fn update_server(&self, uuid: &str, req: &UpdateServerRequest) -> nimbus_api::Result<()>;
    async fn delete_server(&self, uuid: &str) -> nimbus_api::Result<()>;
}

#[async_trait]
impl ServerApi for NimbusClient {
    async fn create_server(&self, req: &CreateServerRequest) -> nimbus_api::Result<Server> {
        NimbusClient::create_server(self, req).await
    }

    async fn get_server(&self, uuid: &str) -> nimbus_api::Result<Server> {
        NimbusClient::get_server(self, uuid).await
    }

    async fn update_server(&self, uuid: &str, req: &UpdateServerRequest) -> nimbus_api::Result<()> {
        NimbusClient::update_server(self, uuid, req).await
    }

    async fn delete_server(&self, uuid: &str) -> nimbus_api::Result<()> {
        NimbusClient::delete_server(self, uuid).await
    }
}
