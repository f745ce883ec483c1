//! Create/read/update/delete orchestration for a single server.
//!
//! One lifecycle operation runs per record at a time; the surrounding
//! manager serializes operations per resource instance. Independent
//! records can be reconciled concurrently with separate calls.

use async_trait::async_trait;
use nimbus_api::{NimbusClient, UpdateServerRequest};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::types::{ServerRecord, ServerSpec};
use crate::wait::{self, Probe, Refresh, WaitConfig};
use crate::{Error, Result, ServerApi, project, schema};

/// Status values meaning "transition still in progress".
const CREATE_PENDING: &[&str] = &["changing"];
const UPDATE_PENDING: &[&str] = &["changing", "running"];

/// Drives one server resource through its lifecycle against a provider
/// client. The client is an explicit dependency; there is no ambient
/// process-wide handle.
pub struct ServerLifecycle<C> {
    client: C,
    wait: WaitConfig,
}

impl ServerLifecycle<NimbusClient> {
    /// Build a lifecycle driver from `NIMBUS_API_TOKEN`, honouring the
    /// optional `NIMBUS_API_URL` endpoint override.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let token = std::env::var("NIMBUS_API_TOKEN")
            .map_err(|_| Error::MissingEnv("NIMBUS_API_TOKEN".into()))?;

        let client = match std::env::var("NIMBUS_API_URL") {
            Ok(url) => NimbusClient::with_base_url(token, url),
            Err(_) => NimbusClient::new(token),
        };
        Ok(Self::new(client))
    }
}

impl<C: ServerApi> ServerLifecycle<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            wait: WaitConfig::default(),
        }
    }

    /// Override the convergence-wait timing.
    pub fn with_wait_config(client: C, wait: WaitConfig) -> Self {
        Self { client, wait }
    }

    /// Create the server and block until it is running.
    ///
    /// The provider-assigned UUID is bound to the record as soon as the
    /// create call returns: a failure while waiting for boot must not
    /// orphan the remote server, so the error propagates with the id
    /// still assigned and a later reconciliation picks up from there.
    pub async fn create(
        &self,
        record: &mut ServerRecord,
        spec: &ServerSpec,
        cancel: &CancellationToken,
    ) -> Result<()> {
        spec.validate()?;

        let req = project::create_request(spec);
        let server = self
            .client
            .create_server(&req)
            .await
            .map_err(|e| Error::api("create server", e))?;

        record.id = Some(server.uuid.clone());
        project::apply_spec(record, spec);
        info!(server_id = %server.uuid, name = %spec.name, "server created");

        self.wait_for_status(record, CREATE_PENDING, "running", cancel)
            .await?;

        self.read(record).await
    }

    /// Refresh the record from the provider's authoritative state.
    ///
    /// A provider NotFound unbinds the record and reports success: the
    /// server was deleted out of band, and clearing the id is what lets
    /// the manager converge by recreating it.
    pub async fn read(&self, record: &mut ServerRecord) -> Result<()> {
        refresh_record(&self.client, record).await
    }

    /// Apply a desired-state change, the only in-place mutation the
    /// resource supports. Anything else must go through destroy-and-
    /// recreate and is refused here before any provider call.
    pub async fn update(
        &self,
        record: &mut ServerRecord,
        spec: &ServerSpec,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let frozen = schema::immutable_changes(record, spec);
        if !frozen.is_empty() {
            return Err(Error::InvalidSpec(format!(
                "cannot change {} in place; the server must be recreated",
                frozen.join(", ")
            )));
        }

        if let (Some(uuid), Some(desired)) = (record.id.clone(), spec.desired_state.clone())
            && record.desired_state.as_deref() != Some(desired.as_str())
        {
            self.client
                .update_server(&uuid, &UpdateServerRequest {
                    status: desired.clone(),
                })
                .await
                .map_err(|e| Error::api("update server", e))?;

            record.desired_state = Some(desired.clone());
            info!(server_id = %uuid, desired_state = %desired, "server state change requested");

            self.wait_for_status(record, UPDATE_PENDING, "stopped", cancel)
                .await?;
        }

        self.read(record).await
    }

    /// Delete the server. Already-gone is success, so a delete can be
    /// retried safely after a partial failure.
    pub async fn delete(&self, record: &mut ServerRecord) -> Result<()> {
        let Some(uuid) = record.id.clone() else {
            return Ok(());
        };

        match self.client.delete_server(&uuid).await {
            Ok(()) => info!(server_id = %uuid, "server deleted"),
            Err(nimbus_api::Error::NotFound) => {
                warn!(server_id = %uuid, "server already gone");
            }
            Err(e) => return Err(Error::api("delete server", e)),
        }

        record.id = None;
        Ok(())
    }

    async fn wait_for_status(
        &self,
        record: &mut ServerRecord,
        pending: &[&str],
        target: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let Some(uuid) = record.id.clone() else {
            return Ok(());
        };
        let mut probe = StatusProbe {
            client: &self.client,
            record,
        };
        wait::wait_for(
            &mut probe, &uuid, "status", pending, target, &self.wait, cancel,
        )
        .await?;
        Ok(())
    }
}

async fn refresh_record<C: ServerApi>(client: &C, record: &mut ServerRecord) -> Result<()> {
    let Some(uuid) = record.id.clone() else {
        return Ok(());
    };

    match client.get_server(&uuid).await {
        Ok(server) => {
            project::apply_snapshot(record, &server);
            Ok(())
        }
        Err(nimbus_api::Error::NotFound) => {
            warn!(server_id = %uuid, "server not found, clearing local record");
            record.id = None;
            Ok(())
        }
        Err(e) => Err(Error::api("get server", e)),
    }
}

/// Refresh implementation for status waits: a full read first, keeping
/// the record current throughout a long wait, then a separate fresh
/// snapshot for the attribute itself. A missing status or unpublished SSH
/// host keys mean the server is still assembling — a non-signal, not an
/// error.
struct StatusProbe<'a, C> {
    client: &'a C,
    record: &'a mut ServerRecord,
}

#[async_trait]
impl<C: ServerApi> Refresh for StatusProbe<'_, C> {
    async fn probe(&mut self) -> Result<Probe> {
        refresh_record(self.client, self.record).await?;

        let Some(uuid) = self.record.id.clone() else {
            return Ok(Probe::NotReported);
        };
        let Some(value) = self.record.status.clone() else {
            return Ok(Probe::NotReported);
        };

        let snapshot = self
            .client
            .get_server(&uuid)
            .await
            .map_err(|e| Error::api("get server", e))?;

        if snapshot.ssh_host_keys.is_empty() {
            return Ok(Probe::NotReported);
        }

        Ok(Probe::Observed { snapshot, value })
    }
}
