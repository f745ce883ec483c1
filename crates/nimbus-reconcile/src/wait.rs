//! Generic poll-until-converged engine.
//!
//! Mutating calls against the provider only start a transition; the
//! authoritative state catches up asynchronously. [`wait_for`] polls a
//! [`Refresh`] implementation until a watched attribute reaches its
//! target value, with a ramped poll interval and a hard deadline.

use std::time::Duration;

use async_trait::async_trait;
use nimbus_api::Server;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{Error, Result};

/// Timing knobs for a convergence wait.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Hard ceiling on the total wait.
    pub timeout: Duration,
    /// Steady-state delay between polls once the ramp is done.
    pub poll_interval: Duration,
    /// Delay before the first re-poll; doubles until `poll_interval`.
    pub min_poll_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60 * 60),
            poll_interval: Duration::from_secs(10),
            min_poll_interval: Duration::from_secs(3),
        }
    }
}

/// One observation of the watched attribute.
pub enum Probe {
    /// A fresh snapshot and the attribute's current value.
    Observed { snapshot: Server, value: String },
    /// No signal yet — the attribute is not reported; keep waiting.
    NotReported,
}

/// Produces probes for [`wait_for`]. Each call is expected to hit the
/// provider for a fresh view; an error means access failed, not that the
/// transition is still in progress.
#[async_trait]
pub trait Refresh {
    async fn probe(&mut self) -> Result<Probe>;
}

/// Poll `refresh` until `attribute` reaches `target`, and return the
/// snapshot that first carried it.
///
/// Values in `pending` mean the transition is still in progress. Any
/// other observed value is treated the same way rather than failing —
/// the provider's status vocabulary is open-ended. Refresh errors abort
/// the wait immediately. Cancellation interrupts the sleep between polls
/// and is reported distinctly from the deadline expiring.
pub async fn wait_for<R>(
    refresh: &mut R,
    uuid: &str,
    attribute: &'static str,
    pending: &[&str],
    target: &str,
    config: &WaitConfig,
    cancel: &CancellationToken,
) -> Result<Server>
where
    R: Refresh + Send,
{
    debug!(server_id = %uuid, attribute, target, "waiting for convergence");

    let started = Instant::now();
    let mut delay = config.min_poll_interval;

    loop {
        match refresh.probe().await? {
            Probe::Observed { snapshot, value } if value == target => {
                debug!(server_id = %uuid, attribute, value = %value, "converged");
                return Ok(snapshot);
            }
            Probe::Observed { value, .. } => {
                if !pending.contains(&value.as_str()) {
                    debug!(
                        server_id = %uuid,
                        attribute,
                        value = %value,
                        "value neither pending nor target, still waiting"
                    );
                }
            }
            Probe::NotReported => {}
        }

        let elapsed = started.elapsed();
        if elapsed >= config.timeout {
            return Err(Error::WaitTimeout {
                uuid: uuid.into(),
                attribute,
                target: target.into(),
                elapsed,
            });
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(Error::WaitCancelled {
                    uuid: uuid.into(),
                    attribute,
                    target: target.into(),
                });
            }
            _ = tokio::time::sleep(delay) => {}
        }

        delay = (delay * 2).min(config.poll_interval);
    }
}
