//! Last-write-wins reconciliation with the remote document.
//!
//! `SyncEngine` pulls and pushes the whole planner document through a
//! [`RemoteTransport`]. Pull is freshness-gated on `meta.updatedAt`; push
//! always overwrites the remote. A single-flight lock keeps two operations
//! from interleaving against the same local store, and every finished
//! operation is published on the engine's [`EventBus`].

use futures::lock::Mutex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::SyncConfig;
use crate::events::{EventBus, PlannerEvent, SharedEventBus};
use crate::gateway::{PlannerStore, SaveError};
use crate::remote::{RemoteTransport, TransportError};
use crate::store::KeyValueStore;
use crate::time::{now_millis, parse_iso_millis};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Not connected. Add a remote id and token in sync settings.")]
    NotConnected,

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("{0} not found in the remote document")]
    RemoteFileMissing(String),

    #[error("Remote planner file is not valid JSON: {0}")]
    InvalidRemote(#[source] serde_json::Error),

    #[error("Remote planner file is not a JSON object")]
    RemoteNotADocument,

    #[error("Could not save locally: {0}")]
    Save(#[from] SaveError),
}

impl SyncError {
    /// HTTP status of a failed remote request, if that is what went wrong.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Transport(err) => err.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Why a pull did or did not replace local data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PullReason {
    Forced,
    RemoteNewerOrEqual,
    LocalNewer,
}

/// Result of a completed pull.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullOutcome {
    pub applied: bool,
    pub reason: PullReason,
    /// Remote `meta.updatedAt` in epoch millis, 0 when missing or unparseable.
    pub remote_updated: i64,
    /// Local `meta.updatedAt` in epoch millis, 0 when missing or unparseable.
    pub local_updated: i64,
}

/// Decide whether a remote copy replaces the local one.
///
/// Equal timestamps favour the remote.
pub fn decide(force: bool, remote_updated: i64, local_updated: i64) -> Option<PullReason> {
    if force {
        Some(PullReason::Forced)
    } else if remote_updated >= local_updated {
        Some(PullReason::RemoteNewerOrEqual)
    } else {
        None
    }
}

pub struct SyncEngine<S: KeyValueStore, T: RemoteTransport> {
    store: PlannerStore<S>,
    transport: T,
    events: SharedEventBus,
    in_flight: Mutex<()>,
}

impl<S: KeyValueStore, T: RemoteTransport> SyncEngine<S, T> {
    pub fn new(store: PlannerStore<S>, transport: T) -> Self {
        Self::with_events(store, transport, EventBus::shared())
    }

    pub fn with_events(store: PlannerStore<S>, transport: T, events: SharedEventBus) -> Self {
        Self {
            store,
            transport,
            events,
            in_flight: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &PlannerStore<S> {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn events(&self) -> &SharedEventBus {
        &self.events
    }

    fn connected_config(&self) -> Result<SyncConfig> {
        self.store
            .sync_config()
            .filter(SyncConfig::is_connected)
            .ok_or(SyncError::NotConnected)
    }

    // ========== Pull ==========

    /// Fetch the remote document and apply it if it is at least as fresh as
    /// the local one, or unconditionally when `force` is set.
    ///
    /// Failures leave local data untouched.
    pub async fn pull(&self, force: bool) -> Result<PullOutcome> {
        let _in_flight = self.in_flight.lock().await;
        let result = self.pull_locked(force).await;
        match &result {
            Ok(outcome) => self.events.emit(PlannerEvent::PullCompleted {
                applied: outcome.applied,
                reason: outcome.reason,
                remote_updated: outcome.remote_updated,
                local_updated: outcome.local_updated,
                timestamp: now_millis() as f64,
            }),
            Err(err) => self.emit_failure("pull", err),
        }
        result
    }

    async fn pull_locked(&self, force: bool) -> Result<PullOutcome> {
        let config = self.connected_config()?;
        let remote = self
            .transport
            .fetch(&config.remote_id, &config.token)
            .await?;

        let filename = &self.store.config().remote_filename;
        let content = remote
            .find_file(filename)
            .ok_or_else(|| SyncError::RemoteFileMissing(filename.clone()))?;
        let remote_value: Value = serde_json::from_str(content).map_err(SyncError::InvalidRemote)?;
        if !remote_value.is_object() {
            return Err(SyncError::RemoteNotADocument);
        }

        let remote_updated = parse_iso_millis(
            remote_value
                .get("meta")
                .and_then(|meta| meta.get("updatedAt"))
                .and_then(Value::as_str),
        );
        let local_updated = self.local_updated()?;

        let Some(reason) = decide(force, remote_updated, local_updated) else {
            debug!(remote_updated, local_updated, "local copy is newer, keeping it");
            return Ok(PullOutcome {
                applied: false,
                reason: PullReason::LocalNewer,
                remote_updated,
                local_updated,
            });
        };

        self.store.save_value(remote_value)?;
        info!(?reason, remote_updated, local_updated, "applied remote planner document");
        Ok(PullOutcome {
            applied: true,
            reason,
            remote_updated,
            local_updated,
        })
    }

    /// Local freshness. A device with nothing stored yet counts as oldest.
    ///
    /// A stored `meta` object is read as written: a missing or unparseable
    /// `updatedAt` there is 0, not the value migration would fill in. Only a
    /// document with no `meta` at all uses the migrated timestamp.
    fn local_updated(&self) -> Result<i64> {
        let Some(raw) = self.store.load_raw().map_err(SaveError::from)? else {
            return Ok(0);
        };
        let stored: Option<Value> = serde_json::from_str(&raw).ok();
        let stored_meta = stored
            .as_ref()
            .and_then(|doc| doc.get("meta"))
            .filter(|meta| meta.is_object());

        Ok(match stored_meta {
            Some(meta) => parse_iso_millis(meta.get("updatedAt").and_then(Value::as_str)),
            None => parse_iso_millis(Some(self.store.load().meta.updated_at.as_str())),
        })
    }

    // ========== Push ==========

    /// Migrate and save the local document, then overwrite the remote file
    /// with it. No freshness check is made.
    pub async fn push(&self) -> Result<()> {
        let _in_flight = self.in_flight.lock().await;
        let result = self.push_locked().await;
        match &result {
            Ok(()) => self.events.emit(PlannerEvent::PushCompleted {
                timestamp: now_millis() as f64,
            }),
            Err(err) => self.emit_failure("push", err),
        }
        result
    }

    async fn push_locked(&self) -> Result<()> {
        let config = self.connected_config()?;
        let mut doc = self.store.load();
        self.store.save(&mut doc)?;
        let content = doc.to_pretty_json().map_err(SaveError::from)?;

        self.transport
            .replace_file(
                &config.remote_id,
                &config.token,
                &self.store.config().remote_filename,
                &content,
            )
            .await?;
        info!(bytes = content.len(), "pushed planner document");
        Ok(())
    }

    fn emit_failure(&self, operation: &str, err: &SyncError) {
        debug!(operation, %err, "sync operation failed");
        self.events.emit(PlannerEvent::SyncFailed {
            operation: operation.to_string(),
            message: err.to_string(),
            timestamp: now_millis() as f64,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_tie_goes_to_remote() {
        assert_eq!(decide(false, 10, 10), Some(PullReason::RemoteNewerOrEqual));
        assert_eq!(decide(false, 11, 10), Some(PullReason::RemoteNewerOrEqual));
        assert_eq!(decide(false, 9, 10), None);
    }

    #[test]
    fn test_decide_force_always_applies() {
        assert_eq!(decide(true, 0, i64::MAX), Some(PullReason::Forced));
    }

    #[test]
    fn test_unparseable_remote_loses_to_valid_local() {
        let remote = parse_iso_millis(Some("garbage"));
        let local = parse_iso_millis(Some("2024-01-01T00:00:00.000Z"));
        assert_eq!(decide(false, remote, local), None);
        assert_eq!(decide(false, local, remote), Some(PullReason::RemoteNewerOrEqual));
    }

    #[test]
    fn test_error_status() {
        assert_eq!(SyncError::Transport(TransportError::Status(401)).status(), Some(401));
        assert_eq!(SyncError::NotConnected.status(), None);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = PullOutcome {
            applied: true,
            reason: PullReason::RemoteNewerOrEqual,
            remote_updated: 5,
            local_updated: 5,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["reason"], "remote-newer-or-equal");
        assert_eq!(json["remoteUpdated"], 5);
    }
}
