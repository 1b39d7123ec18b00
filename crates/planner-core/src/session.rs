//! Once-per-session automatic pull.
//!
//! When the planner opens it may pull the remote copy once, without forcing.
//! `AutoPullGuard` remembers that the attempt was made in a session-scoped
//! store (the browser's `sessionStorage`), so reloading the page after an
//! applied pull does not pull again.

use serde::Serialize;
use std::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::AUTO_PULL_SESSION_KEY;
use crate::gateway::PlannerStore;
use crate::remote::RemoteTransport;
use crate::store::{KeyValueStore, StoreError};
use crate::sync::{PullOutcome, SyncEngine};

const CLAIMED: &str = "1";

/// One-shot flag over a session-scoped store. Starts unset.
pub struct AutoPullGuard<K: KeyValueStore> {
    session: K,
    key: String,
    claim: Mutex<()>,
}

impl<K: KeyValueStore> AutoPullGuard<K> {
    pub fn new(session: K) -> Self {
        Self::with_key(session, AUTO_PULL_SESSION_KEY)
    }

    pub fn with_key(session: K, key: impl Into<String>) -> Self {
        Self {
            session,
            key: key.into(),
            claim: Mutex::new(()),
        }
    }

    /// True once an auto-pull has been attempted in this session.
    pub fn has_run(&self) -> bool {
        matches!(self.session.get(&self.key), Ok(Some(v)) if v == CLAIMED)
    }

    /// Set the flag. Returns false if it was already set.
    ///
    /// The flag is set before the pull starts so a pull that reloads the page
    /// cannot trigger another one.
    pub fn try_claim(&self) -> bool {
        let _claim = self.claim.lock().unwrap_or_else(|e| e.into_inner());
        if self.has_run() {
            return false;
        }
        if let Err(err) = self.session.set(&self.key, CLAIMED) {
            warn!(%err, "could not record auto-pull in session storage");
        }
        true
    }

    /// Clear the flag so the next page load may auto-pull again.
    pub fn reset(&self) -> Result<(), StoreError> {
        self.session.remove(&self.key)
    }
}

/// Why an auto-pull was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    NotConfigured,
    Disabled,
    AlreadyRan,
}

/// What the page-load auto-pull did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "camelCase")]
pub enum AutoPullOutcome {
    Skipped(SkipReason),
    /// Remote data replaced the local document; the view should reload.
    Applied(PullOutcome),
    KeptLocal(PullOutcome),
    /// The pull failed. Local data is untouched.
    Failed(String),
}

impl AutoPullOutcome {
    pub fn should_reload(&self) -> bool {
        matches!(self, AutoPullOutcome::Applied(_))
    }
}

/// Pull once per session if sync is configured and auto-pull is enabled.
///
/// Never fails: errors are logged and reported as [`AutoPullOutcome::Failed`].
pub async fn auto_pull<S, T, K>(
    engine: &SyncEngine<S, T>,
    guard: &AutoPullGuard<K>,
) -> AutoPullOutcome
where
    S: KeyValueStore,
    T: RemoteTransport,
    K: KeyValueStore,
{
    let Some(config) = engine.store().sync_config().filter(|c| c.is_connected()) else {
        return AutoPullOutcome::Skipped(SkipReason::NotConfigured);
    };
    if !config.auto_pull {
        return AutoPullOutcome::Skipped(SkipReason::Disabled);
    }
    if !guard.try_claim() {
        debug!("auto-pull already ran this session");
        return AutoPullOutcome::Skipped(SkipReason::AlreadyRan);
    }

    match engine.pull(false).await {
        Ok(outcome) if outcome.applied => {
            info!("auto-pull applied remote changes");
            AutoPullOutcome::Applied(outcome)
        }
        Ok(outcome) => AutoPullOutcome::KeptLocal(outcome),
        Err(err) => {
            warn!(%err, "auto-pull failed");
            AutoPullOutcome::Failed(err.to_string())
        }
    }
}

/// Forget the sync settings and let the next session auto-pull again.
pub fn disconnect<S, K>(store: &PlannerStore<S>, guard: &AutoPullGuard<K>) -> Result<(), StoreError>
where
    S: KeyValueStore,
    K: KeyValueStore,
{
    store.clear_sync_config()?;
    guard.reset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_guard_claims_once() {
        let guard = AutoPullGuard::new(MemoryStore::new());
        assert!(!guard.has_run());
        assert!(guard.try_claim());
        assert!(guard.has_run());
        assert!(!guard.try_claim());
    }

    #[test]
    fn test_guard_reset() {
        let guard = AutoPullGuard::new(MemoryStore::new());
        assert!(guard.try_claim());
        guard.reset().unwrap();
        assert!(guard.try_claim());
    }

    #[test]
    fn test_guard_uses_session_key() {
        let session = std::sync::Arc::new(MemoryStore::new());
        let guard = AutoPullGuard::new(std::sync::Arc::clone(&session));
        guard.try_claim();
        assert_eq!(
            session.get("planner.autoPulled.v1").unwrap().as_deref(),
            Some("1")
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(AutoPullOutcome::Skipped(SkipReason::AlreadyRan)).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["detail"], "already-ran");
        assert!(!AutoPullOutcome::Failed("x".into()).should_reload());
    }
}
