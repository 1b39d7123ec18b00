//! Configuration for the planner core.
//!
//! `PlannerConfig` holds the fixed names the core uses to address storage and
//! the remote document. The defaults match the keys existing installations
//! already use, so hosts normally pass nothing; a host can override any field
//! (e.g. to isolate test data) when constructing the store.
//!
//! User-editable sync settings live in [`SyncConfig`], which is persisted in
//! the durable store rather than supplied by the host.

use serde::{Deserialize, Serialize};

/// Key for the planner document in the durable store.
pub const DOCUMENT_KEY: &str = "planner.data.v1";
/// Key for the sync configuration in the durable store.
pub const SYNC_KEY: &str = "planner.sync.v1";
/// Key for the auto-pull flag in the session store.
pub const AUTO_PULL_SESSION_KEY: &str = "planner.autoPulled.v1";
/// Name of the planner's file inside the remote document.
pub const REMOTE_FILENAME: &str = "planner-data.json";
/// Suggested file name for exported backups.
pub const BACKUP_FILENAME: &str = "planner-backup.json";
/// Base URL of the GitHub REST API.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Storage keys and remote names used by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlannerConfig {
    pub document_key: String,
    pub sync_key: String,
    pub session_key: String,
    /// Exact file name matched inside the remote document.
    pub remote_filename: String,
    pub api_base_url: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            document_key: DOCUMENT_KEY.to_string(),
            sync_key: SYNC_KEY.to_string(),
            session_key: AUTO_PULL_SESSION_KEY.to_string(),
            remote_filename: REMOTE_FILENAME.to_string(),
            api_base_url: GITHUB_API_URL.to_string(),
        }
    }
}

/// Sync settings entered by the user.
///
/// Stored as `{remoteId, token, autoPull}`. Older installations wrote the
/// remote id as `gistId`, which is still accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    #[serde(default, alias = "gistId")]
    pub remote_id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_auto_pull")]
    pub auto_pull: bool,
}

fn default_auto_pull() -> bool {
    true
}

impl SyncConfig {
    pub fn new(remote_id: impl Into<String>, token: impl Into<String>, auto_pull: bool) -> Self {
        Self {
            remote_id: remote_id.into().trim().to_string(),
            token: token.into().trim().to_string(),
            auto_pull,
        }
    }

    /// True when both the remote id and the token are present.
    pub fn is_connected(&self) -> bool {
        !self.remote_id.trim().is_empty() && !self.token.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys() {
        let config = PlannerConfig::default();
        assert_eq!(config.document_key, "planner.data.v1");
        assert_eq!(config.sync_key, "planner.sync.v1");
        assert_eq!(config.remote_filename, "planner-data.json");
    }

    #[test]
    fn test_partial_override() {
        let config: PlannerConfig =
            serde_json::from_str(r#"{"documentKey":"test.data"}"#).unwrap();
        assert_eq!(config.document_key, "test.data");
        assert_eq!(config.sync_key, SYNC_KEY);
    }

    #[test]
    fn test_sync_config_legacy_field() {
        let cfg: SyncConfig = serde_json::from_str(r#"{"gistId":"abc","token":"t"}"#).unwrap();
        assert_eq!(cfg.remote_id, "abc");
        assert!(cfg.auto_pull);
        assert!(cfg.is_connected());
    }

    #[test]
    fn test_connected_requires_both_fields() {
        assert!(!SyncConfig::new("abc", "", true).is_connected());
        assert!(!SyncConfig::new("", "tok", true).is_connected());
        assert!(!SyncConfig::new("  ", "tok", true).is_connected());
        assert!(SyncConfig::new(" abc ", " tok ", false).is_connected());
    }

    #[test]
    fn test_auto_pull_disabled() {
        let cfg = SyncConfig::new("abc", "tok", false);
        assert!(cfg.is_connected());
        assert!(!cfg.auto_pull);
    }

    #[test]
    fn test_serializes_current_field_names() {
        let json = serde_json::to_string(&SyncConfig::new("abc", "tok", true)).unwrap();
        assert!(json.contains("\"remoteId\":\"abc\""));
        assert!(json.contains("\"autoPull\":true"));
    }
}
