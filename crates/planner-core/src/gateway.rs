//! Local persistence for the planner document and sync settings.
//!
//! `PlannerStore` is the only component that touches the durable store. It
//! keeps two records under fixed keys: the document and the sync
//! configuration. Every load runs the document through migration, and
//! [`PlannerStore::load`] never fails: unreadable data is replaced by a fresh
//! default so the planner always opens.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{PlannerConfig, SyncConfig};
use crate::document::Document;
use crate::migrate;
use crate::store::{KeyValueStore, StoreError};
use crate::time::now_iso;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Stored document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Planner document must be a JSON object")]
    NotAnObject,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Backup is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Could not save imported backup: {0}")]
    Save(#[from] SaveError),
}

/// Gateway between the planner and its durable key-value store.
pub struct PlannerStore<S: KeyValueStore> {
    store: S,
    config: PlannerConfig,
}

impl<S: KeyValueStore> PlannerStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, PlannerConfig::default())
    }

    pub fn with_config(store: S, config: PlannerConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// The underlying store.
    pub fn backend(&self) -> &S {
        &self.store
    }

    // ========== Document ==========

    /// Raw stored document text, exactly as written.
    pub fn load_raw(&self) -> Result<Option<String>, StoreError> {
        self.store.get(&self.config.document_key)
    }

    /// Load and migrate the document, reporting why if that fails.
    ///
    /// A missing document is not an error; it yields a fresh default.
    pub fn try_load(&self) -> Result<Document, LoadError> {
        match self.load_raw()? {
            Some(raw) => Ok(migrate::parse_and_migrate(&raw)?),
            None => {
                debug!("no stored planner document, using defaults");
                Ok(Document::new())
            }
        }
    }

    /// Load and migrate the document. Never fails.
    pub fn load(&self) -> Document {
        self.try_load().unwrap_or_else(|err| {
            warn!(%err, "stored planner document is unreadable, starting fresh");
            Document::new()
        })
    }

    /// Stamp `meta.updatedAt` with the current time and write the document.
    pub fn save(&self, doc: &mut Document) -> Result<(), SaveError> {
        doc.meta.updated_at = now_iso();
        let raw = serde_json::to_string(doc)?;
        self.store.set(&self.config.document_key, &raw)?;
        debug!(updated_at = %doc.meta.updated_at, bytes = raw.len(), "saved planner document");
        Ok(())
    }

    /// Save a document that has not been through migration (a pulled or
    /// imported copy). Its shape is not checked beyond being an object; the
    /// next [`load`](Self::load) migrates it.
    pub fn save_value(&self, mut value: Value) -> Result<(), SaveError> {
        let obj = value.as_object_mut().ok_or(SaveError::NotAnObject)?;
        let now = Value::String(now_iso());
        match obj.get_mut("meta") {
            Some(Value::Object(meta)) => {
                meta.insert("updatedAt".to_string(), now);
            }
            _ => {
                let mut meta = Map::new();
                meta.insert("updatedAt".to_string(), now);
                obj.insert("meta".to_string(), Value::Object(meta));
            }
        }
        let raw = serde_json::to_string(&value)?;
        self.store.set(&self.config.document_key, &raw)?;
        debug!(bytes = raw.len(), "saved unmigrated planner document");
        Ok(())
    }

    // ========== Backup ==========

    /// Pretty-printed current document, ready to download as a backup.
    pub fn export_backup(&self) -> serde_json::Result<String> {
        self.load().to_pretty_json()
    }

    /// Replace the local document with an uploaded backup.
    ///
    /// Malformed JSON is rejected and leaves local state untouched. Anything
    /// that parses is saved as is and repaired by migration on the next load.
    pub fn import_backup(&self, raw: &str) -> Result<(), ImportError> {
        let value: Value = serde_json::from_str(raw)?;
        self.save_value(value)?;
        Ok(())
    }

    // ========== Sync configuration ==========

    /// Stored sync settings, `None` when absent or unreadable.
    pub fn sync_config(&self) -> Option<SyncConfig> {
        let raw = match self.store.get(&self.config.sync_key) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(%err, "could not read sync settings");
                return None;
            }
        };
        match serde_json::from_str::<Option<SyncConfig>>(&raw) {
            Ok(config) => config,
            Err(err) => {
                debug!(%err, "ignoring unreadable sync settings");
                None
            }
        }
    }

    pub fn save_sync_config(&self, config: &SyncConfig) -> Result<(), SaveError> {
        let trimmed = SyncConfig::new(&config.remote_id, &config.token, config.auto_pull);
        let raw = serde_json::to_string(&trimmed)?;
        self.store.set(&self.config.sync_key, &raw)?;
        Ok(())
    }

    /// Forget the sync settings on this device.
    ///
    /// Callers should also reset the session auto-pull guard; see
    /// [`crate::session::disconnect`].
    pub fn clear_sync_config(&self) -> Result<(), StoreError> {
        self.store.remove(&self.config.sync_key)
    }

    /// True when sync settings with both a remote id and a token are stored.
    pub fn is_connected(&self) -> bool {
        self.sync_config().is_some_and(|c| c.is_connected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{HorizonKind, ThreadStatus};
    use crate::store::MemoryStore;
    use crate::time::parse_iso_millis;
    use serde_json::json;

    fn store_with(raw: &str) -> PlannerStore<MemoryStore> {
        let store = PlannerStore::new(MemoryStore::new());
        store.backend().set("planner.data.v1", raw).unwrap();
        store
    }

    #[test]
    fn test_load_without_document_gives_default() {
        let store = PlannerStore::new(MemoryStore::new());
        let doc = store.load();
        assert!(doc.inbox.is_empty());
        assert_eq!(doc.meta.title, "Planner");
        // Loading does not write
        assert!(store.backend().is_empty());
    }

    #[test]
    fn test_load_malformed_falls_back() {
        let store = store_with("{definitely not json");
        assert!(matches!(store.try_load(), Err(LoadError::Parse(_))));
        let doc = store.load();
        assert!(doc.threads.is_empty());
    }

    #[test]
    fn test_save_refreshes_updated_at() {
        let store = PlannerStore::new(MemoryStore::new());
        let mut doc = store.load();
        doc.meta.updated_at = "2000-01-01T00:00:00.000Z".into();
        store.save(&mut doc).unwrap();

        assert!(parse_iso_millis(Some(&doc.meta.updated_at)) > 946_684_800_000);
        let reloaded = store.load();
        assert_eq!(reloaded.meta.updated_at, doc.meta.updated_at);
    }

    #[test]
    fn test_save_load_roundtrip_is_stable() {
        let store = store_with(
            &json!({
                "threads": [{"id": "t", "title": "T", "status": "Completed"}],
                "lifeMap": {"domains": [{"name": "Health", "notes": "do yoga"}]}
            })
            .to_string(),
        );
        let mut first = store.load();
        store.save(&mut first).unwrap();
        let second = store.load();
        assert_eq!(first, second);
        assert_eq!(second.threads[0].status, ThreadStatus::Archived);
    }

    #[test]
    fn test_legacy_life_map_loaded() {
        let store = store_with(&json!({"lifeMap": {"domains": [{"name": "Health", "notes": "do yoga"}]}}).to_string());
        let doc = store.load();
        let goals = &doc.life_map.horizons.get(HorizonKind::Quarter).domains["Health"];
        assert_eq!(goals[0].title, "Imported notes");
        assert_eq!(goals[0].notes, "do yoga");
    }

    #[test]
    fn test_save_value_stamps_meta() {
        let store = PlannerStore::new(MemoryStore::new());
        store.save_value(json!({"inbox": []})).unwrap();
        let raw: Value = serde_json::from_str(&store.load_raw().unwrap().unwrap()).unwrap();
        assert!(raw["meta"]["updatedAt"].is_string());

        assert!(matches!(store.save_value(json!([1, 2])), Err(SaveError::NotAnObject)));
    }

    #[test]
    fn test_import_rejects_malformed_and_keeps_state() {
        let store = PlannerStore::new(MemoryStore::new());
        let mut doc = store.load();
        doc.meta.title = "Mine".into();
        store.save(&mut doc).unwrap();
        let before = store.load_raw().unwrap();

        assert!(matches!(store.import_backup("{oops"), Err(ImportError::Parse(_))));
        assert_eq!(store.load_raw().unwrap(), before);
    }

    #[test]
    fn test_import_then_export() {
        let store = PlannerStore::new(MemoryStore::new());
        store
            .import_backup(r#"{"meta":{"title":"Imported"},"inbox":[{"id":"a","text":"hi","status":"open"}]}"#)
            .unwrap();
        let exported = store.export_backup().unwrap();
        assert!(exported.contains('\n'));
        let value: Value = serde_json::from_str(&exported).unwrap();
        assert_eq!(value["meta"]["title"], "Imported");
        assert_eq!(value["inbox"][0]["text"], "hi");
        assert!(value["lifeMap"]["horizons"]["quarter"].is_object());
    }

    #[test]
    fn test_sync_config_roundtrip() {
        let store = PlannerStore::new(MemoryStore::new());
        assert_eq!(store.sync_config(), None);
        assert!(!store.is_connected());

        store
            .save_sync_config(&SyncConfig::new(" gist ", " token ", false))
            .unwrap();
        let cfg = store.sync_config().unwrap();
        assert_eq!(cfg.remote_id, "gist");
        assert_eq!(cfg.token, "token");
        assert!(!cfg.auto_pull);
        assert!(store.is_connected());

        store.clear_sync_config().unwrap();
        assert_eq!(store.sync_config(), None);
    }

    #[test]
    fn test_invalid_sync_config_is_none() {
        let store = PlannerStore::new(MemoryStore::new());
        store.backend().set("planner.sync.v1", "{broken").unwrap();
        assert_eq!(store.sync_config(), None);
        store.backend().set("planner.sync.v1", "null").unwrap();
        assert_eq!(store.sync_config(), None);
    }

    #[test]
    fn test_custom_keys() {
        let config = PlannerConfig {
            document_key: "test.doc".into(),
            ..PlannerConfig::default()
        };
        let store = PlannerStore::with_config(MemoryStore::new(), config);
        let mut doc = store.load();
        store.save(&mut doc).unwrap();
        assert!(store.backend().get("test.doc").unwrap().is_some());
        assert!(store.backend().get("planner.data.v1").unwrap().is_none());
    }
}
