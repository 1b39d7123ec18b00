//! RemoteTransport trait for the shared remote document.
//!
//! Implementations:
//! - `GistTransport` - GitHub Gist REST API (feature `gist`)
//! - `MemoryRemote` - In-process fake for tests and offline hosts
//!
//! A remote document is a set of named files. The planner only ever reads and
//! replaces the one file whose name matches its configured filename.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Remote request failed with status {0}")]
    Status(u16),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed remote response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// HTTP status carried by the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status(code) => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// One file inside a remote document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// A fetched remote document: files keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDocument {
    #[serde(default)]
    pub files: BTreeMap<String, RemoteFile>,
}

impl RemoteDocument {
    pub fn with_file(name: &str, content: impl Into<String>) -> Self {
        let mut doc = Self::default();
        doc.files.insert(
            name.to_string(),
            RemoteFile {
                filename: Some(name.to_string()),
                content: Some(content.into()),
            },
        );
        doc
    }

    /// Content of the file whose `filename` is exactly `name`. Entries without
    /// a `filename` are matched by their key.
    ///
    /// Files with no content count as missing.
    pub fn find_file(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|(key, f)| f.filename.as_deref().unwrap_or(key.as_str()) == name)
            .and_then(|(_, f)| f.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}

/// Access to the remote document holding the planner file.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait RemoteTransport {
    /// Fetch the remote document with all of its files.
    async fn fetch(&self, remote_id: &str, token: &str) -> Result<RemoteDocument>;

    /// Replace the content of one named file, creating it if needed.
    async fn replace_file(
        &self,
        remote_id: &str,
        token: &str,
        filename: &str,
        content: &str,
    ) -> Result<()>;
}

// ========== In-memory remote ==========

/// In-process remote holding a single document.
///
/// Counts requests and can be told to fail with a status code, which is all the
/// reconciliation tests need.
#[derive(Default)]
pub struct MemoryRemote {
    document: Mutex<RemoteDocument>,
    fail_status: Mutex<Option<u16>>,
    fetches: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: RemoteDocument) -> Self {
        Self {
            document: Mutex::new(document),
            ..Self::default()
        }
    }

    /// Make every following request fail with `status`, or succeed again with `None`.
    pub fn fail_with(&self, status: Option<u16>) {
        *self.fail_status.lock().unwrap_or_else(|e| e.into_inner()) = status;
    }

    pub fn document(&self) -> RemoteDocument {
        self.document
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_document(&self, document: RemoteDocument) {
        *self.document.lock().unwrap_or_else(|e| e.into_inner()) = document;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    fn check_failure(&self) -> Result<()> {
        match *self.fail_status.lock().unwrap_or_else(|e| e.into_inner()) {
            Some(status) => Err(TransportError::Status(status)),
            None => Ok(()),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RemoteTransport for MemoryRemote {
    async fn fetch(&self, _remote_id: &str, _token: &str) -> Result<RemoteDocument> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;
        Ok(self.document())
    }

    async fn replace_file(
        &self,
        _remote_id: &str,
        _token: &str,
        filename: &str,
        content: &str,
    ) -> Result<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;
        let mut document = self.document.lock().unwrap_or_else(|e| e.into_inner());
        document.files.insert(
            filename.to_string(),
            RemoteFile {
                filename: Some(filename.to_string()),
                content: Some(content.to_string()),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_file_exact_match() {
        let mut doc = RemoteDocument::with_file("planner-data.json", "{}");
        doc.files.insert(
            "Planner-Data.json".into(),
            RemoteFile {
                filename: Some("Planner-Data.json".into()),
                content: Some("[]".into()),
            },
        );
        assert_eq!(doc.find_file("planner-data.json"), Some("{}"));
        assert_eq!(doc.find_file("planner-data"), None);
    }

    #[test]
    fn test_find_file_falls_back_to_key() {
        let json = r#"{"files":{"planner-data.json":{"content":"{\"a\":1}"}}}"#;
        let doc: RemoteDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.find_file("planner-data.json"), Some("{\"a\":1}"));
        assert_eq!(doc.find_file("other.json"), None);
    }

    #[test]
    fn test_empty_content_counts_as_missing() {
        let doc = RemoteDocument::with_file("planner-data.json", "");
        assert_eq!(doc.find_file("planner-data.json"), None);
    }

    #[test]
    fn test_remote_document_parses_gist_shape() {
        let json = r#"{"id":"abc","files":{"planner-data.json":{"filename":"planner-data.json","size":2,"content":"{}"}}}"#;
        let doc: RemoteDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.find_file("planner-data.json"), Some("{}"));
    }

    #[tokio::test]
    async fn test_memory_remote_replace_and_fetch() {
        let remote = MemoryRemote::new();
        remote
            .replace_file("id", "tok", "planner-data.json", "{\"a\":1}")
            .await
            .unwrap();
        let doc = remote.fetch("id", "tok").await.unwrap();
        assert_eq!(doc.find_file("planner-data.json"), Some("{\"a\":1}"));
        assert_eq!(remote.fetch_count(), 1);
        assert_eq!(remote.write_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_remote_failure_status() {
        let remote = MemoryRemote::new();
        remote.fail_with(Some(404));
        let err = remote.fetch("id", "tok").await.unwrap_err();
        assert_eq!(err.status(), Some(404));

        remote.fail_with(None);
        assert!(remote.fetch("id", "tok").await.is_ok());
    }
}
