//! planner-core: storage, schema migration and remote sync for the planner.
//!
//! This crate provides the core functionality for:
//! - The planner document schema and migration of older stored shapes
//! - Local persistence through an injected key-value store
//! - Last-write-wins reconciliation with a remote copy (GitHub Gist)
//! - A once-per-session auto-pull guard
//! - The planner's own operations (captures, threads, weekly focus, life map)

pub mod config;
pub mod document;
pub mod events;
pub mod gateway;
#[cfg(feature = "gist")]
pub mod gist;
pub mod migrate;
pub mod planner;
pub mod remote;
pub mod session;
pub mod store;
pub mod sync;
pub mod time;

pub use config::{PlannerConfig, SyncConfig};
pub use document::{
    CaptureItem, CaptureStatus, Document, Goal, Horizon, HorizonKind, LifeMap, Thread,
    ThreadStatus, Urgency, Weekly,
};
pub use events::{EventBus, PlannerEvent, SharedEventBus, Subscription};
pub use gateway::{ImportError, LoadError, PlannerStore, SaveError};
#[cfg(feature = "gist")]
pub use gist::GistTransport;
pub use migrate::{LifeMapShape, migrate, parse_and_migrate};
pub use planner::{Checkpoint, DomainCategory, FocusSlot, PlannerError, ThreadUpdate};
pub use remote::{MemoryRemote, RemoteDocument, RemoteFile, RemoteTransport, TransportError};
pub use session::{AutoPullGuard, AutoPullOutcome, SkipReason, auto_pull, disconnect};
pub use store::{KeyValueStore, MemoryStore, StoreError};
pub use sync::{PullOutcome, PullReason, SyncEngine, SyncError};
