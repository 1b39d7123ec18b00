//! WASM bindings for planner-core.
//!
//! Provides the bridge between the planner's browser pages and Rust
//! (planner-core).
//!
//! # Architecture
//!
//! The page creates two `JsStorageBridge`s with callbacks over `localStorage`
//! and `sessionStorage`. Each bridge implements the `KeyValueStore` trait,
//! so the Rust `PlannerStore` and `AutoPullGuard` read and write browser
//! storage through JavaScript. Remote sync goes over the Gist REST API.
//!
//! ```text
//! JavaScript                    WASM (Rust)
//! ──────────                    ───────────
//! localStorage ──callbacks──> JsStorageBridge ──> PlannerStore ─┐
//!                                                               ▼
//!                                         SyncEngine<_, GistTransport>
//!                                                               │
//! sessionStorage ─callbacks──> JsStorageBridge ──> AutoPullGuard │
//!                                                               ▼
//!                                                  WasmPlanner (exposed to JS)
//! ```
//!
//! **Note**: This crate only compiles for `wasm32` targets. When building for native
//! targets (e.g., during `cargo check --workspace`), this crate provides no exports.

#[cfg(target_arch = "wasm32")]
mod storage_bridge;

#[cfg(target_arch = "wasm32")]
pub use storage_bridge::JsStorageBridge;

// ============================================================================
// All WASM-specific code is gated behind target_arch = "wasm32"
// This allows `cargo check --workspace` to succeed on native targets.
// ============================================================================

#[cfg(target_arch = "wasm32")]
mod wasm_impl {
    use super::*;
    use planner_core::{
        AutoPullGuard, Document, FocusSlot, GistTransport, HorizonKind, PlannerConfig,
        PlannerError, PlannerEvent, PlannerStore, SyncConfig, SyncEngine, ThreadStatus,
        ThreadUpdate, Urgency,
    };
    use serde::{Deserialize, Serialize};
    use std::cell::RefCell;
    use tracing_subscriber::layer::SubscriberExt;
    use wasm_bindgen::prelude::*;

    // ========== Callback Logger Layer ==========

    // WASM is single-threaded, so the callback lives in a thread local
    thread_local! {
        static LOGGER_CALLBACK: RefCell<Option<js_sys::Function>> = const { RefCell::new(None) };
    }

    /// A tracing layer that invokes a JavaScript callback for each log event.
    struct JsCallbackLayer;

    impl<S> tracing_subscriber::Layer<S> for JsCallbackLayer
    where
        S: tracing::Subscriber,
    {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            LOGGER_CALLBACK.with(|cb| {
                if let Some(callback) = cb.borrow().as_ref() {
                    let metadata = event.metadata();

                    let mut visitor = MessageVisitor::default();
                    event.record(&mut visitor);

                    let timestamp = web_time::SystemTime::now()
                        .duration_since(web_time::UNIX_EPOCH)
                        .map(|d| d.as_millis() as f64)
                        .unwrap_or(0.0);

                    let js_event = js_sys::Object::new();
                    let _ = js_sys::Reflect::set(&js_event, &"level".into(), &metadata.level().as_str().into());
                    let _ = js_sys::Reflect::set(&js_event, &"target".into(), &metadata.target().into());
                    let _ = js_sys::Reflect::set(&js_event, &"message".into(), &visitor.message.into());
                    let _ = js_sys::Reflect::set(&js_event, &"timestamp".into(), &timestamp.into());

                    let _ = callback.call1(&JsValue::NULL, &js_event);
                }
            });
        }
    }

    /// Collects the `message` field plus any other fields as `key=value`.
    #[derive(Default)]
    struct MessageVisitor {
        message: String,
    }

    impl MessageVisitor {
        fn push_field(&mut self, name: &str, value: String) {
            if name == "message" {
                self.message = if self.message.is_empty() {
                    value
                } else {
                    format!("{} {}", value, self.message)
                };
            } else {
                if !self.message.is_empty() {
                    self.message.push(' ');
                }
                self.message.push_str(&format!("{}={}", name, value));
            }
        }
    }

    impl tracing::field::Visit for MessageVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            self.push_field(field.name(), format!("{:?}", value));
        }

        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            self.push_field(field.name(), value.to_string());
        }
    }

    /// Initialize the WASM module (sets up panic hook and tracing).
    ///
    /// Accepts an optional configuration object:
    /// - `init()` - console-only logging (default)
    /// - `init({ logger: (event) => {...} })` - callback + console logging
    ///
    /// The logger callback receives events with: `{ level, target, message, timestamp }`
    #[wasm_bindgen]
    pub fn init(config: Option<js_sys::Object>) {
        console_error_panic_hook::set_once();

        let callback = config
            .as_ref()
            .and_then(|cfg| js_sys::Reflect::get(cfg, &"logger".into()).ok())
            .and_then(|v| v.dyn_into::<js_sys::Function>().ok());

        let console_config = tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::DEBUG)
            .build();

        match callback {
            Some(cb) => {
                LOGGER_CALLBACK.with(|cell| {
                    *cell.borrow_mut() = Some(cb);
                });
                let subscriber = tracing_subscriber::registry()
                    .with(JsCallbackLayer)
                    .with(tracing_wasm::WASMLayer::new(console_config));
                tracing::subscriber::set_global_default(subscriber).ok();
            }
            None => tracing_wasm::set_as_global_default_with_config(console_config),
        }

        log("planner-wasm initialized");
    }

    /// Get version string
    #[wasm_bindgen]
    pub fn version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// Suggested file name for a downloaded backup.
    #[wasm_bindgen(js_name = backupFilename)]
    pub fn backup_filename() -> String {
        planner_core::config::BACKUP_FILENAME.to_string()
    }

    /// CSS class for a free-text domain, e.g. `domain-health`.
    #[wasm_bindgen(js_name = domainClass)]
    pub fn domain_class(domain: &str) -> String {
        planner_core::DomainCategory::classify(domain)
            .css_class()
            .to_string()
    }

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = console)]
        pub fn log(s: &str);
    }

    // ========== Conversions ==========

    fn js_err(err: impl std::fmt::Display) -> JsError {
        JsError::new(&err.to_string())
    }

    /// Serialize as plain JS objects (maps become objects, not `Map`s).
    fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
        value
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(js_err)
    }

    fn parse_horizon(raw: &str) -> Result<HorizonKind, JsError> {
        HorizonKind::ALL
            .into_iter()
            .find(|kind| kind.key() == raw.trim())
            .ok_or_else(|| JsError::new(&format!("Unknown horizon: {}", raw)))
    }

    /// Thread fields editable from the registry page.
    #[derive(Default, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    struct ThreadUpdateJs {
        next_action: Option<String>,
        notes: Option<String>,
        status: Option<String>,
    }

    impl From<ThreadUpdateJs> for ThreadUpdate {
        fn from(js: ThreadUpdateJs) -> Self {
            ThreadUpdate {
                next_action: js.next_action,
                notes: js.notes,
                status: js.status.as_deref().map(ThreadStatus::parse),
            }
        }
    }

    // ========== WASM Subscription Handle ==========

    /// Subscription handle exposed to JavaScript.
    ///
    /// Call `dispose()` to unsubscribe, or let the JS garbage collector
    /// collect it (the Rust Drop will run via FinalizationRegistry).
    #[wasm_bindgen]
    pub struct WasmSubscription {
        inner: RefCell<Option<planner_core::Subscription>>,
    }

    #[wasm_bindgen]
    impl WasmSubscription {
        /// Unsubscribe from events. Safe to call multiple times.
        pub fn dispose(&self) {
            self.inner.borrow_mut().take();
        }
    }

    /// Planner exposed to the browser pages.
    ///
    /// Wraps the core `PlannerStore`, `SyncEngine` and `AutoPullGuard`.
    /// Document-editing methods load, apply one operation and save, so every
    /// call leaves storage up to date.
    #[wasm_bindgen]
    pub struct WasmPlanner {
        engine: SyncEngine<JsStorageBridge, GistTransport>,
        guard: AutoPullGuard<JsStorageBridge>,
    }

    impl WasmPlanner {
        fn store(&self) -> &PlannerStore<JsStorageBridge> {
            self.engine.store()
        }

        fn mutate<R>(
            &self,
            op: impl FnOnce(&mut Document) -> Result<R, PlannerError>,
        ) -> Result<R, JsError> {
            let mut doc = self.store().load();
            let result = op(&mut doc).map_err(js_err)?;
            self.store().save(&mut doc).map_err(js_err)?;
            Ok(result)
        }
    }

    #[wasm_bindgen]
    impl WasmPlanner {
        /// Create a planner over durable and session storage.
        ///
        /// `config` optionally overrides storage keys, the remote filename or
        /// the API base URL, e.g. `{ documentKey: "test.planner" }`.
        #[wasm_bindgen(constructor)]
        pub fn new(
            durable: JsStorageBridge,
            session: JsStorageBridge,
            config: JsValue,
        ) -> Result<WasmPlanner, JsError> {
            let config: PlannerConfig = if config.is_undefined() || config.is_null() {
                PlannerConfig::default()
            } else {
                serde_wasm_bindgen::from_value(config).map_err(js_err)?
            };

            let guard = AutoPullGuard::with_key(session, config.session_key.clone());
            let transport = GistTransport::new(config.api_base_url.clone());
            let store = PlannerStore::with_config(durable, config);

            Ok(WasmPlanner {
                engine: SyncEngine::new(store, transport),
                guard,
            })
        }

        // ========== Document ==========

        /// Load the migrated document. Never throws on bad stored data.
        pub fn load(&self) -> Result<JsValue, JsError> {
            to_js(&self.store().load())
        }

        /// Save a document edited on the JS side. Returns the saved form.
        pub fn save(&self, doc: JsValue) -> Result<JsValue, JsError> {
            let value: serde_json::Value = serde_wasm_bindgen::from_value(doc).map_err(js_err)?;
            let mut doc = planner_core::migrate(value);
            self.store().save(&mut doc).map_err(js_err)?;
            to_js(&doc)
        }

        #[wasm_bindgen(js_name = exportBackup)]
        pub fn export_backup(&self) -> Result<String, JsError> {
            self.store().export_backup().map_err(js_err)
        }

        /// Replace local data with an uploaded backup. Throws on malformed JSON.
        #[wasm_bindgen(js_name = importBackup)]
        pub fn import_backup(&self, raw: &str) -> Result<(), JsError> {
            self.store().import_backup(raw).map_err(js_err)
        }

        // ========== Sync settings ==========

        /// Stored sync settings, or `null`.
        #[wasm_bindgen(js_name = syncConfig)]
        pub fn sync_config(&self) -> Result<JsValue, JsError> {
            match self.store().sync_config() {
                Some(config) => to_js(&config),
                None => Ok(JsValue::NULL),
            }
        }

        #[wasm_bindgen(js_name = saveSyncConfig)]
        pub fn save_sync_config(
            &self,
            remote_id: &str,
            token: &str,
            auto_pull: bool,
        ) -> Result<(), JsError> {
            self.store()
                .save_sync_config(&SyncConfig::new(remote_id, token, auto_pull))
                .map_err(js_err)
        }

        /// Forget sync settings and allow the next session to auto-pull.
        #[wasm_bindgen(js_name = clearSyncConfig)]
        pub fn clear_sync_config(&self) -> Result<(), JsError> {
            planner_core::disconnect(self.store(), &self.guard).map_err(js_err)
        }

        #[wasm_bindgen(js_name = isConnected)]
        pub fn is_connected(&self) -> bool {
            self.store().is_connected()
        }

        // ========== Sync ==========

        /// Pull the remote copy. Resolves to `{ applied, reason, remoteUpdated, localUpdated }`.
        pub async fn pull(&self, force: Option<bool>) -> Result<JsValue, JsError> {
            let outcome = self
                .engine
                .pull(force.unwrap_or(false))
                .await
                .map_err(js_err)?;
            to_js(&outcome)
        }

        /// Overwrite the remote copy with the local document.
        pub async fn push(&self) -> Result<(), JsError> {
            self.engine.push().await.map_err(js_err)
        }

        /// Pull once per session if enabled. Never throws.
        ///
        /// Resolves to `{ status, detail }`; reload the view when `status` is
        /// `"applied"`.
        #[wasm_bindgen(js_name = autoPull)]
        pub async fn auto_pull(&self) -> Result<JsValue, JsError> {
            let outcome = planner_core::auto_pull(&self.engine, &self.guard).await;
            to_js(&outcome)
        }

        /// Subscribe to sync events (`pullCompleted`, `pushCompleted`, `syncFailed`).
        pub fn subscribe(&self, callback: js_sys::Function) -> WasmSubscription {
            let rust_closure = move |event: PlannerEvent| {
                if let Ok(js_event) = to_js(&event) {
                    let _ = callback.call1(&JsValue::NULL, &js_event);
                }
            };

            WasmSubscription {
                inner: RefCell::new(Some(self.engine.events().subscribe(rust_closure))),
            }
        }

        // ========== Capture & triage ==========

        /// Add an inbox item. Returns its id.
        pub fn capture(&self, text: &str) -> Result<String, JsError> {
            self.mutate(|doc| doc.capture(text))
        }

        #[wasm_bindgen(js_name = archiveCapture)]
        pub fn archive_capture(&self, id: &str) -> Result<(), JsError> {
            self.mutate(|doc| doc.archive_capture(id))
        }

        #[wasm_bindgen(js_name = archiveAllCaptures)]
        pub fn archive_all_captures(&self) -> Result<usize, JsError> {
            self.mutate(|doc| Ok(doc.archive_all_captures()))
        }

        #[wasm_bindgen(js_name = openCaptures)]
        pub fn open_captures(&self) -> Result<JsValue, JsError> {
            to_js(&self.store().load().open_captures())
        }

        /// Make a thread from a capture. Returns the thread id.
        #[wasm_bindgen(js_name = promoteCapture)]
        pub fn promote_capture(&self, id: &str) -> Result<String, JsError> {
            self.mutate(|doc| doc.promote_capture(id))
        }

        #[wasm_bindgen(js_name = appendCaptureToThread)]
        pub fn append_capture_to_thread(&self, id: &str, thread_title: &str) -> Result<String, JsError> {
            self.mutate(|doc| doc.append_capture_to_thread(id, thread_title))
        }

        // ========== Threads ==========

        #[wasm_bindgen(js_name = addThread)]
        pub fn add_thread(&self, title: &str, domain: &str, next_action: &str) -> Result<String, JsError> {
            self.mutate(|doc| doc.add_thread(title, domain, next_action))
        }

        /// Apply `{ nextAction?, notes?, status? }` to a thread.
        #[wasm_bindgen(js_name = updateThread)]
        pub fn update_thread(&self, id: &str, update: JsValue) -> Result<(), JsError> {
            let update: ThreadUpdateJs = serde_wasm_bindgen::from_value(update).map_err(js_err)?;
            self.mutate(|doc| doc.update_thread(id, update.into()))
        }

        #[wasm_bindgen(js_name = activeThreads)]
        pub fn active_threads(&self) -> Result<JsValue, JsError> {
            to_js(&self.store().load().active_threads())
        }

        #[wasm_bindgen(js_name = focusThread)]
        pub fn focus_thread(&self, id: &str) -> Result<(), JsError> {
            self.mutate(|doc| doc.focus_thread(id))
        }

        /// Set weekly slot 1 or 2, or clear it with `null`.
        #[wasm_bindgen(js_name = setFocusSlot)]
        pub fn set_focus_slot(&self, slot: u8, thread_id: Option<String>) -> Result<(), JsError> {
            let slot = match slot {
                1 => FocusSlot::First,
                2 => FocusSlot::Second,
                other => return Err(JsError::new(&format!("Unknown slot: {}", other))),
            };
            self.mutate(|doc| doc.set_focus_slot(slot, thread_id.as_deref()))
        }

        /// Roll the weekly slots to this Monday. Returns the `weekOf` date.
        #[wasm_bindgen(js_name = ensureWeekOf)]
        pub fn ensure_week_of(&self) -> Result<String, JsError> {
            let mut doc = self.store().load();
            if doc.ensure_week_of(planner_core::time::today()) {
                self.store().save(&mut doc).map_err(js_err)?;
            }
            Ok(doc.weekly.week_of.unwrap_or_default())
        }

        // ========== Life map ==========

        #[wasm_bindgen(js_name = addDomain)]
        pub fn add_domain(&self, name: &str) -> Result<(), JsError> {
            self.mutate(|doc| doc.add_domain(name))
        }

        #[wasm_bindgen(js_name = removeDomain)]
        pub fn remove_domain(&self, name: &str) -> Result<usize, JsError> {
            self.mutate(|doc| doc.remove_domain(name).map(|goals| goals.len()))
        }

        /// Add a goal to `"week"`, `"month"` or `"quarter"`. Returns its id.
        #[wasm_bindgen(js_name = addGoal)]
        pub fn add_goal(
            &self,
            horizon: &str,
            domain: &str,
            title: &str,
            urgency: Option<String>,
        ) -> Result<String, JsError> {
            let kind = parse_horizon(horizon)?;
            let urgency = urgency.as_deref().and_then(Urgency::parse);
            self.mutate(|doc| doc.add_goal(kind, domain, title, urgency))
        }

        #[wasm_bindgen(js_name = moveGoal)]
        pub fn move_goal(&self, goal_id: &str, horizon: &str) -> Result<(), JsError> {
            let kind = parse_horizon(horizon)?;
            self.mutate(|doc| doc.move_goal(goal_id, kind))
        }

        /// Move a goal one horizon nearer. Returns the new horizon or `undefined`.
        #[wasm_bindgen(js_name = promoteGoal)]
        pub fn promote_goal(&self, goal_id: &str) -> Result<Option<String>, JsError> {
            self.mutate(|doc| doc.promote_goal(goal_id))
                .map(|kind| kind.map(|k| k.key().to_string()))
        }

        /// Move a goal one horizon further out. Returns the new horizon or `undefined`.
        #[wasm_bindgen(js_name = demoteGoal)]
        pub fn demote_goal(&self, goal_id: &str) -> Result<Option<String>, JsError> {
            self.mutate(|doc| doc.demote_goal(goal_id))
                .map(|kind| kind.map(|k| k.key().to_string()))
        }

        #[wasm_bindgen(js_name = removeGoal)]
        pub fn remove_goal(&self, goal_id: &str) -> Result<(), JsError> {
            self.mutate(|doc| doc.remove_goal(goal_id).map(|_| ()))
        }

        // ========== Income map ==========

        #[wasm_bindgen(js_name = setIncomeStart)]
        pub fn set_income_start(&self, start: Option<String>) -> Result<(), JsError> {
            self.mutate(|doc| doc.set_income_start(start.as_deref()))
        }

        /// Current program week, or `undefined` without a start date.
        #[wasm_bindgen(js_name = incomeWeek)]
        pub fn income_week(&self) -> Option<u32> {
            self.store().load().income_week(planner_core::time::today())
        }

        pub fn checkpoints(&self) -> Result<JsValue, JsError> {
            to_js(&self.store().load().checkpoints(planner_core::time::today()))
        }
    }
}

// Re-export wasm_impl contents at crate root for wasm32 targets
#[cfg(target_arch = "wasm32")]
pub use wasm_impl::*;
