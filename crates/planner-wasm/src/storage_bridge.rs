//! JavaScript storage bridge for WASM.
//!
//! Implements the `KeyValueStore` trait by calling JavaScript callback
//! functions provided by the host page. Browser storage is synchronous, so
//! the callbacks are plain functions, not Promises.

use planner_core::store::{KeyValueStore, Result, StoreError};
use wasm_bindgen::prelude::*;

/// JavaScript key-value storage bridge.
///
/// Holds JS callback functions for storage operations. The page creates one
/// over `localStorage` for the planner data and one over `sessionStorage` for
/// the auto-pull flag.
///
/// # Example (TypeScript side)
///
/// ```typescript
/// const durable = new JsStorageBridge(
///   (key) => localStorage.getItem(key),
///   (key, value) => localStorage.setItem(key, value),
///   (key) => localStorage.removeItem(key),
/// );
/// ```
#[wasm_bindgen]
pub struct JsStorageBridge {
    get_fn: js_sys::Function,
    set_fn: js_sys::Function,
    remove_fn: js_sys::Function,
}

#[wasm_bindgen]
impl JsStorageBridge {
    /// Create a new storage bridge with JS callback functions.
    #[wasm_bindgen(constructor)]
    pub fn new(
        get_fn: js_sys::Function,
        set_fn: js_sys::Function,
        remove_fn: js_sys::Function,
    ) -> Self {
        Self {
            get_fn,
            set_fn,
            remove_fn,
        }
    }
}

/// Convert a thrown JS value to our StoreError type.
fn js_err_to_store_err(key: &str, err: JsValue) -> StoreError {
    let field = |name: &str| {
        js_sys::Reflect::get(&err, &name.into())
            .ok()
            .and_then(|v| v.as_string())
    };
    let name = field("name").unwrap_or_default();
    let msg = err
        .as_string()
        .or_else(|| field("message"))
        .unwrap_or_else(|| format!("{:?}", err));

    if name == "QuotaExceededError" || msg.contains("quota") {
        StoreError::QuotaExceeded(key.to_string())
    } else if name == "SecurityError" {
        StoreError::Unavailable(msg)
    } else {
        StoreError::Other(msg)
    }
}

impl KeyValueStore for JsStorageBridge {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .get_fn
            .call1(&JsValue::NULL, &key.into())
            .map_err(|e| js_err_to_store_err(key, e))?;
        // getItem returns null for missing keys
        Ok(value.as_string())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_fn
            .call2(&JsValue::NULL, &key.into(), &value.into())
            .map_err(|e| js_err_to_store_err(key, e))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.remove_fn
            .call1(&JsValue::NULL, &key.into())
            .map_err(|e| js_err_to_store_err(key, e))?;
        Ok(())
    }
}
