//! Global value store.
//!
//! Setup-time constants exposed to every template through
//! `{{ global(key="...") }}`. Values are kept as tagged [`Value`]s, so a
//! template always sees the type the value was stored with. Lookups are
//! try-lookups: an absent key is `None`, never an error.

use std::collections::HashMap;

use serde::Serialize;
use tera::Value;

use crate::error::GlobalError;

/// Reserved key holding the canonical base path.
pub const BASE_PATH_KEY: &str = "basepath";

/// Key → value table, written during setup and read-only while serving.
#[derive(Debug, Clone, Default)]
pub struct GlobalStore {
    values: HashMap<String, Value>,
}

impl GlobalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), GlobalError> {
        let value = tera::to_value(value).map_err(|source| GlobalError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    pub(crate) fn set_value(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    pub fn try_get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Typed lookup: `None` when the key is absent or not a string.
    pub fn try_get_str(&self, key: &str) -> Option<&str> {
        self.try_get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Normalize a root URL path to the stored base path form: a leading `/`,
/// and the bare root `/` stored as the empty string.
pub(crate) fn normalize_base_path(root_path: &str) -> String {
    let base = if root_path.starts_with('/') {
        root_path.to_string()
    } else {
        format!("/{root_path}")
    };
    if base == "/" {
        String::new()
    } else {
        base
    }
}

/// External form of a stored base path: the empty root reads as `/`.
pub(crate) fn external_base_path(stored: &str) -> &str {
    if stored.is_empty() {
        "/"
    } else {
        stored
    }
}
