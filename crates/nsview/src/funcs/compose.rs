//! `global` and `yield`: the two functions that tie templates to the renderer.
//!
//! Both are silent-miss lookups. A missing global is null and a missing yield
//! target is the empty string, so optional composition slots need no guards.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use tera::{Function, Tera, Value};

use crate::globals::GlobalStore;
use crate::render::data_context;

/// Nesting limit for `yield` calls within one render.
pub const MAX_YIELD_DEPTH: usize = 32;

/// `global(key="...")`
#[derive(Debug)]
pub(crate) struct Global {
    store: Arc<GlobalStore>,
}

impl Global {
    pub(crate) fn new(store: Arc<GlobalStore>) -> Self {
        Self { store }
    }
}

impl Function for Global {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let key = args
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| tera::Error::msg("global expects a string `key` argument"))?;
        Ok(self.store.try_get(key).cloned().unwrap_or(Value::Null))
    }
}

/// `yield(name="...", data=...)`
pub(crate) struct Yield {
    set: Weak<OnceLock<Tera>>,
    depth: AtomicUsize,
}

impl Yield {
    pub(crate) fn new(set: Weak<OnceLock<Tera>>) -> Self {
        Self {
            set,
            depth: AtomicUsize::new(0),
        }
    }
}

impl std::fmt::Debug for Yield {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Yield")
            .field("depth", &self.depth.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

struct DepthGuard<'a>(&'a AtomicUsize);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

impl Function for Yield {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let name = args
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| tera::Error::msg("yield expects a string `name` argument"))?;
        let data = args.get("data").cloned().unwrap_or(Value::Null);

        let set = self
            .set
            .upgrade()
            .ok_or_else(|| tera::Error::msg("yield called outside of a render"))?;
        let tera = set
            .get()
            .ok_or_else(|| tera::Error::msg("yield called before the template set was compiled"))?;

        if !tera.get_template_names().any(|n| n == name) {
            return Ok(Value::String(String::new()));
        }

        let depth = self.depth.fetch_add(1, Ordering::Relaxed) + 1;
        let _guard = DepthGuard(&self.depth);
        if depth > MAX_YIELD_DEPTH {
            return Err(tera::Error::msg(format!(
                "yield of {name:?} exceeds maximum depth {MAX_YIELD_DEPTH}"
            )));
        }

        tera.render(name, &data_context(&data))
            .map(Value::String)
            .map_err(|e| tera::Error::chain(format!("yield {name:?}"), e))
    }

    // The yielded text was escaped by its own render.
    fn is_safe(&self) -> bool {
        true
    }
}
