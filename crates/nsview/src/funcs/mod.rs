//! Function library injected into every compiled template set.
//!
//! - `global(key)`: setup-time constant lookup, null when absent
//! - `yield(name, data)`: render another template of the set into a string,
//!   empty when the template is absent
//! - general-purpose filters and functions under their sprig names
//!   (`trimPrefix`, `toJson`, `dict`, `add`, ...) next to tera's built-ins

mod compose;
mod library;

use std::sync::{Arc, OnceLock, Weak};

use tera::Tera;

use crate::globals::GlobalStore;

pub use compose::MAX_YIELD_DEPTH;

/// Handle to the compiled set a `yield` call renders from.
///
/// The set is created after the functions are registered on it, so `yield`
/// holds a weak reference that the renderer fills once compilation is done.
pub(crate) type SetSlot = Arc<OnceLock<Tera>>;

/// Register the whole library on `tera`.
pub(crate) fn register(tera: &mut Tera, globals: Arc<GlobalStore>, set: Weak<OnceLock<Tera>>) {
    library::register(tera);
    tera.register_function("global", compose::Global::new(globals));
    tera.register_function("yield", compose::Yield::new(set));
}
