//! Runtime lookup library over the persisted metadata tree
//!
//! [`Atlas`] is an explicitly loaded, read-only view of the files the crawler
//! writes. For process-wide use, call [`init`] once at startup and [`global`]
//! afterwards; nothing is loaded implicitly on first access.
//!
//! Missing or corrupt files are treated as "no data": accessors return empty
//! slices or `None`, never errors.
//!
//! # Example
//!
//! ```no_run
//! use geo_atlas::atlas;
//!
//! let atlas = atlas::init("metadata");
//! for state in atlas.states("VN") {
//!     println!("{} {}", state.code, state.name);
//! }
//! ```

mod lookup;

pub use lookup::{normalize, Atlas};

use once_cell::sync::OnceCell;
use std::path::Path;

static GLOBAL: OnceCell<Atlas> = OnceCell::new();

/// Loads the process-wide atlas from `dir`
///
/// Only the first call loads; later calls return the already loaded atlas.
pub fn init(dir: impl AsRef<Path>) -> &'static Atlas {
    let dir = dir.as_ref();
    if let Some(existing) = GLOBAL.get() {
        tracing::warn!(
            "Atlas already initialized, ignoring init from {}",
            dir.display()
        );
        return existing;
    }
    GLOBAL.get_or_init(|| Atlas::load(dir))
}

/// The process-wide atlas, if [`init`] has been called
pub fn global() -> Option<&'static Atlas> {
    GLOBAL.get()
}
