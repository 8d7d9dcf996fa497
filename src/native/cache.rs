//! Memoized native log handles.
//!
//! # Responsibilities
//! - Map (subsystem, category) to one shared handle for the process lifetime
//! - Construct each handle exactly once, even under concurrent first use
//!
//! # Design Decisions
//! - Lookups hit a `DashMap` without taking the cache-wide lock
//! - Misses take one mutex, re-check, then construct and insert; after
//!   warm-up misses are rare, so one lock for the whole cache is enough
//! - Entries are never evicted

use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;

/// Key of one cached handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandleKey {
    pub subsystem: String,
    pub category: String,
}

impl HandleKey {
    pub fn new(subsystem: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            subsystem: subsystem.into(),
            category: category.into(),
        }
    }
}

/// Append-only handle cache.
pub struct HandleCache<H> {
    handles: DashMap<HandleKey, Arc<H>>,
    construct: Mutex<()>,
}

impl<H> HandleCache<H> {
    pub fn new() -> Self {
        Self {
            handles: DashMap::new(),
            construct: Mutex::new(()),
        }
    }

    /// Return the handle for `(subsystem, category)`, building it with `open`
    /// on first use.
    ///
    /// `open` runs at most once per key. If it fails nothing is cached and the
    /// next lookup tries again.
    pub fn handle_for<E, F>(&self, subsystem: &str, category: &str, open: F) -> Result<Arc<H>, E>
    where
        F: FnOnce() -> Result<H, E>,
    {
        let key = HandleKey::new(subsystem, category);
        if let Some(handle) = self.handles.get(&key) {
            return Ok(handle.value().clone());
        }

        let _guard = self.construct.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = self.handles.get(&key) {
            return Ok(handle.value().clone());
        }

        let handle = Arc::new(open()?);
        self.handles.insert(key, handle.clone());
        tracing::trace!(subsystem, category, "native log handle created");
        Ok(handle)
    }

    /// Look up without constructing.
    pub fn get(&self, subsystem: &str, category: &str) -> Option<Arc<H>> {
        self.handles
            .get(&HandleKey::new(subsystem, category))
            .map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl<H> Default for HandleCache<H> {
    fn default() -> Self {
        Self::new()
    }
}
