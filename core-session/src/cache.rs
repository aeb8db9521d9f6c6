//! Identity-preserving registry of live wrappers.
//!
//! Maps a native handle to a weak reference of the wrapper currently
//! representing it. Asking for the same handle twice while a wrapper is alive
//! yields the same instance; once every strong reference is gone the entry is
//! evicted by the wrapper's own drop.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

use bridge_traits::RawHandle;
use parking_lot::Mutex;
use tracing::{error, trace};

type Entry = Weak<dyn Any + Send + Sync>;

#[derive(Default)]
pub(crate) struct ObjectCache {
    entries: Mutex<HashMap<RawHandle, Entry>>,
}

impl ObjectCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Return the live wrapper for `raw`, or build one with `factory` and
    /// register it.
    ///
    /// `factory` runs with the cache lock held and must not touch the cache.
    pub(crate) fn get_or_create<T, F>(&self, raw: RawHandle, factory: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        // Declared before the guard so a mismatched wrapper is dropped after
        // the lock is released; its drop evicts through this cache.
        let mut displaced: Option<Arc<dyn Any + Send + Sync>> = None;
        let mut entries = self.entries.lock();

        if let Some(existing) = entries.get(&raw).and_then(Weak::upgrade) {
            match existing.downcast::<T>() {
                Ok(found) => {
                    trace!(handle = ?raw, "Object cache hit");
                    return found;
                }
                Err(other) => {
                    error!(handle = ?raw, "Cached wrapper has an unexpected type, replacing it");
                    displaced = Some(other);
                }
            }
        }

        let created = Arc::new(factory());
        let erased: Arc<dyn Any + Send + Sync> = created.clone();
        entries.insert(raw, Arc::downgrade(&erased));
        trace!(handle = ?raw, "Object cache miss, wrapper registered");
        drop(entries);
        drop(displaced);
        created
    }

    /// Remove the entry for `raw` if its wrapper is gone.
    ///
    /// A newer wrapper registered under the same handle is left in place.
    pub(crate) fn evict(&self, raw: RawHandle) {
        let mut entries = self.entries.lock();
        if entries
            .get(&raw)
            .is_some_and(|entry| entry.strong_count() == 0)
        {
            entries.remove(&raw);
            trace!(handle = ?raw, "Object cache entry evicted");
        }
    }

    #[cfg(test)]
    fn contains(&self, raw: RawHandle) -> bool {
        self.entries
            .lock()
            .get(&raw)
            .is_some_and(|entry| entry.strong_count() > 0)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }
}
