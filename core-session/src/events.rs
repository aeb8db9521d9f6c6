//! Listener registry shared by every object that emits events.
//!
//! An emitter keeps an ordered list of `(kind, id, listener)` bindings. The
//! owning object watches the transitions reported by [`EventEmitter::on`] and
//! [`EventEmitter::off`]: the first binding is when native dispatch must be
//! registered, and the last removal is when it must be torn down.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bridge_traits::RawHandle;
use parking_lot::Mutex;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one listener binding, as returned by `on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

struct Binding<K, L: ?Sized> {
    kind: K,
    id: ListenerId,
    listener: Arc<L>,
}

pub(crate) struct EventEmitter<K, L: ?Sized> {
    bindings: Mutex<Vec<Binding<K, L>>>,
}

impl<K, L> EventEmitter<K, L>
where
    K: Copy + Eq,
    L: ?Sized,
{
    pub(crate) fn new() -> Self {
        Self {
            bindings: Mutex::new(Vec::new()),
        }
    }

    /// Bind a listener. The flag is true when this is the first binding.
    pub(crate) fn on(&self, kind: K, listener: Arc<L>) -> (ListenerId, bool) {
        let id = ListenerId::next();
        let mut bindings = self.bindings.lock();
        let first = bindings.is_empty();
        bindings.push(Binding { kind, id, listener });
        (id, first)
    }

    /// Unbind listeners.
    ///
    /// With neither filter, every binding goes. With only a kind, every binding
    /// of that kind goes. With an id, only that binding goes (and only if it
    /// matches the kind, when one is given). Returns true when the emitter went
    /// from having bindings to having none.
    pub(crate) fn off(&self, kind: Option<K>, id: Option<ListenerId>) -> bool {
        let (_removed, emptied) = {
            let mut bindings = self.bindings.lock();
            let before = bindings.len();
            let mut removed = Vec::new();
            let mut index = 0;
            while index < bindings.len() {
                let binding = &bindings[index];
                let kind_matches = kind.map_or(true, |kind| binding.kind == kind);
                let id_matches = id.map_or(true, |id| binding.id == id);
                if kind_matches && id_matches {
                    removed.push(bindings.remove(index));
                } else {
                    index += 1;
                }
            }
            (removed, before > 0 && bindings.is_empty())
        };
        // removed closures drop here, outside the lock
        emptied
    }

    /// Listeners bound to `kind`, in binding order.
    pub(crate) fn listeners(&self, kind: K) -> Vec<Arc<L>> {
        self.bindings
            .lock()
            .iter()
            .filter(|binding| binding.kind == kind)
            .map(|binding| binding.listener.clone())
            .collect()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.bindings.lock().len()
    }

    pub(crate) fn count(&self, kind: K) -> usize {
        self.bindings
            .lock()
            .iter()
            .filter(|binding| binding.kind == kind)
            .count()
    }
}

/// An object whose native dispatch is currently registered.
pub(crate) trait ActiveEmitter: Send + Sync {
    /// Drop every listener and deregister native dispatch.
    fn detach(&self);
}

/// Strong references to every object with at least one listener, so that
/// dispatch keeps working even when the host let go of its own copies.
#[derive(Default)]
pub(crate) struct ActiveEmitters {
    entries: Mutex<HashMap<RawHandle, Arc<dyn ActiveEmitter>>>,
}

impl ActiveEmitters {
    pub(crate) fn insert(&self, raw: RawHandle, emitter: Arc<dyn ActiveEmitter>) {
        let previous = self.entries.lock().insert(raw, emitter);
        drop(previous);
    }

    /// Remove and return the entry, to be dropped by the caller outside any lock.
    #[must_use]
    pub(crate) fn remove(&self, raw: RawHandle) -> Option<Arc<dyn ActiveEmitter>> {
        self.entries.lock().remove(&raw)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub(crate) fn drain(&self) -> Vec<Arc<dyn ActiveEmitter>> {
        self.entries.lock().drain().map(|(_, emitter)| emitter).collect()
    }
}
