//! Owning wrapper around a native reference.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bridge_traits::RawHandle;
use tracing::trace;

use crate::context::SessionCore;

/// Holds exactly one native reference and gives it back on drop.
///
/// A handle built with [`acquire`](Self::acquire) adds the reference itself;
/// one built with [`adopt`](Self::adopt) takes over a reference the SDK
/// already counted for us. Either way the drop releases once, under the
/// session lock. Cached handles also evict their cache entry on drop.
pub(crate) struct NativeHandle {
    raw: RawHandle,
    cached: bool,
    core: Arc<SessionCore>,
}

impl NativeHandle {
    /// Wrap a borrowed reference, adding a reference of our own.
    pub(crate) fn acquire(core: &Arc<SessionCore>, raw: RawHandle) -> Self {
        let _serial = core.lock();
        core.sdk().add_ref(raw);
        trace!(handle = ?raw, "Acquired native reference");
        Self {
            raw,
            cached: false,
            core: core.clone(),
        }
    }

    /// Wrap a pre-owned reference without touching the count.
    pub(crate) fn adopt(core: &Arc<SessionCore>, raw: RawHandle) -> Self {
        trace!(handle = ?raw, "Adopted native reference");
        Self {
            raw,
            cached: false,
            core: core.clone(),
        }
    }

    /// Mark the handle as backing a cached wrapper.
    pub(crate) fn cached(mut self) -> Self {
        self.cached = true;
        self
    }

    pub(crate) fn raw(&self) -> RawHandle {
        self.raw
    }

    pub(crate) fn core(&self) -> &Arc<SessionCore> {
        &self.core
    }
}

impl Drop for NativeHandle {
    fn drop(&mut self) {
        let _serial = self.core.lock();
        if self.cached {
            self.core.cache().evict(self.raw);
        }
        self.core.sdk().release(self.raw);
        trace!(handle = ?self.raw, "Released native reference");
    }
}

impl PartialEq for NativeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for NativeHandle {}

impl Hash for NativeHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.raw)
    }
}
