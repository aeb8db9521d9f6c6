//! Process-side state shared by a session and every object derived from it.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bridge_traits::{ConnectionState, NativeSdk, RawHandle};
use core_runtime::SessionConfig;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use tracing::debug;

use crate::cache::ObjectCache;
use crate::callback::PendingCallbacks;
use crate::error::{Result, SessionError};
use crate::events::{ActiveEmitters, EventEmitter};
use crate::session::{SessionEventKind, SessionListener};
use crate::signal::{ActivityNotifier, CompletionSignal};

/// Longest a loader sleeps before re-checking, even without native activity.
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub(crate) struct SessionCore {
    sdk: Arc<dyn NativeSdk>,
    serial: ReentrantMutex<()>,
    config: SessionConfig,
    handle: RawHandle,
    cache: ObjectCache,
    pending: PendingCallbacks,
    emitters: ActiveEmitters,
    activity: ActivityNotifier,
    events: EventEmitter<SessionEventKind, SessionListener>,
}

impl SessionCore {
    pub(crate) fn new(sdk: Arc<dyn NativeSdk>, handle: RawHandle, config: SessionConfig) -> Self {
        Self {
            sdk,
            serial: ReentrantMutex::new(()),
            config,
            handle,
            cache: ObjectCache::new(),
            pending: PendingCallbacks::new(),
            emitters: ActiveEmitters::default(),
            activity: ActivityNotifier::default(),
            events: EventEmitter::new(),
        }
    }

    /// Take the lock that serializes every native call and every change to
    /// the cache, the active emitter set and the pending callback table.
    pub(crate) fn lock(&self) -> ReentrantMutexGuard<'_, ()> {
        self.serial.lock()
    }

    pub(crate) fn sdk(&self) -> &dyn NativeSdk {
        self.sdk.as_ref()
    }

    pub(crate) fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub(crate) fn handle(&self) -> RawHandle {
        self.handle
    }

    pub(crate) fn cache(&self) -> &ObjectCache {
        &self.cache
    }

    pub(crate) fn pending(&self) -> &PendingCallbacks {
        &self.pending
    }

    pub(crate) fn emitters(&self) -> &ActiveEmitters {
        &self.emitters
    }

    pub(crate) fn activity(&self) -> &ActivityNotifier {
        &self.activity
    }

    pub(crate) fn events(&self) -> &EventEmitter<SessionEventKind, SessionListener> {
        &self.events
    }

    /// Look up or build the cached wrapper for `raw`.
    ///
    /// The session lock is taken before the cache lock, matching the order
    /// used when a wrapper's handle is dropped.
    pub(crate) fn cached<T, F>(&self, raw: RawHandle, factory: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let _serial = self.lock();
        self.cache.get_or_create(raw, factory)
    }

    pub(crate) fn connection_state(&self) -> ConnectionState {
        let _serial = self.lock();
        self.sdk.session_connection_state(self.handle)
    }

    /// Block until `is_loaded` holds, the completion `signal` (if any) is set,
    /// or the timeout passes.
    ///
    /// Never called with the session lock held: the upcalls that make objects
    /// loaded need it.
    pub(crate) fn wait_loaded(
        &self,
        what: &str,
        timeout: Option<Duration>,
        signal: Option<&CompletionSignal>,
        is_loaded: impl Fn() -> bool,
    ) -> Result<()> {
        if is_loaded() {
            return Ok(());
        }
        if !self.connection_state().allows_loading() {
            return Err(SessionError::NotLoggedIn);
        }

        let timeout = timeout.unwrap_or(self.config.load_timeout);
        let deadline = Instant::now() + timeout;
        debug!(object = what, ?timeout, "Waiting for object to load");

        loop {
            let seen = self.activity.generation();
            if is_loaded() || signal.is_some_and(CompletionSignal::is_set) {
                return Ok(());
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                debug!(object = what, ?timeout, "Load timed out");
                return Err(SessionError::Timeout(timeout));
            }
            let slice = remaining.min(LOAD_POLL_INTERVAL);
            match signal {
                Some(signal) => {
                    signal.wait(slice);
                }
                None => self.activity.wait_for_change(seen, slice),
            }
        }
    }
}

impl Drop for SessionCore {
    fn drop(&mut self) {
        let _serial = self.serial.lock();
        self.sdk.session_release(self.handle);
        debug!(handle = ?self.handle, "Native session released");
    }
}
