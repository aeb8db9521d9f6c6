//! Bridge from native upcalls to binding objects.
//!
//! Two pieces live here. [`PendingCallbacks`] is the table of in-flight
//! asynchronous requests, keyed by the token handed to the SDK, which keeps
//! the requesting object alive until its completion arrives. [`CallbackBridge`]
//! is the [`NativeCallbacks`] implementation registered with the SDK: it maps
//! each upcall to the matching wrapper and event, and runs host code only
//! after every binding lock has been released.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use bridge_traits::{CompletionToken, ErrorType, NativeCallbacks, RawHandle};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::container::{ContainerEvent, PlaylistContainer};
use crate::context::SessionCore;
use crate::playlist::{Playlist, PlaylistEvent};
use crate::session::SessionEvent;

/// Work to run when a request completes: set the owner's signal, then call
/// the host callback. Holds the owning object alive until it runs.
pub(crate) type Completion = Box<dyn FnOnce() + Send>;

enum Slot {
    /// Token handed out, request not yet wrapped.
    Reserved,
    Armed(Completion),
    /// Completion arrived before the slot was armed.
    Fired,
}

pub(crate) struct PendingCallbacks {
    next_token: AtomicU64,
    slots: Mutex<HashMap<CompletionToken, Slot>>,
}

impl PendingCallbacks {
    pub(crate) fn new() -> Self {
        Self {
            next_token: AtomicU64::new(1),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Allocate a fresh token for a request about to be issued.
    pub(crate) fn reserve(&self) -> CompletionToken {
        let token = CompletionToken::new(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.slots.lock().insert(token, Slot::Reserved);
        token
    }

    /// Forget a token whose request was never issued.
    pub(crate) fn cancel(&self, token: CompletionToken) {
        self.slots.lock().remove(&token);
    }

    /// Attach the completion work to a reserved token.
    ///
    /// If the completion already arrived, the work is handed back to be run
    /// by the caller once its locks are released.
    #[must_use]
    pub(crate) fn arm(&self, token: CompletionToken, completion: Completion) -> Option<Completion> {
        let mut slots = self.slots.lock();
        match slots.remove(&token) {
            Some(Slot::Fired) => Some(completion),
            Some(Slot::Reserved) | Some(Slot::Armed(_)) | None => {
                slots.insert(token, Slot::Armed(completion));
                None
            }
        }
    }

    /// Resolve a completion upcall to the work it should trigger.
    ///
    /// Each token fires at most once; later deliveries are logged and ignored.
    #[must_use]
    pub(crate) fn complete(&self, token: Option<CompletionToken>) -> Option<Completion> {
        let Some(token) = token else {
            warn!("Completion upcall without a token, ignoring");
            return None;
        };
        let mut slots = self.slots.lock();
        match slots.remove(&token) {
            Some(Slot::Armed(completion)) => Some(completion),
            Some(Slot::Reserved) => {
                slots.insert(token, Slot::Fired);
                None
            }
            Some(Slot::Fired) => {
                slots.insert(token, Slot::Fired);
                warn!(token = token.value(), "Duplicate completion upcall, ignoring");
                None
            }
            None => {
                warn!(token = token.value(), "Completion upcall for unknown token, ignoring");
                None
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Drop every pending entry. The returned work must be dropped outside
    /// the session lock.
    #[must_use]
    pub(crate) fn drain(&self) -> Vec<Completion> {
        self.slots
            .lock()
            .drain()
            .filter_map(|(_, slot)| match slot {
                Slot::Armed(completion) => Some(completion),
                Slot::Reserved | Slot::Fired => None,
            })
            .collect()
    }
}

/// The upcall target registered with the SDK at session creation.
pub(crate) struct CallbackBridge {
    core: OnceLock<Weak<SessionCore>>,
}

impl CallbackBridge {
    pub(crate) fn new() -> Self {
        Self {
            core: OnceLock::new(),
        }
    }

    pub(crate) fn attach(&self, core: &Arc<SessionCore>) {
        if self.core.set(Arc::downgrade(core)).is_err() {
            warn!("Callback bridge attached twice");
        }
    }

    /// The live session, with activity signalled to any waiting loader.
    fn core(&self, upcall: &'static str) -> Option<Arc<SessionCore>> {
        match self.core.get().and_then(Weak::upgrade) {
            Some(core) => {
                trace!(upcall, "Native upcall");
                core.activity().pulse();
                Some(core)
            }
            None => {
                debug!(upcall, "Upcall after session teardown, ignoring");
                None
            }
        }
    }

    fn dispatch_session(&self, upcall: &'static str, event: SessionEvent) {
        let Some(core) = self.core(upcall) else {
            return;
        };
        for listener in core.events().listeners(event.kind()) {
            listener(&event);
        }
    }

    fn dispatch_container<F>(&self, upcall: &'static str, raw: RawHandle, build: F)
    where
        F: FnOnce(&Arc<SessionCore>) -> ContainerEvent,
    {
        let Some(core) = self.core(upcall) else {
            return;
        };
        let (container, event) = {
            let _serial = core.lock();
            (PlaylistContainer::acquire(&core, raw), build(&core))
        };
        container.emit(&event);
    }

    fn dispatch_playlist(&self, upcall: &'static str, raw: RawHandle, event: PlaylistEvent) {
        let Some(core) = self.core(upcall) else {
            return;
        };
        let playlist = Playlist::acquire(&core, raw);
        playlist.emit(&event);
    }
}

fn to_position(value: i32) -> usize {
    usize::try_from(value).unwrap_or(0)
}

impl NativeCallbacks for CallbackBridge {
    fn logged_in(&self, _session: RawHandle, error: ErrorType) {
        self.dispatch_session("logged_in", SessionEvent::LoggedIn(error));
    }

    fn logged_out(&self, _session: RawHandle) {
        self.dispatch_session("logged_out", SessionEvent::LoggedOut);
    }

    fn connection_state_updated(&self, _session: RawHandle) {
        self.dispatch_session("connection_state_updated", SessionEvent::ConnectionStateUpdated);
    }

    fn toplistbrowse_complete(&self, browse: RawHandle, token: Option<CompletionToken>) {
        let Some(core) = self.core("toplistbrowse_complete") else {
            return;
        };
        let completion = {
            let _serial = core.lock();
            core.pending().complete(token)
        };
        if let Some(completion) = completion {
            debug!(handle = ?browse, "Toplist browse complete");
            completion();
        }
    }

    fn playlist_added(&self, container: RawHandle, playlist: RawHandle, position: i32) {
        self.dispatch_container("playlist_added", container, |core| {
            ContainerEvent::PlaylistAdded {
                playlist: Playlist::acquire(core, playlist),
                position: to_position(position),
            }
        });
    }

    fn playlist_removed(&self, container: RawHandle, playlist: RawHandle, position: i32) {
        self.dispatch_container("playlist_removed", container, |core| {
            ContainerEvent::PlaylistRemoved {
                playlist: Playlist::acquire(core, playlist),
                position: to_position(position),
            }
        });
    }

    fn playlist_moved(
        &self,
        container: RawHandle,
        playlist: RawHandle,
        old_position: i32,
        new_position: i32,
    ) {
        self.dispatch_container("playlist_moved", container, |core| {
            ContainerEvent::PlaylistMoved {
                playlist: Playlist::acquire(core, playlist),
                old_position: to_position(old_position),
                new_position: to_position(new_position),
            }
        });
    }

    fn container_loaded(&self, container: RawHandle) {
        self.dispatch_container("container_loaded", container, |_| {
            ContainerEvent::ContainerLoaded
        });
    }

    fn playlist_renamed(&self, playlist: RawHandle) {
        self.dispatch_playlist("playlist_renamed", playlist, PlaylistEvent::Renamed);
    }

    fn playlist_state_changed(&self, playlist: RawHandle) {
        self.dispatch_playlist("playlist_state_changed", playlist, PlaylistEvent::StateChanged);
    }

    fn playlist_update_in_progress(&self, playlist: RawHandle, done: bool) {
        self.dispatch_playlist(
            "playlist_update_in_progress",
            playlist,
            PlaylistEvent::UpdateInProgress { done },
        );
    }

    fn playlist_metadata_updated(&self, playlist: RawHandle) {
        self.dispatch_playlist(
            "playlist_metadata_updated",
            playlist,
            PlaylistEvent::MetadataUpdated,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting(counter: &Arc<AtomicUsize>) -> Completion {
        let counter = counter.clone();
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_tokens_are_distinct() {
        let pending = PendingCallbacks::new();
        let a = pending.reserve();
        let b = pending.reserve();
        assert_ne!(a, b);
        assert_eq!(pending.len(), 2);
    }

    #[test]
    fn test_completion_fires_once() {
        let pending = PendingCallbacks::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let token = pending.reserve();
        assert!(pending.arm(token, counting(&counter)).is_none());

        let completion = pending.complete(Some(token)).expect("armed completion");
        completion();
        assert!(pending.complete(Some(token)).is_none());

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn test_completion_before_arm_is_handed_back() {
        let pending = PendingCallbacks::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let token = pending.reserve();

        assert!(pending.complete(Some(token)).is_none());
        let completion = pending.arm(token, counting(&counter)).expect("already fired");
        completion();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn test_missing_or_unknown_token_is_ignored() {
        let pending = PendingCallbacks::new();
        assert!(pending.complete(None).is_none());
        assert!(pending.complete(Some(CompletionToken::new(999))).is_none());
    }

    #[test]
    fn test_cancel_and_drain() {
        let pending = PendingCallbacks::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let cancelled = pending.reserve();
        pending.cancel(cancelled);

        let armed = pending.reserve();
        assert!(pending.arm(armed, counting(&counter)).is_none());
        pending.reserve();

        let drained = pending.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(pending.len(), 0);
        // drained work is dropped, never run
        drop(drained);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
