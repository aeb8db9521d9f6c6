use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::RawHandle;
use tracing::debug;

use crate::context::SessionCore;
use crate::error::{Result, SessionError};
use crate::events::{ActiveEmitter, EventEmitter, ListenerId};
use crate::handle::NativeHandle;
use crate::load::Loadable;
use crate::objects::Link;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaylistEventKind {
    Renamed,
    StateChanged,
    UpdateInProgress,
    MetadataUpdated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistEvent {
    Renamed,
    StateChanged,
    UpdateInProgress { done: bool },
    MetadataUpdated,
}

impl PlaylistEvent {
    pub fn kind(&self) -> PlaylistEventKind {
        match self {
            PlaylistEvent::Renamed => PlaylistEventKind::Renamed,
            PlaylistEvent::StateChanged => PlaylistEventKind::StateChanged,
            PlaylistEvent::UpdateInProgress { .. } => PlaylistEventKind::UpdateInProgress,
            PlaylistEvent::MetadataUpdated => PlaylistEventKind::MetadataUpdated,
        }
    }
}

pub(crate) type PlaylistListener = dyn Fn(&Playlist, &PlaylistEvent) + Send + Sync;

pub(crate) struct PlaylistInner {
    handle: NativeHandle,
    events: EventEmitter<PlaylistEventKind, PlaylistListener>,
}

impl ActiveEmitter for PlaylistInner {
    fn detach(&self) {
        if self.events.off(None, None) {
            let core = self.handle.core();
            let _serial = core.lock();
            let code = core.sdk().playlist_remove_callbacks(self.handle.raw());
            if let Err(err) = SessionError::maybe_raise(code) {
                debug!(handle = ?self.handle, error = %err, "Failed to deregister playlist dispatch");
            }
        }
    }
}

/// A playlist. Cheap to clone; clones share one wrapper.
///
/// Wrappers are unique per native playlist while alive, so two `Playlist`
/// values for the same playlist are always the same instance.
#[derive(Clone)]
pub struct Playlist(Arc<PlaylistInner>);

impl Playlist {
    /// The cached wrapper for a borrowed playlist reference.
    pub(crate) fn acquire(core: &Arc<SessionCore>, raw: RawHandle) -> Self {
        Self(core.cached(raw, || PlaylistInner {
            handle: NativeHandle::acquire(core, raw).cached(),
            events: EventEmitter::new(),
        }))
    }

    fn core(&self) -> &Arc<SessionCore> {
        self.0.handle.core()
    }

    pub fn raw(&self) -> RawHandle {
        self.0.handle.raw()
    }

    /// True when both values are the same wrapper instance.
    pub fn same_instance(&self, other: &Playlist) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The playlist name, or `None` while the playlist is loading.
    pub fn name(&self) -> Option<String> {
        let core = self.core();
        let _serial = core.lock();
        core.sdk().playlist_name(self.raw())
    }

    pub fn link(&self) -> Result<Link> {
        let core = self.core();
        let _serial = core.lock();
        match core.sdk().link_create_from_playlist(self.raw()) {
            Some(raw) => Ok(Link::adopt(core, raw)),
            None => Err(SessionError::Operation(
                "Failed to get link from playlist".to_owned(),
            )),
        }
    }

    /// Bind a listener. The first binding registers native dispatch and keeps
    /// this playlist alive until the last binding is removed.
    pub fn on<F>(&self, kind: PlaylistEventKind, listener: F) -> Result<ListenerId>
    where
        F: Fn(&Playlist, &PlaylistEvent) + Send + Sync + 'static,
    {
        let core = self.core();
        let _serial = core.lock();
        let (id, first) = self.0.events.on(kind, Arc::new(listener));
        if first {
            let code = core.sdk().playlist_add_callbacks(self.raw());
            if let Err(err) = SessionError::maybe_raise(code) {
                self.0.events.off(None, Some(id));
                return Err(err);
            }
            core.emitters().insert(self.raw(), self.0.clone());
            debug!(handle = ?self.raw(), "Playlist dispatch registered");
        }
        Ok(id)
    }

    /// Unbind listeners; see [`PlaylistContainer::off`](crate::PlaylistContainer::off)
    /// for the filters.
    pub fn off(&self, kind: Option<PlaylistEventKind>, listener: Option<ListenerId>) -> Result<()> {
        let core = self.core();
        let (removed, code) = {
            let _serial = core.lock();
            if !self.0.events.off(kind, listener) {
                return Ok(());
            }
            let removed = core.emitters().remove(self.raw());
            let code = core.sdk().playlist_remove_callbacks(self.raw());
            debug!(handle = ?self.raw(), "Playlist dispatch deregistered");
            (removed, code)
        };
        drop(removed);
        SessionError::maybe_raise(code)
    }

    pub fn listener_count(&self, kind: PlaylistEventKind) -> usize {
        self.0.events.count(kind)
    }

    pub(crate) fn emit(&self, event: &PlaylistEvent) {
        for listener in self.0.events.listeners(event.kind()) {
            listener(self, event);
        }
    }
}

impl Loadable for Playlist {
    fn is_loaded(&self) -> bool {
        let core = self.core();
        let _serial = core.lock();
        core.sdk().playlist_is_loaded(self.raw())
    }

    fn load(&self, timeout: Option<Duration>) -> Result<&Self> {
        self.core()
            .wait_loaded("playlist", timeout, None, || self.is_loaded())?;
        Ok(self)
    }
}

impl PartialEq for Playlist {
    fn eq(&self, other: &Self) -> bool {
        self.raw() == other.raw()
    }
}

impl Eq for Playlist {}

impl Hash for Playlist {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw().hash(state);
    }
}

impl fmt::Debug for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Playlist({name:?})"),
            None => write!(f, "Playlist(<loading> {:?})", self.raw()),
        }
    }
}
