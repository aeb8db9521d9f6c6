//! Leaf metadata objects: tracks, albums, artists, users and links.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bridge_traits::RawHandle;

use crate::context::SessionCore;
use crate::handle::NativeHandle;
use crate::playlist::Playlist;

pub(crate) struct Cached {
    handle: NativeHandle,
}

impl Cached {
    fn acquire(core: &Arc<SessionCore>, raw: RawHandle) -> Arc<Self> {
        core.cached(raw, || Cached {
            handle: NativeHandle::acquire(core, raw).cached(),
        })
    }
}

#[derive(Clone)]
pub struct Track(Arc<Cached>);

impl Track {
    pub(crate) fn acquire(core: &Arc<SessionCore>, raw: RawHandle) -> Self {
        Self(Cached::acquire(core, raw))
    }

    pub fn raw(&self) -> RawHandle {
        self.0.handle.raw()
    }

    pub fn same_instance(&self, other: &Track) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The track name, or `None` until loaded.
    pub fn name(&self) -> Option<String> {
        let core = self.0.handle.core();
        let _serial = core.lock();
        core.sdk().track_name(self.raw())
    }
}

#[derive(Clone)]
pub struct Album(Arc<Cached>);

impl Album {
    pub(crate) fn acquire(core: &Arc<SessionCore>, raw: RawHandle) -> Self {
        Self(Cached::acquire(core, raw))
    }

    pub fn raw(&self) -> RawHandle {
        self.0.handle.raw()
    }

    pub fn same_instance(&self, other: &Album) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn name(&self) -> Option<String> {
        let core = self.0.handle.core();
        let _serial = core.lock();
        core.sdk().album_name(self.raw())
    }
}

#[derive(Clone)]
pub struct Artist(Arc<Cached>);

impl Artist {
    pub(crate) fn acquire(core: &Arc<SessionCore>, raw: RawHandle) -> Self {
        Self(Cached::acquire(core, raw))
    }

    pub fn raw(&self) -> RawHandle {
        self.0.handle.raw()
    }

    pub fn same_instance(&self, other: &Artist) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn name(&self) -> Option<String> {
        let core = self.0.handle.core();
        let _serial = core.lock();
        core.sdk().artist_name(self.raw())
    }
}

#[derive(Clone)]
pub struct User(Arc<Cached>);

impl User {
    pub(crate) fn acquire(core: &Arc<SessionCore>, raw: RawHandle) -> Self {
        Self(Cached::acquire(core, raw))
    }

    pub fn raw(&self) -> RawHandle {
        self.0.handle.raw()
    }

    pub fn same_instance(&self, other: &User) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn canonical_name(&self) -> String {
        let core = self.0.handle.core();
        let _serial = core.lock();
        core.sdk().user_canonical_name(self.raw())
    }

    pub fn display_name(&self) -> String {
        let core = self.0.handle.core();
        let _serial = core.lock();
        core.sdk().user_display_name(self.raw())
    }
}

/// A parsed URI. Links are not cached: every lookup yields a new wrapper.
pub struct Link {
    handle: NativeHandle,
}

impl Link {
    pub(crate) fn adopt(core: &Arc<SessionCore>, raw: RawHandle) -> Self {
        Self {
            handle: NativeHandle::adopt(core, raw),
        }
    }

    pub fn raw(&self) -> RawHandle {
        self.handle.raw()
    }

    pub fn uri(&self) -> String {
        let core = self.handle.core();
        let _serial = core.lock();
        core.sdk().link_as_string(self.raw())
    }

    /// The playlist this link points to, if it is a playlist link.
    pub fn as_playlist(&self) -> Option<Playlist> {
        let core = self.handle.core();
        let _serial = core.lock();
        core.sdk()
            .link_as_playlist(core.handle(), self.raw())
            .map(|raw| Playlist::acquire(core, raw))
    }
}

macro_rules! identity_by_handle {
    ($($ty:ident),*) => {
        $(
            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    self.raw() == other.raw()
                }
            }

            impl Eq for $ty {}

            impl Hash for $ty {
                fn hash<H: Hasher>(&self, state: &mut H) {
                    self.raw().hash(state);
                }
            }
        )*
    };
}

identity_by_handle!(Track, Album, Artist, User, Link);

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Track({:?})", self.name().unwrap_or_default())
    }
}

impl fmt::Debug for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Album({:?})", self.name().unwrap_or_default())
    }
}

impl fmt::Debug for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Artist({:?})", self.name().unwrap_or_default())
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User({:?})", self.canonical_name())
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link({:?})", self.uri())
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri())
    }
}
