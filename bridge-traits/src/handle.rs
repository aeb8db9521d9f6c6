//! Opaque native handle identities.

use std::fmt;
use std::num::NonZeroUsize;

/// The kind of resource a native handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandleKind {
    Session,
    Playlist,
    PlaylistContainer,
    Toplist,
    Track,
    Album,
    Artist,
    User,
    Link,
}

impl HandleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleKind::Session => "session",
            HandleKind::Playlist => "playlist",
            HandleKind::PlaylistContainer => "playlistcontainer",
            HandleKind::Toplist => "toplistbrowse",
            HandleKind::Track => "track",
            HandleKind::Album => "album",
            HandleKind::Artist => "artist",
            HandleKind::User => "user",
            HandleKind::Link => "link",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a native resource: its kind plus its (non-null) address.
///
/// Two handles are equal exactly when they denote the same native object.
/// A `RawHandle` carries no ownership; see [`ReferenceCounting`](crate::ReferenceCounting).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawHandle {
    kind: HandleKind,
    addr: NonZeroUsize,
}

impl RawHandle {
    /// Build a handle identity. Returns `None` for a null address.
    pub fn new(kind: HandleKind, addr: usize) -> Option<Self> {
        NonZeroUsize::new(addr).map(|addr| Self { kind, addr })
    }

    pub fn from_nonzero(kind: HandleKind, addr: NonZeroUsize) -> Self {
        Self { kind, addr }
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn addr(&self) -> usize {
        self.addr.get()
    }
}

impl fmt::Debug for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.kind, self.addr)
    }
}

/// Opaque user-data token passed along with an asynchronous native request
/// and handed back, unchanged, to the completion upcall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompletionToken(u64);

impl CompletionToken {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_null_address_is_rejected() {
        assert!(RawHandle::new(HandleKind::Playlist, 0).is_none());
    }

    #[test]
    fn test_identity_includes_kind() {
        let playlist = RawHandle::new(HandleKind::Playlist, 42).unwrap();
        let track = RawHandle::new(HandleKind::Track, 42).unwrap();
        let again = RawHandle::new(HandleKind::Playlist, 42).unwrap();

        assert_ne!(playlist, track);
        assert_eq!(playlist, again);

        let set: HashSet<_> = [playlist, track, again].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_debug_format() {
        let handle = RawHandle::new(HandleKind::Toplist, 0x2a).unwrap();
        assert_eq!(format!("{:?}", handle), "toplistbrowse@0x2a");
    }
}
