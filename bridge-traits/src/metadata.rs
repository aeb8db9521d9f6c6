//! Leaf metadata objects and links.

use crate::handle::RawHandle;

pub trait MetadataApi: Send + Sync {
    fn track_name(&self, track: RawHandle) -> Option<String>;

    fn album_name(&self, album: RawHandle) -> Option<String>;

    fn artist_name(&self, artist: RawHandle) -> Option<String>;

    fn user_canonical_name(&self, user: RawHandle) -> String;

    fn user_display_name(&self, user: RawHandle) -> String;

    /// Parse a URI. Pre-owned; `None` for malformed URIs.
    fn link_create_from_string(&self, uri: &str) -> Option<RawHandle>;

    fn link_as_string(&self, link: RawHandle) -> String;

    /// Borrowed playlist the link points at, `None` for other link types.
    fn link_as_playlist(&self, session: RawHandle, link: RawHandle) -> Option<RawHandle>;
}
