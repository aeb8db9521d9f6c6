use crate::error::ErrorType;
use crate::handle::RawHandle;

/// Playlist properties and event registration.
pub trait PlaylistApi: Send + Sync {
    fn playlist_is_loaded(&self, playlist: RawHandle) -> bool;

    /// `None` until the playlist is loaded.
    fn playlist_name(&self, playlist: RawHandle) -> Option<String>;

    /// Pre-owned link to the playlist, `None` if none can be made yet.
    fn link_create_from_playlist(&self, playlist: RawHandle) -> Option<RawHandle>;

    fn playlist_add_callbacks(&self, playlist: RawHandle) -> ErrorType;

    fn playlist_remove_callbacks(&self, playlist: RawHandle) -> ErrorType;
}
