//! Playlist container access.
//!
//! A container is a flat array. Folders are encoded as a pair of sentinel
//! entries (`StartFolder`, `EndFolder`) sharing a folder id; everything
//! between them is inside the folder. All index based calls address that flat
//! array directly.

use crate::error::{ErrorType, NativeResult};
use crate::handle::RawHandle;
use crate::types::PlaylistType;

pub trait PlaylistContainerApi: Send + Sync {
    fn container_is_loaded(&self, container: RawHandle) -> bool;

    /// Number of entries, or `-1` when undefined (not loaded yet).
    fn container_num_playlists(&self, container: RawHandle) -> i32;

    fn container_playlist_type(&self, container: RawHandle, index: i32) -> PlaylistType;

    /// Borrowed playlist at `index`, `None` for sentinels or a bad index.
    fn container_playlist(&self, container: RawHandle, index: i32) -> Option<RawHandle>;

    /// Folder id of the sentinel at `index`, `0` for non-folder entries.
    fn container_folder_id(&self, container: RawHandle, index: i32) -> u64;

    /// Name of the folder started at `index`. Empty for end sentinels.
    fn container_folder_name(&self, container: RawHandle, index: i32) -> NativeResult<String>;

    /// Create a playlist and append it. Borrowed; `None` on failure.
    fn container_add_new_playlist(&self, container: RawHandle, name: &str) -> Option<RawHandle>;

    /// Append an existing playlist by link. Borrowed; `None` when the
    /// playlist is already in the container or the link is invalid.
    fn container_add_playlist(&self, container: RawHandle, link: RawHandle) -> Option<RawHandle>;

    /// Insert a folder (a start/end sentinel pair) at `index`.
    fn container_add_folder(&self, container: RawHandle, index: i32, name: &str) -> ErrorType;

    fn container_remove_playlist(&self, container: RawHandle, index: i32) -> ErrorType;

    /// Move the entry at `from` so it ends up before the entry now at `to`.
    /// With `dry_run` the move is only validated.
    fn container_move_playlist(
        &self,
        container: RawHandle,
        from: i32,
        to: i32,
        dry_run: bool,
    ) -> ErrorType;

    /// Borrowed owner of the container.
    fn container_owner(&self, container: RawHandle) -> Option<RawHandle>;

    /// Fill `out` with up to `out.len()` borrowed unseen tracks of
    /// `playlist`. Returns the total number of unseen tracks, which may exceed
    /// `out.len()`, or a negative value on failure.
    fn container_get_unseen_tracks(
        &self,
        container: RawHandle,
        playlist: RawHandle,
        out: &mut [Option<RawHandle>],
    ) -> i32;

    /// Returns `0` on success.
    fn container_clear_unseen_tracks(&self, container: RawHandle, playlist: RawHandle) -> i32;

    /// Start delivering container events for `container`.
    fn container_add_callbacks(&self, container: RawHandle) -> ErrorType;

    fn container_remove_callbacks(&self, container: RawHandle) -> ErrorType;
}
