//! Upcalls from the native SDK.
//!
//! The SDK invokes these from its own worker thread, never from inside a
//! call made by the core. Handles passed in are borrowed for the duration of
//! the call.

use crate::error::ErrorType;
use crate::handle::{CompletionToken, RawHandle};

pub trait NativeCallbacks: Send + Sync {
    fn logged_in(&self, session: RawHandle, error: ErrorType);

    fn logged_out(&self, session: RawHandle);

    fn connection_state_updated(&self, session: RawHandle);

    /// A toplist browse finished. `token` is whatever was passed to
    /// `toplistbrowse_create`, which may be nothing.
    fn toplistbrowse_complete(&self, browse: RawHandle, token: Option<CompletionToken>);

    fn playlist_added(&self, container: RawHandle, playlist: RawHandle, position: i32);

    fn playlist_removed(&self, container: RawHandle, playlist: RawHandle, position: i32);

    fn playlist_moved(
        &self,
        container: RawHandle,
        playlist: RawHandle,
        old_position: i32,
        new_position: i32,
    );

    fn container_loaded(&self, container: RawHandle);

    fn playlist_renamed(&self, playlist: RawHandle);

    fn playlist_state_changed(&self, playlist: RawHandle);

    fn playlist_update_in_progress(&self, playlist: RawHandle, done: bool);

    fn playlist_metadata_updated(&self, playlist: RawHandle);
}
