use crate::error::ErrorType;
use crate::handle::{CompletionToken, RawHandle};
use crate::types::ToplistType;

/// Native region code for "everywhere".
pub const REGION_EVERYWHERE: i32 = 0;
/// Native region code for "the given user's toplist".
pub const REGION_USER: i32 = 1;

/// Toplist browse requests.
///
/// Items returned by the indexed accessors are borrowed from the browse
/// result and stay valid while it is alive.
pub trait ToplistBrowseApi: Send + Sync {
    /// Start a browse request. The result handle is pre-owned; completion is
    /// reported through [`NativeCallbacks::toplistbrowse_complete`] carrying
    /// `token`.
    ///
    /// [`NativeCallbacks::toplistbrowse_complete`]: crate::callbacks::NativeCallbacks::toplistbrowse_complete
    fn toplistbrowse_create(
        &self,
        session: RawHandle,
        toplist_type: ToplistType,
        region: i32,
        username: Option<&str>,
        token: Option<CompletionToken>,
    ) -> Option<RawHandle>;

    fn toplistbrowse_is_loaded(&self, browse: RawHandle) -> bool;

    fn toplistbrowse_error(&self, browse: RawHandle) -> ErrorType;

    /// Milliseconds the backend spent, `-1` if served from cache.
    fn toplistbrowse_backend_request_duration(&self, browse: RawHandle) -> i32;

    fn toplistbrowse_num_tracks(&self, browse: RawHandle) -> i32;

    fn toplistbrowse_track(&self, browse: RawHandle, index: i32) -> Option<RawHandle>;

    fn toplistbrowse_num_albums(&self, browse: RawHandle) -> i32;

    fn toplistbrowse_album(&self, browse: RawHandle, index: i32) -> Option<RawHandle>;

    fn toplistbrowse_num_artists(&self, browse: RawHandle) -> i32;

    fn toplistbrowse_artist(&self, browse: RawHandle, index: i32) -> Option<RawHandle>;
}
