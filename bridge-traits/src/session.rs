//! Session lifecycle and root objects.

use std::path::PathBuf;
use std::sync::Arc;

use crate::callbacks::NativeCallbacks;
use crate::error::{ErrorType, NativeResult};
use crate::handle::RawHandle;
use crate::types::ConnectionState;

/// Parameters passed to [`SessionApi::session_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSessionConfig {
    pub application_key: Vec<u8>,
    pub user_agent: String,
    pub cache_location: Option<PathBuf>,
    pub settings_location: Option<PathBuf>,
}

/// Session creation, login and access to the session's root objects.
pub trait SessionApi: Send + Sync {
    /// Create a session. `callbacks` receives every upcall for objects
    /// belonging to this session. The returned handle is pre-owned and must
    /// be passed to [`session_release`](Self::session_release).
    fn session_create(
        &self,
        config: &NativeSessionConfig,
        callbacks: Arc<dyn NativeCallbacks>,
    ) -> NativeResult<RawHandle>;

    fn session_release(&self, session: RawHandle);

    /// Start an asynchronous login. The outcome arrives through
    /// [`NativeCallbacks::logged_in`].
    fn session_login(
        &self,
        session: RawHandle,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> ErrorType;

    fn session_logout(&self, session: RawHandle) -> ErrorType;

    fn session_connection_state(&self, session: RawHandle) -> ConnectionState;

    /// Borrowed. `None` while logged out.
    fn session_playlistcontainer(&self, session: RawHandle) -> Option<RawHandle>;

    /// Borrowed. `None` while logged out.
    fn session_user(&self, session: RawHandle) -> Option<RawHandle>;
}
