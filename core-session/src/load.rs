use std::time::Duration;

use crate::error::Result;

/// Objects whose metadata arrives asynchronously.
pub trait Loadable {
    fn is_loaded(&self) -> bool;

    /// Block until the object is loaded.
    ///
    /// `None` waits for the session's configured load timeout. Fails with
    /// [`SessionError::NotLoggedIn`](crate::SessionError::NotLoggedIn) when
    /// the session cannot load anything, and with
    /// [`SessionError::Timeout`](crate::SessionError::Timeout) when the
    /// deadline passes first. Must not be called from a listener or
    /// completion callback, which run on the thread that delivers loads.
    fn load(&self, timeout: Option<Duration>) -> Result<&Self>;
}
