//! The session: entry point to everything else.

use std::fmt;
use std::sync::Arc;

use bridge_traits::{ConnectionState, ErrorType, NativeSdk, RawHandle, ToplistType};
use core_runtime::logging::redact_if_sensitive;
use core_runtime::SessionConfig;
use tracing::{debug, info};

use crate::callback::CallbackBridge;
use crate::container::PlaylistContainer;
use crate::context::SessionCore;
use crate::error::{Result, SessionError};
use crate::events::ListenerId;
use crate::objects::{Link, User};
use crate::playlist::Playlist;
use crate::toplist::{Toplist, ToplistRegion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEventKind {
    LoggedIn,
    LoggedOut,
    ConnectionStateUpdated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Login finished; carries the native status of the attempt.
    LoggedIn(ErrorType),
    LoggedOut,
    ConnectionStateUpdated,
}

impl SessionEvent {
    pub fn kind(&self) -> SessionEventKind {
        match self {
            SessionEvent::LoggedIn(_) => SessionEventKind::LoggedIn,
            SessionEvent::LoggedOut => SessionEventKind::LoggedOut,
            SessionEvent::ConnectionStateUpdated => SessionEventKind::ConnectionStateUpdated,
        }
    }
}

pub(crate) type SessionListener = dyn Fn(&SessionEvent) + Send + Sync;

/// A live native session.
///
/// The session owns the object cache, the set of objects with registered
/// listeners and the table of pending asynchronous requests. Dropping it
/// deregisters every listener and abandons pending requests; objects still
/// held by the host keep the native session alive until they are dropped.
pub struct Session {
    core: Arc<SessionCore>,
}

impl Session {
    /// Create a native session with the given configuration.
    pub fn new(sdk: Arc<dyn NativeSdk>, config: SessionConfig) -> Result<Self> {
        config.validate()?;

        let bridge = Arc::new(CallbackBridge::new());
        let handle = sdk
            .session_create(&config.native(), bridge.clone())
            .map_err(SessionError::Native)?;
        let core = Arc::new(SessionCore::new(sdk, handle, config));
        bridge.attach(&core);

        info!(handle = ?handle, "Session created");
        Ok(Self { core })
    }

    /// Start logging in. Completion is reported through
    /// [`SessionEvent::LoggedIn`].
    pub fn login(&self, username: &str, password: &str, remember_me: bool) -> Result<()> {
        info!(
            username = %redact_if_sensitive("username", username),
            remember_me,
            "Logging in"
        );
        let _serial = self.core.lock();
        let code = self
            .core
            .sdk()
            .session_login(self.core.handle(), username, password, remember_me);
        SessionError::maybe_raise(code)
    }

    pub fn logout(&self) -> Result<()> {
        info!("Logging out");
        let _serial = self.core.lock();
        SessionError::maybe_raise(self.core.sdk().session_logout(self.core.handle()))
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.core.connection_state()
    }

    /// The logged-in user's playlist container, if logged in.
    pub fn playlist_container(&self) -> Option<PlaylistContainer> {
        let _serial = self.core.lock();
        self.core
            .sdk()
            .session_playlistcontainer(self.core.handle())
            .map(|raw| PlaylistContainer::acquire(&self.core, raw))
    }

    /// The logged-in user, if logged in.
    pub fn user(&self) -> Option<User> {
        let _serial = self.core.lock();
        self.core
            .sdk()
            .session_user(self.core.handle())
            .map(|raw| User::acquire(&self.core, raw))
    }

    /// Parse a URI into a link.
    pub fn get_link(&self, uri: &str) -> Result<Link> {
        let _serial = self.core.lock();
        match self.core.sdk().link_create_from_string(uri) {
            Some(raw) => Ok(Link::adopt(&self.core, raw)),
            None => Err(SessionError::InvalidValue(format!(
                "Failed to get link from URI: {uri:?}"
            ))),
        }
    }

    /// Look up the playlist behind a playlist URI.
    pub fn get_playlist(&self, uri: &str) -> Result<Playlist> {
        let link = self.get_link(uri)?;
        link.as_playlist()
            .ok_or_else(|| SessionError::InvalidValue(format!("Not a playlist URI: {uri:?}")))
    }

    /// Request a toplist.
    ///
    /// `canonical_username` selects the user for [`ToplistRegion::User`];
    /// when omitted there, the logged-in user's toplist is requested. It is
    /// passed on for every region. The optional
    /// `callback` runs once, on the SDK's thread, after the toplist finished
    /// loading; the toplist is kept alive until then even if the caller drops
    /// it.
    pub fn get_toplist<F>(
        &self,
        toplist_type: ToplistType,
        region: ToplistRegion,
        canonical_username: Option<&str>,
        callback: Option<F>,
    ) -> Result<Toplist>
    where
        F: FnOnce(&Toplist) + Send + 'static,
    {
        let (toplist, fire_now) = {
            let _serial = self.core.lock();
            let pending = self.core.pending();
            let token = pending.reserve();
            let raw = self.core.sdk().toplistbrowse_create(
                self.core.handle(),
                toplist_type,
                region.code(),
                canonical_username,
                Some(token),
            );
            let Some(raw) = raw else {
                pending.cancel(token);
                return Err(SessionError::Operation(format!(
                    "Toplist browse request failed: {toplist_type:?} in {region}"
                )));
            };

            let toplist = Toplist::adopt(
                &self.core,
                raw,
                toplist_type,
                region,
                canonical_username.map(str::to_owned),
            );
            let completion = toplist.completion(callback);
            (toplist, pending.arm(token, completion))
        };

        if let Some(completion) = fire_now {
            completion();
        }
        debug!(handle = ?toplist.raw(), "Toplist requested");
        Ok(toplist)
    }

    /// Bind a listener to session events.
    pub fn on<F>(&self, kind: SessionEventKind, listener: F) -> ListenerId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let (id, _) = self.core.events().on(kind, Arc::new(listener));
        id
    }

    /// Unbind session listeners; see [`PlaylistContainer::off`] for the filters.
    pub fn off(&self, kind: Option<SessionEventKind>, listener: Option<ListenerId>) {
        self.core.events().off(kind, listener);
    }

    pub fn listener_count(&self, kind: SessionEventKind) -> usize {
        self.core.events().count(kind)
    }

    /// Number of objects that currently have native dispatch registered.
    pub fn active_emitter_count(&self) -> usize {
        self.core.emitters().len()
    }

    /// Number of asynchronous requests awaiting completion.
    pub fn pending_request_count(&self) -> usize {
        self.core.pending().len()
    }

    /// Number of live cached wrappers.
    pub fn cached_object_count(&self) -> usize {
        self.core.cache().len()
    }

    pub fn config(&self) -> &SessionConfig {
        self.core.config()
    }

    pub fn raw(&self) -> RawHandle {
        self.core.handle()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let (emitters, pending) = {
            let _serial = self.core.lock();
            (self.core.emitters().drain(), self.core.pending().drain())
        };
        debug!(
            emitters = emitters.len(),
            pending = pending.len(),
            "Session closing"
        );
        for emitter in &emitters {
            emitter.detach();
        }
        self.core.events().off(None, None);
        drop(emitters);
        drop(pending);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("handle", &self.core.handle())
            .field("connection_state", &self.connection_state())
            .finish()
    }
}
