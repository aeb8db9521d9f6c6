use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bridge_traits::{
    CompletionToken, ConnectionState, ErrorType, HandleKind, MetadataApi, NativeCallbacks,
    NativeResult, NativeSessionConfig, PlaylistApi, PlaylistContainerApi, PlaylistType, RawHandle,
    ReferenceCounting, SessionApi, ToplistBrowseApi, ToplistType,
};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::state::{
    FailPoint, Object, PlaylistData, RefLedger, SimCall, SimEntry, SimState, Slot, ToplistData,
};
use crate::worker::{Job, Worker};

/// Longest playlist name the simulated backend accepts.
pub const MAX_PLAYLIST_NAME: usize = 255;

/// Backend time reported for every completed toplist browse, in milliseconds.
pub const BACKEND_REQUEST_DURATION_MS: i32 = 42;

/// In-process implementation of the native SDK.
///
/// Objects live for the lifetime of the simulator; what is tracked per handle
/// is the number of references the binding holds, so tests can assert that
/// every acquire is matched by exactly one release. Upcalls are delivered on
/// a dedicated worker thread, in the order they were produced.
pub struct SimSdk {
    state: Arc<Mutex<SimState>>,
    worker: Worker,
    in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SimSdk {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Arc::new(Mutex::new(SimState::new())),
            worker: Worker::spawn(),
            in_flight: AtomicUsize::new(0),
        })
    }

    // ---- test controls ----

    /// Accept `username`/`password`. With no accounts registered any
    /// non-empty password is accepted.
    pub fn add_account(&self, username: impl Into<String>, password: impl Into<String>) {
        self.state
            .lock()
            .accounts
            .insert(username.into(), password.into());
    }

    /// Layout of the container created at the next login.
    pub fn seed_container(&self, entries: Vec<SimEntry>) {
        self.state.lock().seed = entries;
    }

    /// Items returned by toplist browses of `toplist_type`.
    pub fn seed_toplist<I, S>(&self, toplist_type: ToplistType, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .lock()
            .toplist_seed
            .insert(toplist_type, names.into_iter().map(Into::into).collect());
    }

    /// Unseen tracks reported for the playlist called `playlist_name`.
    pub fn seed_unseen_tracks<I, S>(&self, playlist_name: &str, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.lock().unseen_seed.insert(
            playlist_name.to_string(),
            names.into_iter().map(Into::into).collect(),
        );
    }

    /// Make the next call at `point` fail with `error`.
    pub fn fail_next(&self, point: FailPoint, error: ErrorType) {
        self.state.lock().failures.insert(point, error);
    }

    /// Queue login, container load and browse completions instead of
    /// delivering them.
    pub fn hold_completions(&self) {
        self.state.lock().hold_completions = true;
    }

    /// Deliver every held completion and stop holding.
    pub fn release_completions(&self) {
        let held = {
            let mut st = self.state.lock();
            st.hold_completions = false;
            std::mem::take(&mut st.held)
        };
        for job in held {
            self.worker.submit(job);
        }
    }

    /// Block until every upcall produced so far has been delivered.
    pub fn wait_idle(&self) {
        self.worker.wait_idle();
    }

    /// The upcall target registered by `session_create`.
    pub fn callbacks(&self) -> Option<Arc<dyn NativeCallbacks>> {
        self.state.lock().callbacks.clone()
    }

    pub fn rename_playlist(&self, playlist: RawHandle, name: &str) {
        let registered = {
            let mut st = self.state.lock();
            match st.playlist_mut(playlist) {
                Some(data) => {
                    data.name = name.to_string();
                    data.callbacks
                }
                None => false,
            }
        };
        if registered {
            self.dispatch(move |cb| cb.playlist_renamed(playlist));
        }
    }

    /// Flip a playlist's loaded flag. Becoming loaded notifies registered
    /// listeners with a state change.
    pub fn set_playlist_loaded(&self, playlist: RawHandle, loaded: bool) {
        let notify = {
            let mut st = self.state.lock();
            match st.playlist_mut(playlist) {
                Some(data) => {
                    let became_loaded = loaded && !data.loaded;
                    data.loaded = loaded;
                    became_loaded && data.callbacks
                }
                None => false,
            }
        };
        if notify {
            self.dispatch(move |cb| cb.playlist_state_changed(playlist));
        }
    }

    /// Flip the loaded flag of the logged in user's container. Becoming
    /// loaded notifies a registered container.
    pub fn set_container_loaded(&self, loaded: bool) {
        let notify = {
            let mut st = self.state.lock();
            let Some(container) = st.container else {
                return;
            };
            match st.container_mut(container) {
                Some(data) => {
                    let became_loaded = loaded && !data.loaded;
                    data.loaded = loaded;
                    (became_loaded && data.callbacks).then_some(container)
                }
                None => None,
            }
        };
        if let Some(container) = notify {
            self.dispatch(move |cb| cb.container_loaded(container));
        }
    }

    /// Append a track to a completed browse result.
    pub fn push_toplist_track(&self, browse: RawHandle, name: &str) {
        let mut st = self.state.lock();
        let track = st.intern(HandleKind::Track, name);
        if let Some(data) = st.toplist_mut(browse) {
            data.tracks.push(track);
        }
    }

    /// Override the reported backend time of a browse result; negative means
    /// it was served from the local cache.
    pub fn set_toplist_duration(&self, browse: RawHandle, millis: i32) {
        if let Some(data) = self.state.lock().toplist_mut(browse) {
            data.duration = millis;
        }
    }

    // ---- inspection ----

    pub fn calls(&self) -> Vec<SimCall> {
        self.state.lock().calls.clone()
    }

    /// Return and forget the recorded calls.
    pub fn take_calls(&self) -> Vec<SimCall> {
        std::mem::take(&mut self.state.lock().calls)
    }

    /// Current layout of the logged in user's container.
    pub fn layout(&self) -> Vec<SimEntry> {
        self.state.lock().layout()
    }

    pub fn session_handle(&self) -> Option<RawHandle> {
        self.state.lock().session
    }

    pub fn container_handle(&self) -> Option<RawHandle> {
        self.state.lock().container
    }

    pub fn user_handle(&self) -> Option<RawHandle> {
        self.state.lock().user
    }

    pub fn playlist_handle(&self, name: &str) -> Option<RawHandle> {
        self.state.lock().playlist_by_name(name)
    }

    pub fn track_handle(&self, name: &str) -> RawHandle {
        self.state.lock().intern(HandleKind::Track, name)
    }

    pub fn ledger(&self, handle: RawHandle) -> RefLedger {
        self.state
            .lock()
            .refs
            .get(&handle)
            .copied()
            .unwrap_or_default()
    }

    /// Handles on which the binding still holds references.
    pub fn outstanding_references(&self) -> Vec<(RawHandle, i64)> {
        self.state.lock().outstanding()
    }

    pub fn violations(&self) -> Vec<String> {
        self.state.lock().violations.clone()
    }

    // ---- internals ----

    fn enter(&self, call: &'static str) -> InFlight<'_> {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            self.state
                .lock()
                .violation(format!("{} entered while another native call was running", call));
        }
        trace!(call, "Native call");
        InFlight(&self.in_flight)
    }

    fn dispatch<F>(&self, upcall: F)
    where
        F: FnOnce(&dyn NativeCallbacks) + Send + 'static,
    {
        let Some(callbacks) = self.state.lock().callbacks.clone() else {
            return;
        };
        self.worker.submit(Box::new(move || upcall(callbacks.as_ref())));
    }

    fn schedule_completion(&self, job: Job) {
        let mut st = self.state.lock();
        if st.hold_completions {
            st.held.push(job);
            return;
        }
        drop(st);
        self.worker.submit(job);
    }

    fn record(&self, call: SimCall) -> parking_lot::MutexGuard<'_, SimState> {
        let mut st = self.state.lock();
        st.calls.push(call);
        st
    }

    fn dispatch_container<F>(&self, container: RawHandle, upcall: F)
    where
        F: FnOnce(&dyn NativeCallbacks) + Send + 'static,
    {
        let registered = self
            .state
            .lock()
            .container(container)
            .map(|data| data.callbacks)
            .unwrap_or(false);
        if registered {
            self.dispatch(upcall);
        }
    }
}

impl Drop for SimSdk {
    fn drop(&mut self) {
        let held = std::mem::take(&mut self.state.lock().held);
        drop(held);
    }
}

fn credentials_outcome(st: &SimState, username: &str, password: &str) -> ErrorType {
    let accepted = if st.accounts.is_empty() {
        !username.is_empty() && !password.is_empty()
    } else {
        st.accounts.get(username).map(String::as_str) == Some(password)
    };
    if accepted {
        ErrorType::Ok
    } else {
        ErrorType::BadUsernameOrPassword
    }
}

impl ReferenceCounting for SimSdk {
    fn add_ref(&self, handle: RawHandle) {
        let _call = self.enter("add_ref");
        self.state.lock().add_ref(handle);
    }

    fn release(&self, handle: RawHandle) {
        let _call = self.enter("release");
        self.state.lock().release(handle);
    }
}

impl SessionApi for SimSdk {
    fn session_create(
        &self,
        config: &NativeSessionConfig,
        callbacks: Arc<dyn NativeCallbacks>,
    ) -> NativeResult<RawHandle> {
        let _call = self.enter("session_create");
        if config.application_key.is_empty() {
            return Err(ErrorType::BadApplicationKey);
        }
        if config.user_agent.is_empty() {
            return Err(ErrorType::BadUserAgent);
        }
        let mut st = self.state.lock();
        if st.session.is_some() {
            return Err(ErrorType::ApiInitializationFailed);
        }
        let session = st.allocate(HandleKind::Session, Object::Session);
        st.grant(session);
        st.session = Some(session);
        st.callbacks = Some(callbacks);
        debug!(?session, user_agent = %config.user_agent, "Session created");
        Ok(session)
    }

    fn session_release(&self, session: RawHandle) {
        let _call = self.enter("session_release");
        let callbacks = {
            let mut st = self.state.lock();
            if st.session != Some(session) {
                st.violation(format!("session_release on unknown session {:?}", session));
                return;
            }
            st.release(session);
            st.session = None;
            st.connection = ConnectionState::LoggedOut;
            st.callbacks.take()
        };
        drop(callbacks);
    }

    fn session_login(
        &self,
        session: RawHandle,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> ErrorType {
        let _call = self.enter("session_login");
        {
            let st = self.record(SimCall::Login {
                username: username.to_string(),
                remember_me,
            });
            if st.session != Some(session) {
                return ErrorType::InvalidIndata;
            }
        }

        let state = Arc::clone(&self.state);
        let username = username.to_string();
        let password = password.to_string();
        self.schedule_completion(Box::new(move || {
            let (callbacks, outcome) = {
                let mut st = state.lock();
                let outcome = match st.take_failure(FailPoint::Login) {
                    Some(error) => error,
                    None => credentials_outcome(&st, &username, &password),
                };
                if outcome.is_ok() {
                    if st.user.is_none() {
                        let (user, container) = st.build_container(&username);
                        st.user = Some(user);
                        st.container = Some(container);
                    }
                    st.connection = ConnectionState::LoggedIn;
                }
                (st.callbacks.clone(), outcome)
            };
            if let Some(callbacks) = callbacks {
                callbacks.logged_in(session, outcome);
                if outcome.is_ok() {
                    callbacks.connection_state_updated(session);
                }
            }
        }));

        let state = Arc::clone(&self.state);
        self.schedule_completion(Box::new(move || {
            let notify = {
                let mut st = state.lock();
                let Some(container) = st.container else {
                    return;
                };
                let registered = match st.container_mut(container) {
                    Some(data) if !data.loaded => {
                        data.loaded = true;
                        data.callbacks
                    }
                    _ => false,
                };
                if registered {
                    st.callbacks.clone().map(|cb| (cb, container))
                } else {
                    None
                }
            };
            if let Some((callbacks, container)) = notify {
                callbacks.container_loaded(container);
            }
        }));
        ErrorType::Ok
    }

    fn session_logout(&self, session: RawHandle) -> ErrorType {
        let _call = self.enter("session_logout");
        {
            let st = self.record(SimCall::Logout);
            if st.session != Some(session) {
                return ErrorType::InvalidIndata;
            }
        }
        let state = Arc::clone(&self.state);
        self.schedule_completion(Box::new(move || {
            let callbacks = {
                let mut st = state.lock();
                st.connection = ConnectionState::LoggedOut;
                st.callbacks.clone()
            };
            if let Some(callbacks) = callbacks {
                callbacks.logged_out(session);
                callbacks.connection_state_updated(session);
            }
        }));
        ErrorType::Ok
    }

    fn session_connection_state(&self, _session: RawHandle) -> ConnectionState {
        let _call = self.enter("session_connection_state");
        self.state.lock().connection
    }

    fn session_playlistcontainer(&self, _session: RawHandle) -> Option<RawHandle> {
        let _call = self.enter("session_playlistcontainer");
        let st = self.state.lock();
        if st.connection.allows_loading() {
            st.container
        } else {
            None
        }
    }

    fn session_user(&self, _session: RawHandle) -> Option<RawHandle> {
        let _call = self.enter("session_user");
        let st = self.state.lock();
        if st.connection.allows_loading() {
            st.user
        } else {
            None
        }
    }
}

impl PlaylistContainerApi for SimSdk {
    fn container_is_loaded(&self, container: RawHandle) -> bool {
        let _call = self.enter("container_is_loaded");
        self.state
            .lock()
            .container(container)
            .map(|data| data.loaded)
            .unwrap_or(false)
    }

    fn container_num_playlists(&self, container: RawHandle) -> i32 {
        let _call = self.enter("container_num_playlists");
        match self.state.lock().container(container) {
            Some(data) if data.loaded => data.slots.len() as i32,
            _ => -1,
        }
    }

    fn container_playlist_type(&self, container: RawHandle, index: i32) -> PlaylistType {
        let _call = self.enter("container_playlist_type");
        self.state.lock().slot_type(container, index)
    }

    fn container_playlist(&self, container: RawHandle, index: i32) -> Option<RawHandle> {
        let _call = self.enter("container_playlist");
        match self.state.lock().slot(container, index) {
            Some(Slot::Playlist(handle)) => Some(*handle),
            _ => None,
        }
    }

    fn container_folder_id(&self, container: RawHandle, index: i32) -> u64 {
        let _call = self.enter("container_folder_id");
        match self.state.lock().slot(container, index) {
            Some(Slot::Start { id, .. }) | Some(Slot::End { id }) => *id,
            _ => 0,
        }
    }

    fn container_folder_name(&self, container: RawHandle, index: i32) -> NativeResult<String> {
        let _call = self.enter("container_folder_name");
        match self.state.lock().slot(container, index) {
            Some(Slot::Start { name, .. }) => Ok(name.clone()),
            Some(Slot::End { .. }) => Ok(String::new()),
            Some(_) => Err(ErrorType::InvalidIndata),
            None => Err(ErrorType::IndexOutOfRange),
        }
    }

    fn container_add_new_playlist(&self, container: RawHandle, name: &str) -> Option<RawHandle> {
        let _call = self.enter("container_add_new_playlist");
        let (playlist, position) = {
            let mut st = self.record(SimCall::AddNewPlaylist {
                name: name.to_string(),
            });
            if st.take_failure(FailPoint::AddNewPlaylist).is_some() {
                return None;
            }
            if name.trim().is_empty() || name.chars().count() > MAX_PLAYLIST_NAME {
                return None;
            }
            let owner = st.container(container)?.owner;
            let owner_name = match st.objects.get(&owner) {
                Some(Object::User(user)) => user.canonical_name.clone(),
                _ => String::new(),
            };
            let playlist = st.new_playlist(name, &owner_name);
            let data = st.container_mut(container)?;
            data.slots.push(Slot::Playlist(playlist));
            (playlist, data.slots.len() as i32 - 1)
        };
        self.dispatch_container(container, move |cb| {
            cb.playlist_added(container, playlist, position)
        });
        Some(playlist)
    }

    fn container_add_playlist(&self, container: RawHandle, link: RawHandle) -> Option<RawHandle> {
        let _call = self.enter("container_add_playlist");
        let (playlist, position) = {
            let uri = match self.state.lock().objects.get(&link) {
                Some(Object::Link(uri)) => uri.clone(),
                _ => return None,
            };
            let mut st = self.record(SimCall::AddPlaylist { uri: uri.clone() });
            if st.take_failure(FailPoint::AddPlaylist).is_some() || !uri.contains(":playlist:") {
                return None;
            }
            let playlist = match st.playlist_by_uri(&uri) {
                Some(playlist) => playlist,
                None => playlist_for_uri(&mut st, &uri),
            };
            if st.container_contains(container, playlist) {
                return None;
            }
            let data = st.container_mut(container)?;
            data.slots.push(Slot::Playlist(playlist));
            (playlist, data.slots.len() as i32 - 1)
        };
        self.dispatch_container(container, move |cb| {
            cb.playlist_added(container, playlist, position)
        });
        Some(playlist)
    }

    fn container_add_folder(&self, container: RawHandle, index: i32, name: &str) -> ErrorType {
        let _call = self.enter("container_add_folder");
        let mut st = self.record(SimCall::AddFolder {
            index,
            name: name.to_string(),
        });
        if let Some(error) = st.take_failure(FailPoint::AddFolder) {
            return error;
        }
        if name.trim().is_empty() {
            return ErrorType::InvalidIndata;
        }
        let id = st.next_folder_id();
        let Some(data) = st.container_mut(container) else {
            return ErrorType::InvalidIndata;
        };
        let Some(at) = usize::try_from(index).ok().filter(|i| *i <= data.slots.len()) else {
            return ErrorType::IndexOutOfRange;
        };
        data.slots.insert(at, Slot::End { id });
        data.slots.insert(
            at,
            Slot::Start {
                id,
                name: name.to_string(),
            },
        );
        ErrorType::Ok
    }

    fn container_remove_playlist(&self, container: RawHandle, index: i32) -> ErrorType {
        let _call = self.enter("container_remove_playlist");
        let removed = {
            let mut st = self.record(SimCall::RemovePlaylist { index });
            if let Some(error) = st.take_failure(FailPoint::RemovePlaylist) {
                return error;
            }
            let Some(data) = st.container_mut(container) else {
                return ErrorType::InvalidIndata;
            };
            let Some(at) = usize::try_from(index).ok().filter(|i| *i < data.slots.len()) else {
                return ErrorType::IndexOutOfRange;
            };
            data.slots.remove(at)
        };
        if let Slot::Playlist(playlist) = removed {
            self.dispatch_container(container, move |cb| {
                cb.playlist_removed(container, playlist, index)
            });
        }
        ErrorType::Ok
    }

    fn container_move_playlist(
        &self,
        container: RawHandle,
        from: i32,
        to: i32,
        dry_run: bool,
    ) -> ErrorType {
        let _call = self.enter("container_move_playlist");
        let (moved, landed) = {
            let mut st = self.record(SimCall::MovePlaylist { from, to, dry_run });
            if let Some(error) = st.take_failure(FailPoint::MovePlaylist) {
                return error;
            }
            let Some(data) = st.container_mut(container) else {
                return ErrorType::InvalidIndata;
            };
            let len = data.slots.len();
            let source = usize::try_from(from).ok().filter(|i| *i < len);
            let target = usize::try_from(to).ok().filter(|i| *i <= len);
            let (Some(source), Some(target)) = (source, target) else {
                return ErrorType::IndexOutOfRange;
            };
            if dry_run {
                return ErrorType::Ok;
            }
            let slot = data.slots.remove(source);
            let landed = if target > source { target - 1 } else { target };
            let moved = match &slot {
                Slot::Playlist(playlist) => Some(*playlist),
                _ => None,
            };
            data.slots.insert(landed, slot);
            (moved, landed as i32)
        };
        if let Some(playlist) = moved {
            self.dispatch_container(container, move |cb| {
                cb.playlist_moved(container, playlist, from, landed)
            });
        }
        ErrorType::Ok
    }

    fn container_owner(&self, container: RawHandle) -> Option<RawHandle> {
        let _call = self.enter("container_owner");
        self.state.lock().container(container).map(|data| data.owner)
    }

    fn container_get_unseen_tracks(
        &self,
        container: RawHandle,
        playlist: RawHandle,
        out: &mut [Option<RawHandle>],
    ) -> i32 {
        let _call = self.enter("container_get_unseen_tracks");
        let mut st = self.record(SimCall::GetUnseenTracks {
            playlist,
            capacity: out.len(),
        });
        if st.take_failure(FailPoint::GetUnseenTracks).is_some() {
            return -1;
        }
        if !st.container_contains(container, playlist) {
            return -1;
        }
        let tracks = st.unseen_for(playlist);
        for (slot, track) in out.iter_mut().zip(tracks.iter()) {
            *slot = Some(*track);
        }
        tracks.len() as i32
    }

    fn container_clear_unseen_tracks(&self, container: RawHandle, playlist: RawHandle) -> i32 {
        let _call = self.enter("container_clear_unseen_tracks");
        let mut st = self.record(SimCall::ClearUnseenTracks { playlist });
        if st.take_failure(FailPoint::ClearUnseenTracks).is_some() {
            return -1;
        }
        if !st.container_contains(container, playlist) {
            return -1;
        }
        if let Some(name) = st.playlist(playlist).map(|p| p.name.clone()) {
            st.unseen_seed.remove(&name);
        }
        0
    }

    fn container_add_callbacks(&self, container: RawHandle) -> ErrorType {
        let _call = self.enter("container_add_callbacks");
        let mut st = self.record(SimCall::ContainerAddCallbacks(container));
        let already = match st.container_mut(container) {
            Some(data) => std::mem::replace(&mut data.callbacks, true),
            None => return ErrorType::InvalidIndata,
        };
        if already {
            st.violation(format!("callbacks registered twice on {:?}", container));
        }
        ErrorType::Ok
    }

    fn container_remove_callbacks(&self, container: RawHandle) -> ErrorType {
        let _call = self.enter("container_remove_callbacks");
        let mut st = self.record(SimCall::ContainerRemoveCallbacks(container));
        let registered = match st.container_mut(container) {
            Some(data) => std::mem::replace(&mut data.callbacks, false),
            None => return ErrorType::InvalidIndata,
        };
        if !registered {
            st.violation(format!("callbacks removed but not registered on {:?}", container));
        }
        ErrorType::Ok
    }
}

fn playlist_for_uri(st: &mut SimState, uri: &str) -> RawHandle {
    st.allocate(
        HandleKind::Playlist,
        Object::Playlist(PlaylistData {
            name: String::new(),
            uri: uri.to_string(),
            loaded: true,
            callbacks: false,
        }),
    )
}

impl PlaylistApi for SimSdk {
    fn playlist_is_loaded(&self, playlist: RawHandle) -> bool {
        let _call = self.enter("playlist_is_loaded");
        self.state
            .lock()
            .playlist(playlist)
            .map(|data| data.loaded)
            .unwrap_or(false)
    }

    fn playlist_name(&self, playlist: RawHandle) -> Option<String> {
        let _call = self.enter("playlist_name");
        self.state
            .lock()
            .playlist(playlist)
            .filter(|data| data.loaded)
            .map(|data| data.name.clone())
    }

    fn link_create_from_playlist(&self, playlist: RawHandle) -> Option<RawHandle> {
        let _call = self.enter("link_create_from_playlist");
        let mut st = self.state.lock();
        if st.take_failure(FailPoint::LinkFromPlaylist).is_some() {
            return None;
        }
        let uri = st.playlist(playlist)?.uri.clone();
        let link = st.allocate(HandleKind::Link, Object::Link(uri));
        st.grant(link);
        Some(link)
    }

    fn playlist_add_callbacks(&self, playlist: RawHandle) -> ErrorType {
        let _call = self.enter("playlist_add_callbacks");
        let mut st = self.record(SimCall::PlaylistAddCallbacks(playlist));
        let already = match st.playlist_mut(playlist) {
            Some(data) => std::mem::replace(&mut data.callbacks, true),
            None => return ErrorType::InvalidIndata,
        };
        if already {
            st.violation(format!("callbacks registered twice on {:?}", playlist));
        }
        ErrorType::Ok
    }

    fn playlist_remove_callbacks(&self, playlist: RawHandle) -> ErrorType {
        let _call = self.enter("playlist_remove_callbacks");
        let mut st = self.record(SimCall::PlaylistRemoveCallbacks(playlist));
        let registered = match st.playlist_mut(playlist) {
            Some(data) => std::mem::replace(&mut data.callbacks, false),
            None => return ErrorType::InvalidIndata,
        };
        if !registered {
            st.violation(format!("callbacks removed but not registered on {:?}", playlist));
        }
        ErrorType::Ok
    }
}

impl ToplistBrowseApi for SimSdk {
    fn toplistbrowse_create(
        &self,
        session: RawHandle,
        toplist_type: ToplistType,
        region: i32,
        username: Option<&str>,
        token: Option<CompletionToken>,
    ) -> Option<RawHandle> {
        let _call = self.enter("toplistbrowse_create");
        let browse = {
            let mut st = self.record(SimCall::ToplistBrowseCreate {
                toplist_type,
                region,
                username: username.map(str::to_string),
            });
            if st.session != Some(session) {
                return None;
            }
            let browse = st.allocate(
                HandleKind::Toplist,
                Object::Toplist(ToplistData {
                    loaded: false,
                    error: ErrorType::IsLoading,
                    duration: -1,
                    tracks: Vec::new(),
                    albums: Vec::new(),
                    artists: Vec::new(),
                }),
            );
            st.grant(browse);
            browse
        };

        let state = Arc::clone(&self.state);
        self.schedule_completion(Box::new(move || {
            let callbacks = {
                let mut st = state.lock();
                let failure = st.take_failure(FailPoint::ToplistBrowse);
                let names = st
                    .toplist_seed
                    .get(&toplist_type)
                    .cloned()
                    .unwrap_or_default();
                let kind = match toplist_type {
                    ToplistType::Artists => HandleKind::Artist,
                    ToplistType::Albums => HandleKind::Album,
                    ToplistType::Tracks => HandleKind::Track,
                };
                let items: Vec<_> = match failure {
                    Some(_) => Vec::new(),
                    None => names.iter().map(|name| st.intern(kind, name)).collect(),
                };
                if let Some(data) = st.toplist_mut(browse) {
                    data.loaded = true;
                    data.error = failure.unwrap_or(ErrorType::Ok);
                    data.duration = BACKEND_REQUEST_DURATION_MS;
                    match toplist_type {
                        ToplistType::Artists => data.artists = items,
                        ToplistType::Albums => data.albums = items,
                        ToplistType::Tracks => data.tracks = items,
                    }
                }
                st.callbacks.clone()
            };
            if let Some(callbacks) = callbacks {
                callbacks.toplistbrowse_complete(browse, token);
            }
        }));
        Some(browse)
    }

    fn toplistbrowse_is_loaded(&self, browse: RawHandle) -> bool {
        let _call = self.enter("toplistbrowse_is_loaded");
        self.state
            .lock()
            .toplist(browse)
            .map(|data| data.loaded)
            .unwrap_or(false)
    }

    fn toplistbrowse_error(&self, browse: RawHandle) -> ErrorType {
        let _call = self.enter("toplistbrowse_error");
        self.state
            .lock()
            .toplist(browse)
            .map(|data| data.error)
            .unwrap_or(ErrorType::InvalidIndata)
    }

    fn toplistbrowse_backend_request_duration(&self, browse: RawHandle) -> i32 {
        let _call = self.enter("toplistbrowse_backend_request_duration");
        self.state
            .lock()
            .toplist(browse)
            .map(|data| data.duration)
            .unwrap_or(-1)
    }

    fn toplistbrowse_num_tracks(&self, browse: RawHandle) -> i32 {
        let _call = self.enter("toplistbrowse_num_tracks");
        self.state
            .lock()
            .toplist(browse)
            .map(|data| data.tracks.len() as i32)
            .unwrap_or(0)
    }

    fn toplistbrowse_track(&self, browse: RawHandle, index: i32) -> Option<RawHandle> {
        let _call = self.enter("toplistbrowse_track");
        let st = self.state.lock();
        let data = st.toplist(browse)?;
        usize::try_from(index).ok().and_then(|i| data.tracks.get(i)).copied()
    }

    fn toplistbrowse_num_albums(&self, browse: RawHandle) -> i32 {
        let _call = self.enter("toplistbrowse_num_albums");
        self.state
            .lock()
            .toplist(browse)
            .map(|data| data.albums.len() as i32)
            .unwrap_or(0)
    }

    fn toplistbrowse_album(&self, browse: RawHandle, index: i32) -> Option<RawHandle> {
        let _call = self.enter("toplistbrowse_album");
        let st = self.state.lock();
        let data = st.toplist(browse)?;
        usize::try_from(index).ok().and_then(|i| data.albums.get(i)).copied()
    }

    fn toplistbrowse_num_artists(&self, browse: RawHandle) -> i32 {
        let _call = self.enter("toplistbrowse_num_artists");
        self.state
            .lock()
            .toplist(browse)
            .map(|data| data.artists.len() as i32)
            .unwrap_or(0)
    }

    fn toplistbrowse_artist(&self, browse: RawHandle, index: i32) -> Option<RawHandle> {
        let _call = self.enter("toplistbrowse_artist");
        let st = self.state.lock();
        let data = st.toplist(browse)?;
        usize::try_from(index).ok().and_then(|i| data.artists.get(i)).copied()
    }
}

impl MetadataApi for SimSdk {
    fn track_name(&self, track: RawHandle) -> Option<String> {
        let _call = self.enter("track_name");
        self.state.lock().name_of(track)
    }

    fn album_name(&self, album: RawHandle) -> Option<String> {
        let _call = self.enter("album_name");
        self.state.lock().name_of(album)
    }

    fn artist_name(&self, artist: RawHandle) -> Option<String> {
        let _call = self.enter("artist_name");
        self.state.lock().name_of(artist)
    }

    fn user_canonical_name(&self, user: RawHandle) -> String {
        let _call = self.enter("user_canonical_name");
        match self.state.lock().objects.get(&user) {
            Some(Object::User(data)) => data.canonical_name.clone(),
            _ => String::new(),
        }
    }

    fn user_display_name(&self, user: RawHandle) -> String {
        let _call = self.enter("user_display_name");
        match self.state.lock().objects.get(&user) {
            Some(Object::User(data)) => data.display_name.clone(),
            _ => String::new(),
        }
    }

    fn link_create_from_string(&self, uri: &str) -> Option<RawHandle> {
        let _call = self.enter("link_create_from_string");
        let parts: Vec<_> = uri.split(':').collect();
        if parts.len() < 3 || parts[0] != "spotify" || parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        let mut st = self.state.lock();
        let link = st.allocate(HandleKind::Link, Object::Link(uri.to_string()));
        st.grant(link);
        Some(link)
    }

    fn link_as_string(&self, link: RawHandle) -> String {
        let _call = self.enter("link_as_string");
        match self.state.lock().objects.get(&link) {
            Some(Object::Link(uri)) => uri.clone(),
            _ => String::new(),
        }
    }

    fn link_as_playlist(&self, _session: RawHandle, link: RawHandle) -> Option<RawHandle> {
        let _call = self.enter("link_as_playlist");
        let mut st = self.state.lock();
        let uri = match st.objects.get(&link) {
            Some(Object::Link(uri)) if uri.contains(":playlist:") => uri.clone(),
            _ => return None,
        };
        Some(match st.playlist_by_uri(&uri) {
            Some(playlist) => playlist,
            None => playlist_for_uri(&mut st, &uri),
        })
    }
}
