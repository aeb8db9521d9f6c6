//! Object store and bookkeeping behind [`SimSdk`](crate::SimSdk).

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use bridge_traits::{
    ConnectionState, ErrorType, HandleKind, NativeCallbacks, PlaylistType, RawHandle, ToplistType,
};
use tracing::warn;

use crate::worker::Job;

/// One entry of a simulated playlist container, as seeded or observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEntry {
    Playlist(String),
    StartFolder { id: u64, name: String },
    EndFolder { id: u64 },
    Placeholder,
}

impl SimEntry {
    pub fn playlist(name: impl Into<String>) -> Self {
        SimEntry::Playlist(name.into())
    }

    pub fn start_folder(id: u64, name: impl Into<String>) -> Self {
        SimEntry::StartFolder {
            id,
            name: name.into(),
        }
    }

    pub fn end_folder(id: u64) -> Self {
        SimEntry::EndFolder { id }
    }
}

/// A state changing native call, recorded in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimCall {
    Login { username: String, remember_me: bool },
    Logout,
    AddNewPlaylist { name: String },
    AddPlaylist { uri: String },
    AddFolder { index: i32, name: String },
    RemovePlaylist { index: i32 },
    MovePlaylist { from: i32, to: i32, dry_run: bool },
    GetUnseenTracks { playlist: RawHandle, capacity: usize },
    ClearUnseenTracks { playlist: RawHandle },
    ContainerAddCallbacks(RawHandle),
    ContainerRemoveCallbacks(RawHandle),
    PlaylistAddCallbacks(RawHandle),
    PlaylistRemoveCallbacks(RawHandle),
    ToplistBrowseCreate {
        toplist_type: ToplistType,
        region: i32,
        username: Option<String>,
    },
}

/// Native calls whose next invocation can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    Login,
    AddNewPlaylist,
    AddPlaylist,
    AddFolder,
    RemovePlaylist,
    MovePlaylist,
    GetUnseenTracks,
    ClearUnseenTracks,
    LinkFromPlaylist,
    ToplistBrowse,
}

/// Reference count bookkeeping for one handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefLedger {
    /// References currently held by the binding.
    pub count: i64,
    pub add_refs: usize,
    pub releases: usize,
    /// References handed out by creation calls.
    pub pre_owned: usize,
}

pub(crate) enum Slot {
    Playlist(RawHandle),
    Start { id: u64, name: String },
    End { id: u64 },
    Placeholder,
}

impl Slot {
    fn playlist_type(&self) -> PlaylistType {
        match self {
            Slot::Playlist(_) => PlaylistType::Playlist,
            Slot::Start { .. } => PlaylistType::StartFolder,
            Slot::End { .. } => PlaylistType::EndFolder,
            Slot::Placeholder => PlaylistType::Placeholder,
        }
    }
}

pub(crate) struct PlaylistData {
    pub name: String,
    pub uri: String,
    pub loaded: bool,
    pub callbacks: bool,
}

pub(crate) struct ContainerData {
    pub owner: RawHandle,
    pub slots: Vec<Slot>,
    pub loaded: bool,
    pub callbacks: bool,
}

pub(crate) struct ToplistData {
    pub loaded: bool,
    pub error: ErrorType,
    pub duration: i32,
    pub tracks: Vec<RawHandle>,
    pub albums: Vec<RawHandle>,
    pub artists: Vec<RawHandle>,
}

pub(crate) struct UserData {
    pub canonical_name: String,
    pub display_name: String,
}

pub(crate) enum Object {
    Session,
    Playlist(PlaylistData),
    Container(ContainerData),
    Toplist(ToplistData),
    Named(String),
    User(UserData),
    Link(String),
}

pub(crate) struct SimState {
    next_addr: usize,
    next_folder_id: u64,
    next_playlist_no: u64,
    pub objects: HashMap<RawHandle, Object>,
    named: HashMap<(HandleKind, String), RawHandle>,
    pub refs: HashMap<RawHandle, RefLedger>,
    pub violations: Vec<String>,
    pub calls: Vec<SimCall>,
    pub failures: HashMap<FailPoint, ErrorType>,
    pub accounts: HashMap<String, String>,
    pub seed: Vec<SimEntry>,
    pub toplist_seed: HashMap<ToplistType, Vec<String>>,
    pub unseen_seed: HashMap<String, Vec<String>>,
    pub session: Option<RawHandle>,
    pub callbacks: Option<Arc<dyn NativeCallbacks>>,
    pub connection: ConnectionState,
    pub user: Option<RawHandle>,
    pub container: Option<RawHandle>,
    pub hold_completions: bool,
    pub held: Vec<Job>,
}

impl SimState {
    pub(crate) fn new() -> Self {
        Self {
            next_addr: 0x1000,
            next_folder_id: 1000,
            next_playlist_no: 1,
            objects: HashMap::new(),
            named: HashMap::new(),
            refs: HashMap::new(),
            violations: Vec::new(),
            calls: Vec::new(),
            failures: HashMap::new(),
            accounts: HashMap::new(),
            seed: Vec::new(),
            toplist_seed: HashMap::new(),
            unseen_seed: HashMap::new(),
            session: None,
            callbacks: None,
            connection: ConnectionState::LoggedOut,
            user: None,
            container: None,
            hold_completions: false,
            held: Vec::new(),
        }
    }

    pub(crate) fn allocate(&mut self, kind: HandleKind, object: Object) -> RawHandle {
        self.next_addr += 0x10;
        let addr = NonZeroUsize::MIN.saturating_add(self.next_addr - 1);
        let handle = RawHandle::from_nonzero(kind, addr);
        self.objects.insert(handle, object);
        handle
    }

    /// Look up or create the leaf object of `kind` called `name`.
    pub(crate) fn intern(&mut self, kind: HandleKind, name: &str) -> RawHandle {
        if let Some(handle) = self.named.get(&(kind, name.to_string())) {
            return *handle;
        }
        let handle = self.allocate(kind, Object::Named(name.to_string()));
        self.named.insert((kind, name.to_string()), handle);
        handle
    }

    pub(crate) fn violation(&mut self, message: String) {
        warn!(%message, "Simulated SDK protocol violation");
        self.violations.push(message);
    }

    pub(crate) fn take_failure(&mut self, point: FailPoint) -> Option<ErrorType> {
        self.failures.remove(&point)
    }

    pub(crate) fn grant(&mut self, handle: RawHandle) {
        let ledger = self.refs.entry(handle).or_default();
        ledger.count += 1;
        ledger.pre_owned += 1;
    }

    pub(crate) fn add_ref(&mut self, handle: RawHandle) {
        if !self.objects.contains_key(&handle) {
            self.violation(format!("add_ref on unknown handle {:?}", handle));
            return;
        }
        let ledger = self.refs.entry(handle).or_default();
        ledger.count += 1;
        ledger.add_refs += 1;
    }

    pub(crate) fn release(&mut self, handle: RawHandle) {
        let ledger = self.refs.entry(handle).or_default();
        if ledger.count <= 0 {
            self.violation(format!("release without a reference on {:?}", handle));
            return;
        }
        ledger.count -= 1;
        ledger.releases += 1;
    }

    pub(crate) fn new_playlist(&mut self, name: &str, owner: &str) -> RawHandle {
        let uri = format!(
            "spotify:user:{}:playlist:{:06}",
            owner, self.next_playlist_no
        );
        self.next_playlist_no += 1;
        self.allocate(
            HandleKind::Playlist,
            Object::Playlist(PlaylistData {
                name: name.to_string(),
                uri,
                loaded: true,
                callbacks: false,
            }),
        )
    }

    pub(crate) fn next_folder_id(&mut self) -> u64 {
        let id = self.next_folder_id;
        self.next_folder_id += 1;
        id
    }

    /// Build the logged in user's container from the seeded layout.
    pub(crate) fn build_container(&mut self, username: &str) -> (RawHandle, RawHandle) {
        let user = self.allocate(
            HandleKind::User,
            Object::User(UserData {
                canonical_name: username.to_string(),
                display_name: username.to_string(),
            }),
        );
        let seed = std::mem::take(&mut self.seed);
        let slots = seed
            .iter()
            .map(|entry| match entry {
                SimEntry::Playlist(name) => Slot::Playlist(self.new_playlist(name, username)),
                SimEntry::StartFolder { id, name } => Slot::Start {
                    id: *id,
                    name: name.clone(),
                },
                SimEntry::EndFolder { id } => Slot::End { id: *id },
                SimEntry::Placeholder => Slot::Placeholder,
            })
            .collect();
        let container = self.allocate(
            HandleKind::PlaylistContainer,
            Object::Container(ContainerData {
                owner: user,
                slots,
                loaded: false,
                callbacks: false,
            }),
        );
        (user, container)
    }

    pub(crate) fn container(&self, handle: RawHandle) -> Option<&ContainerData> {
        match self.objects.get(&handle) {
            Some(Object::Container(data)) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn container_mut(&mut self, handle: RawHandle) -> Option<&mut ContainerData> {
        match self.objects.get_mut(&handle) {
            Some(Object::Container(data)) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn playlist(&self, handle: RawHandle) -> Option<&PlaylistData> {
        match self.objects.get(&handle) {
            Some(Object::Playlist(data)) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn playlist_mut(&mut self, handle: RawHandle) -> Option<&mut PlaylistData> {
        match self.objects.get_mut(&handle) {
            Some(Object::Playlist(data)) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn toplist(&self, handle: RawHandle) -> Option<&ToplistData> {
        match self.objects.get(&handle) {
            Some(Object::Toplist(data)) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn toplist_mut(&mut self, handle: RawHandle) -> Option<&mut ToplistData> {
        match self.objects.get_mut(&handle) {
            Some(Object::Toplist(data)) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn name_of(&self, handle: RawHandle) -> Option<String> {
        match self.objects.get(&handle) {
            Some(Object::Named(name)) => Some(name.clone()),
            Some(Object::Playlist(data)) => Some(data.name.clone()),
            _ => None,
        }
    }

    pub(crate) fn slot_type(&self, container: RawHandle, index: i32) -> PlaylistType {
        self.slot(container, index)
            .map(Slot::playlist_type)
            .unwrap_or(PlaylistType::Placeholder)
    }

    pub(crate) fn slot(&self, container: RawHandle, index: i32) -> Option<&Slot> {
        let data = self.container(container)?;
        usize::try_from(index).ok().and_then(|i| data.slots.get(i))
    }

    pub(crate) fn playlist_by_uri(&self, uri: &str) -> Option<RawHandle> {
        self.objects.iter().find_map(|(handle, object)| match object {
            Object::Playlist(data) if data.uri == uri => Some(*handle),
            _ => None,
        })
    }

    pub(crate) fn playlist_by_name(&self, name: &str) -> Option<RawHandle> {
        let mut found: Vec<_> = self
            .objects
            .iter()
            .filter_map(|(handle, object)| match object {
                Object::Playlist(data) if data.name == name => Some(*handle),
                _ => None,
            })
            .collect();
        found.sort();
        found.first().copied()
    }

    pub(crate) fn container_contains(&self, container: RawHandle, playlist: RawHandle) -> bool {
        self.container(container)
            .map(|data| {
                data.slots
                    .iter()
                    .any(|slot| matches!(slot, Slot::Playlist(h) if *h == playlist))
            })
            .unwrap_or(false)
    }

    pub(crate) fn layout(&self) -> Vec<SimEntry> {
        let Some(data) = self.container.and_then(|h| self.container(h)) else {
            return Vec::new();
        };
        data.slots
            .iter()
            .map(|slot| match slot {
                Slot::Playlist(handle) => SimEntry::Playlist(
                    self.playlist(*handle)
                        .map(|p| p.name.clone())
                        .unwrap_or_default(),
                ),
                Slot::Start { id, name } => SimEntry::StartFolder {
                    id: *id,
                    name: name.clone(),
                },
                Slot::End { id } => SimEntry::EndFolder { id: *id },
                Slot::Placeholder => SimEntry::Placeholder,
            })
            .collect()
    }

    pub(crate) fn unseen_for(&mut self, playlist: RawHandle) -> Vec<RawHandle> {
        let Some(name) = self.playlist(playlist).map(|p| p.name.clone()) else {
            return Vec::new();
        };
        let names = self.unseen_seed.get(&name).cloned().unwrap_or_default();
        names
            .iter()
            .map(|track| self.intern(HandleKind::Track, track))
            .collect()
    }

    pub(crate) fn outstanding(&self) -> Vec<(RawHandle, i64)> {
        let mut outstanding: Vec<_> = self
            .refs
            .iter()
            .filter(|(_, ledger)| ledger.count != 0)
            .map(|(handle, ledger)| (*handle, ledger.count))
            .collect();
        outstanding.sort();
        outstanding
    }
}
