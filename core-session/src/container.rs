//! The user's ordered playlist container.
//!
//! Natively the container is one flat array. Each entry is a playlist, a
//! folder start marker, a folder end marker or a placeholder the backend has
//! not described yet; reading a placeholder is an error. This module
//! presents it as a mutable sequence:
//!
//! - index reads and writes are bounds-checked against the live length
//! - writes are insert-then-delete
//! - removing a folder removes both of its markers, and optionally
//!   everything between them

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{PlaylistType, RawHandle};
use tracing::{debug, info};

use crate::context::SessionCore;
use crate::error::{Result, SessionError};
use crate::events::{ActiveEmitter, EventEmitter, ListenerId};
use crate::folder::{
    build_tree, find_folder_indexes, FolderBoundary, FolderNode, PlaylistFolder,
};
use crate::handle::NativeHandle;
use crate::load::Loadable;
use crate::objects::{Link, User};
use crate::playlist::Playlist;
use crate::slice::SliceBounds;
use crate::unseen::PlaylistUnseenTracks;

/// One element of the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerEntry {
    Playlist(Playlist),
    Folder(PlaylistFolder),
}

impl ContainerEntry {
    pub fn as_playlist(&self) -> Option<&Playlist> {
        match self {
            ContainerEntry::Playlist(playlist) => Some(playlist),
            _ => None,
        }
    }
}

impl FolderBoundary for ContainerEntry {
    fn as_folder(&self) -> Option<&PlaylistFolder> {
        match self {
            ContainerEntry::Folder(folder) => Some(folder),
            _ => None,
        }
    }
}

/// What to put at a position: a new playlist by name, or an existing one.
#[derive(Debug, Clone)]
pub enum NewEntry {
    Name(String),
    Playlist(Playlist),
}

impl From<&str> for NewEntry {
    fn from(name: &str) -> Self {
        NewEntry::Name(name.to_owned())
    }
}

impl From<String> for NewEntry {
    fn from(name: String) -> Self {
        NewEntry::Name(name)
    }
}

impl From<Playlist> for NewEntry {
    fn from(playlist: Playlist) -> Self {
        NewEntry::Playlist(playlist)
    }
}

/// An existing playlist to add, by wrapper or by link.
pub enum PlaylistSource<'a> {
    Playlist(&'a Playlist),
    Link(&'a Link),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerEventKind {
    PlaylistAdded,
    PlaylistRemoved,
    PlaylistMoved,
    ContainerLoaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerEvent {
    PlaylistAdded {
        playlist: Playlist,
        position: usize,
    },
    PlaylistRemoved {
        playlist: Playlist,
        position: usize,
    },
    PlaylistMoved {
        playlist: Playlist,
        old_position: usize,
        new_position: usize,
    },
    ContainerLoaded,
}

impl ContainerEvent {
    pub fn kind(&self) -> ContainerEventKind {
        match self {
            ContainerEvent::PlaylistAdded { .. } => ContainerEventKind::PlaylistAdded,
            ContainerEvent::PlaylistRemoved { .. } => ContainerEventKind::PlaylistRemoved,
            ContainerEvent::PlaylistMoved { .. } => ContainerEventKind::PlaylistMoved,
            ContainerEvent::ContainerLoaded => ContainerEventKind::ContainerLoaded,
        }
    }
}

pub(crate) type ContainerListener = dyn Fn(&PlaylistContainer, &ContainerEvent) + Send + Sync;

pub(crate) struct ContainerInner {
    handle: NativeHandle,
    events: EventEmitter<ContainerEventKind, ContainerListener>,
}

impl ActiveEmitter for ContainerInner {
    fn detach(&self) {
        if self.events.off(None, None) {
            let core = self.handle.core();
            let _serial = core.lock();
            let code = core.sdk().container_remove_callbacks(self.handle.raw());
            if let Err(err) = SessionError::maybe_raise(code) {
                debug!(handle = ?self.handle, error = %err, "Failed to deregister container dispatch");
            }
        }
    }
}

/// The logged-in user's playlists and folders, in order.
#[derive(Clone)]
pub struct PlaylistContainer(Arc<ContainerInner>);

impl PlaylistContainer {
    pub(crate) fn acquire(core: &Arc<SessionCore>, raw: RawHandle) -> Self {
        Self(core.cached(raw, || ContainerInner {
            handle: NativeHandle::acquire(core, raw).cached(),
            events: EventEmitter::new(),
        }))
    }

    fn core(&self) -> &Arc<SessionCore> {
        self.0.handle.core()
    }

    pub fn raw(&self) -> RawHandle {
        self.0.handle.raw()
    }

    pub fn same_instance(&self, other: &PlaylistContainer) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of entries, folder markers included. Zero while the native
    /// count is undefined.
    pub fn len(&self) -> usize {
        let core = self.core();
        let _serial = core.lock();
        usize::try_from(core.sdk().container_num_playlists(self.raw())).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let len = self.len();
        if index < len {
            Ok(())
        } else {
            Err(SessionError::out_of_range(index, len))
        }
    }

    fn native_index(index: usize) -> Result<i32> {
        i32::try_from(index).map_err(|_| SessionError::out_of_range(index, i32::MAX as usize))
    }

    /// The folder marker at native `position`, or `None` for any other kind
    /// of entry. Reads no playlist.
    fn folder_at(&self, core: &Arc<SessionCore>, position: i32) -> Result<Option<PlaylistFolder>> {
        let sdk = core.sdk();
        let raw = self.raw();
        match sdk.container_playlist_type(raw, position) {
            PlaylistType::StartFolder => {
                let name = sdk
                    .container_folder_name(raw, position)
                    .map_err(SessionError::Native)?;
                Ok(Some(PlaylistFolder::start(
                    sdk.container_folder_id(raw, position),
                    name,
                )))
            }
            PlaylistType::EndFolder => Ok(Some(PlaylistFolder::end(
                sdk.container_folder_id(raw, position),
            ))),
            PlaylistType::Playlist | PlaylistType::Placeholder => Ok(None),
        }
    }

    /// The entry at `index`.
    ///
    /// Fails with [`SessionError::Operation`] on a placeholder, and on a
    /// playlist slot the native side returns no playlist for.
    pub fn get(&self, index: usize) -> Result<ContainerEntry> {
        let core = self.core();
        let _serial = core.lock();
        self.check_index(index)?;
        let position = Self::native_index(index)?;
        let sdk = core.sdk();
        let raw = self.raw();

        match sdk.container_playlist_type(raw, position) {
            PlaylistType::Playlist => sdk
                .container_playlist(raw, position)
                .map(|playlist| ContainerEntry::Playlist(Playlist::acquire(core, playlist)))
                .ok_or_else(|| {
                    SessionError::Operation(format!("No playlist at index {index}"))
                }),
            PlaylistType::Placeholder => Err(SessionError::Operation(format!(
                "Unknown playlist type at index {index}"
            ))),
            PlaylistType::StartFolder | PlaylistType::EndFolder => self
                .folder_at(core, position)?
                .map(ContainerEntry::Folder)
                .ok_or_else(|| SessionError::Operation(format!("No folder at index {index}"))),
        }
    }

    /// Every entry, read under one lock so the snapshot is consistent.
    pub fn entries(&self) -> Result<Vec<ContainerEntry>> {
        let _serial = self.core().lock();
        (0..self.len()).map(|index| self.get(index)).collect()
    }

    /// The entries in `bounds`. The whole container is read to build it.
    pub fn slice(&self, bounds: SliceBounds) -> Result<Vec<ContainerEntry>> {
        let _serial = self.core().lock();
        let entries = self.entries()?;
        Ok(entries[bounds.resolve(entries.len())].to_vec())
    }

    /// Folder markers by position, `None` for everything else.
    fn folder_markers(&self) -> Result<Vec<Option<PlaylistFolder>>> {
        let core = self.core();
        let _serial = core.lock();
        (0..self.len())
            .map(|index| self.folder_at(core, Self::native_index(index)?))
            .collect()
    }

    /// Replace the entry at `index`: insert the new entry there, then remove
    /// the entry that was at `index` before the insert.
    pub fn set(&self, index: usize, entry: NewEntry) -> Result<()> {
        let _serial = self.core().lock();
        self.check_index(index)?;
        let original = if self.insert_entry(index, entry)? {
            index + 1
        } else {
            index
        };
        self.remove_playlist(original, false)
    }

    /// Replace a range with `entries`: insert them in order at the range start,
    /// then remove the displaced range from the highest position down.
    pub fn set_slice(&self, bounds: SliceBounds, entries: Vec<NewEntry>) -> Result<()> {
        let _serial = self.core().lock();
        let range = bounds.resolve(self.len());
        let mut inserted = 0;
        for entry in entries {
            if self.insert_entry(range.start + inserted, entry)? {
                inserted += 1;
            }
        }
        for index in range.rev() {
            self.remove_playlist(index + inserted, false)?;
        }
        Ok(())
    }

    /// Remove the entry at `index`, like [`remove_playlist`](Self::remove_playlist)
    /// without recursion.
    pub fn delete(&self, index: usize) -> Result<()> {
        self.remove_playlist(index, false)
    }

    pub fn delete_slice(&self, bounds: SliceBounds) -> Result<()> {
        let _serial = self.core().lock();
        for index in bounds.resolve(self.len()).rev() {
            self.remove_playlist(index, false)?;
        }
        Ok(())
    }

    /// Put `entry` at `index` without removing anything. An existing playlist
    /// the native side declines, for instance one already in the container,
    /// leaves the container unchanged.
    pub fn insert(&self, index: usize, entry: NewEntry) -> Result<()> {
        self.insert_entry(index, entry).map(drop)
    }

    /// Whether the container grew.
    fn insert_entry(&self, index: usize, entry: NewEntry) -> Result<bool> {
        match entry {
            NewEntry::Name(name) => self.add_new_playlist(&name, Some(index)).map(|_| true),
            NewEntry::Playlist(playlist) => Ok(self
                .add_playlist(PlaylistSource::Playlist(&playlist), Some(index))?
                .is_some()),
        }
    }

    fn validate_name(&self, name: &str) -> Result<()> {
        let max = self.core().config().max_name_length;
        if name.trim().is_empty() {
            return Err(SessionError::InvalidValue(
                "Playlist name cannot be empty or only whitespace".to_owned(),
            ));
        }
        if name.chars().count() > max {
            return Err(SessionError::InvalidValue(format!(
                "Playlist name cannot be longer than {max} characters"
            )));
        }
        Ok(())
    }

    /// Move the most recently appended entry to `index`, if it is not there already.
    fn move_last_to(&self, index: usize) -> Result<()> {
        let last = self.len().saturating_sub(1);
        if index != last {
            self.move_playlist(last, index, false)?;
        }
        Ok(())
    }

    /// Create a playlist, appended or placed at `index`.
    pub fn add_new_playlist(&self, name: &str, index: Option<usize>) -> Result<Playlist> {
        self.validate_name(name)?;
        let core = self.core();
        let _serial = core.lock();
        let raw = core
            .sdk()
            .container_add_new_playlist(self.raw(), name)
            .ok_or_else(|| SessionError::Operation(format!("Failed to add new playlist {name:?}")))?;
        let playlist = Playlist::acquire(core, raw);
        info!(name, ?index, "Playlist created");
        if let Some(index) = index {
            self.move_last_to(index)?;
        }
        Ok(playlist)
    }

    /// Add an existing playlist, appended or placed at `index`.
    ///
    /// Returns `None` when the native side declines, for instance because the
    /// playlist is already in the container.
    pub fn add_playlist(
        &self,
        source: PlaylistSource<'_>,
        index: Option<usize>,
    ) -> Result<Option<Playlist>> {
        let core = self.core();
        let _serial = core.lock();
        let owned_link;
        let link = match source {
            PlaylistSource::Link(link) => link,
            PlaylistSource::Playlist(playlist) => {
                owned_link = playlist.link()?;
                &owned_link
            }
        };
        let Some(raw) = core.sdk().container_add_playlist(self.raw(), link.raw()) else {
            debug!(link = ?link.raw(), "Playlist was not added");
            return Ok(None);
        };
        let playlist = Playlist::acquire(core, raw);
        if let Some(index) = index {
            self.move_last_to(index)?;
        }
        Ok(Some(playlist))
    }

    /// Create an empty folder at `index`, or at the end.
    pub fn add_folder(&self, name: &str, index: Option<usize>) -> Result<()> {
        self.validate_name(name)?;
        let core = self.core();
        let _serial = core.lock();
        let index = index.unwrap_or_else(|| self.len());
        let code = core
            .sdk()
            .container_add_folder(self.raw(), Self::native_index(index)?, name);
        SessionError::maybe_raise(code)?;
        info!(name, index, "Folder created");
        Ok(())
    }

    /// Remove the entry at `index`.
    ///
    /// Removing a folder marker removes both markers of that folder; with
    /// `recursive` it also removes everything between them.
    pub fn remove_playlist(&self, index: usize, recursive: bool) -> Result<()> {
        let core = self.core();
        let _serial = core.lock();
        self.check_index(index)?;
        let indexes = match self.folder_at(core, Self::native_index(index)?)? {
            Some(folder) => find_folder_indexes(&self.folder_markers()?, folder.id, recursive),
            None => vec![index],
        };
        for index in indexes.into_iter().rev() {
            let code = core
                .sdk()
                .container_remove_playlist(self.raw(), Self::native_index(index)?);
            SessionError::maybe_raise(code)?;
        }
        Ok(())
    }

    /// Move an entry. With `dry_run` the native side only validates the move.
    pub fn move_playlist(&self, from: usize, to: usize, dry_run: bool) -> Result<()> {
        let core = self.core();
        let _serial = core.lock();
        let code = core.sdk().container_move_playlist(
            self.raw(),
            Self::native_index(from)?,
            Self::native_index(to)?,
            dry_run,
        );
        SessionError::maybe_raise(code)
    }

    pub fn owner(&self) -> Option<User> {
        let core = self.core();
        let _serial = core.lock();
        core.sdk()
            .container_owner(self.raw())
            .map(|raw| User::acquire(core, raw))
    }

    pub fn get_unseen_tracks(&self, playlist: &Playlist) -> Result<PlaylistUnseenTracks> {
        PlaylistUnseenTracks::new(self.core(), self.raw(), playlist.raw())
    }

    pub fn clear_unseen_tracks(&self, playlist: &Playlist) -> Result<()> {
        let core = self.core();
        let _serial = core.lock();
        match core.sdk().container_clear_unseen_tracks(self.raw(), playlist.raw()) {
            0 => Ok(()),
            _ => Err(SessionError::Operation(
                "Failed clearing unseen tracks".to_owned(),
            )),
        }
    }

    /// The positions to remove for folder `folder_id`; see
    /// [`find_folder_indexes`].
    pub fn find_folder_indexes(&self, folder_id: u64, recursive: bool) -> Result<Vec<usize>> {
        Ok(find_folder_indexes(&self.folder_markers()?, folder_id, recursive))
    }

    /// The entries nested by folder.
    pub fn folder_tree(&self) -> Result<Vec<FolderNode<ContainerEntry>>> {
        Ok(build_tree(self.entries()?))
    }

    /// Bind a listener. The first binding registers native dispatch and keeps
    /// this container alive until the last binding is removed.
    pub fn on<F>(&self, kind: ContainerEventKind, listener: F) -> Result<ListenerId>
    where
        F: Fn(&PlaylistContainer, &ContainerEvent) + Send + Sync + 'static,
    {
        let core = self.core();
        let _serial = core.lock();
        let (id, first) = self.0.events.on(kind, Arc::new(listener));
        if first {
            let code = core.sdk().container_add_callbacks(self.raw());
            if let Err(err) = SessionError::maybe_raise(code) {
                self.0.events.off(None, Some(id));
                return Err(err);
            }
            core.emitters().insert(self.raw(), self.0.clone());
            debug!(handle = ?self.raw(), "Container dispatch registered");
        }
        Ok(id)
    }

    /// Unbind listeners.
    ///
    /// With neither filter every listener goes; with only `kind`, every
    /// listener of that kind; with `listener`, just that binding. Removing the
    /// last listener deregisters native dispatch.
    pub fn off(&self, kind: Option<ContainerEventKind>, listener: Option<ListenerId>) -> Result<()> {
        let core = self.core();
        let (removed, code) = {
            let _serial = core.lock();
            if !self.0.events.off(kind, listener) {
                return Ok(());
            }
            let removed = core.emitters().remove(self.raw());
            let code = core.sdk().container_remove_callbacks(self.raw());
            debug!(handle = ?self.raw(), "Container dispatch deregistered");
            (removed, code)
        };
        drop(removed);
        SessionError::maybe_raise(code)
    }

    pub fn listener_count(&self, kind: ContainerEventKind) -> usize {
        self.0.events.count(kind)
    }

    pub(crate) fn emit(&self, event: &ContainerEvent) {
        for listener in self.0.events.listeners(event.kind()) {
            listener(self, event);
        }
    }
}

impl Loadable for PlaylistContainer {
    fn is_loaded(&self) -> bool {
        let core = self.core();
        let _serial = core.lock();
        core.sdk().container_is_loaded(self.raw())
    }

    fn load(&self, timeout: Option<Duration>) -> Result<&Self> {
        self.core()
            .wait_loaded("playlist container", timeout, None, || self.is_loaded())?;
        Ok(self)
    }
}

impl PartialEq for PlaylistContainer {
    fn eq(&self, other: &Self) -> bool {
        self.raw() == other.raw()
    }
}

impl Eq for PlaylistContainer {}

impl Hash for PlaylistContainer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw().hash(state);
    }
}

impl fmt::Debug for PlaylistContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entries() {
            Ok(entries) => f.debug_list().entries(entries).finish(),
            Err(_) => write!(f, "PlaylistContainer({:?})", self.raw()),
        }
    }
}
