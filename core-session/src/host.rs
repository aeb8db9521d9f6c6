//! Dynamically typed entry points for host-language bindings.
//!
//! A scripting host hands over loosely typed keys and values. These helpers
//! check them and map them onto the typed container API, reporting type
//! mistakes as [`SessionError::InvalidIndexType`] or
//! [`SessionError::InvalidType`] before any native call is made.

use crate::container::{ContainerEntry, NewEntry, PlaylistContainer, PlaylistSource};
use crate::error::{Result, SessionError};
use crate::objects::Link;
use crate::playlist::Playlist;
use crate::slice::SliceBounds;

/// A value as received from the host.
#[derive(Debug)]
pub enum HostValue {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    Playlist(Playlist),
    Link(Link),
    List(Vec<HostValue>),
}

impl HostValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::None => "NoneType",
            HostValue::Bool(_) => "bool",
            HostValue::Int(_) => "int",
            HostValue::Str(_) => "str",
            HostValue::Playlist(_) => "Playlist",
            HostValue::Link(_) => "Link",
            HostValue::List(_) => "list",
        }
    }
}

/// A subscript as received from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKey {
    Index(i64),
    Slice(SliceBounds),
    /// Anything else, by type name.
    Other(String),
}

/// The result of a subscript read.
#[derive(Debug)]
pub enum HostItem {
    Entry(ContainerEntry),
    Entries(Vec<ContainerEntry>),
}

/// Resolve a host index. Negative indexes are rejected rather than wrapped.
fn index_in(container: &PlaylistContainer, index: i64) -> Result<usize> {
    let len = container.len();
    usize::try_from(index)
        .ok()
        .filter(|index| *index < len)
        .ok_or(SessionError::IndexOutOfRange { index, len })
}

fn other_key(type_name: &str) -> SessionError {
    SessionError::InvalidIndexType(format!("indices must be integers or slices, not {type_name}"))
}

fn to_new_entry(value: HostValue) -> Result<NewEntry> {
    match value {
        HostValue::Str(name) => Ok(NewEntry::Name(name)),
        HostValue::Playlist(playlist) => Ok(NewEntry::Playlist(playlist)),
        other => Err(SessionError::InvalidValue(format!(
            "Expected a playlist name or a Playlist, got {}",
            other.type_name()
        ))),
    }
}

pub fn get_item(container: &PlaylistContainer, key: &HostKey) -> Result<HostItem> {
    match key {
        HostKey::Index(index) => {
            let index = index_in(container, *index)?;
            container.get(index).map(HostItem::Entry)
        }
        HostKey::Slice(bounds) => container.slice(*bounds).map(HostItem::Entries),
        HostKey::Other(type_name) => Err(other_key(type_name)),
    }
}

/// Write through a subscript. Index writes need a name or playlist; slice
/// writes need a list of them, all checked before anything changes.
pub fn set_item(container: &PlaylistContainer, key: &HostKey, value: HostValue) -> Result<()> {
    match key {
        HostKey::Index(index) => {
            let index = index_in(container, *index)?;
            container.set(index, to_new_entry(value)?)
        }
        HostKey::Slice(bounds) => {
            let HostValue::List(values) = value else {
                return Err(SessionError::InvalidType(format!(
                    "can only assign an iterable, not {}",
                    value.type_name()
                )));
            };
            let entries = values
                .into_iter()
                .map(to_new_entry)
                .collect::<Result<Vec<_>>>()?;
            container.set_slice(*bounds, entries)
        }
        HostKey::Other(type_name) => Err(other_key(type_name)),
    }
}

pub fn del_item(container: &PlaylistContainer, key: &HostKey) -> Result<()> {
    match key {
        HostKey::Index(index) => {
            let index = index_in(container, *index)?;
            container.delete(index)
        }
        HostKey::Slice(bounds) => container.delete_slice(*bounds),
        HostKey::Other(type_name) => Err(other_key(type_name)),
    }
}

/// List-style insert: the position follows slice rules, so it may be
/// negative or past the end.
pub fn insert(container: &PlaylistContainer, index: i64, value: HostValue) -> Result<()> {
    let entry = to_new_entry(value)?;
    let position = SliceBounds::new(Some(index), Some(index))
        .resolve(container.len())
        .start;
    container.insert(position, entry)
}

/// Add an existing playlist given as a [`HostValue::Playlist`] or
/// [`HostValue::Link`].
pub fn add_playlist(
    container: &PlaylistContainer,
    value: &HostValue,
    index: Option<usize>,
) -> Result<Option<Playlist>> {
    let source = match value {
        HostValue::Playlist(playlist) => PlaylistSource::Playlist(playlist),
        HostValue::Link(link) => PlaylistSource::Link(link),
        other => {
            return Err(SessionError::InvalidType(format!(
                "Argument must be Link or Playlist, got {}",
                other.type_name()
            )))
        }
    };
    container.add_playlist(source, index)
}
