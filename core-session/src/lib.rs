//! # Core Session
//!
//! Safe, identity-preserving bindings over the native streaming SDK.
//!
//! ## Overview
//!
//! A [`Session`] wraps one native session. Everything reachable from it
//! (playlists, the playlist container, toplists, tracks, users, links) is a
//! wrapper holding exactly one native reference, released when the wrapper is
//! dropped. Wrappers for the same native object are the same instance for as
//! long as one is alive, so listeners bound to a playlist obtained one way see
//! events no matter how the playlist is reached later.
//!
//! The SDK reports progress by calling back on its own thread. Those upcalls
//! are routed to the matching wrapper's listeners, or to the completion
//! callback registered with an asynchronous request. Objects with listeners
//! are kept alive by the session until their last listener is removed.
//!
//! ## Usage
//!
//! ```ignore
//! use core_session::{Loadable, Session};
//!
//! let session = Session::new(sdk, config)?;
//! session.login("alice", "secret", false)?;
//! // ... wait for SessionEvent::LoggedIn ...
//! let container = session.playlist_container().expect("logged in");
//! container.load(None)?;
//! let playlist = container.add_new_playlist("Road trip", Some(0))?;
//! container.add_folder("Archive", None)?;
//! ```
//!
//! ## Locking
//!
//! Every native call, and every change to the cache, the listener registry
//! and the pending request table, happens under one reentrant session lock.
//! Listeners and completion callbacks always run after it is released.

mod cache;
mod callback;
mod container;
mod context;
mod error;
mod events;
mod folder;
mod handle;
pub mod host;
mod load;
mod objects;
mod playlist;
mod sequence;
mod session;
mod signal;
mod slice;
mod toplist;
mod unseen;

pub use container::{
    ContainerEntry, ContainerEvent, ContainerEventKind, NewEntry, PlaylistContainer,
    PlaylistSource,
};
pub use error::{Result, SessionError};
pub use events::ListenerId;
pub use folder::{
    build_tree, find_folder_indexes, FolderBoundary, FolderBoundaryKind, FolderNode,
    PlaylistFolder,
};
pub use load::Loadable;
pub use objects::{Album, Artist, Link, Track, User};
pub use playlist::{Playlist, PlaylistEvent, PlaylistEventKind};
pub use sequence::SequenceView;
pub use session::{Session, SessionEvent, SessionEventKind};
pub use signal::CompletionSignal;
pub use slice::SliceBounds;
pub use toplist::{RequestDuration, Toplist, ToplistRegion};
pub use unseen::PlaylistUnseenTracks;
