//! # Native SDK Bridge Traits
//!
//! The contract between the binding core and the native streaming SDK.
//!
//! ## Overview
//!
//! The native SDK is an opaque capability provider: it hands out reference
//! counted resources (sessions, playlists, containers, toplists, tracks, ...),
//! answers synchronous queries about them, and reports completion of
//! asynchronous requests by calling back into the binding on a thread of its
//! own choosing. This crate describes that surface as a set of traits, one per
//! native area, so the core never touches a raw pointer directly and so that
//! alternative backends (the real C library, the `bridge-sim` simulator) can
//! be swapped freely.
//!
//! ## Traits
//!
//! ### Resource lifetime
//! - [`ReferenceCounting`](refcount::ReferenceCounting) - add_ref / release on any handle
//!
//! ### Native areas
//! - [`SessionApi`](session::SessionApi) - Session creation, login and root objects
//! - [`PlaylistContainerApi`](container::PlaylistContainerApi) - Flat playlist array with folder sentinels
//! - [`PlaylistApi`](playlist::PlaylistApi) - Playlist properties and dispatch registration
//! - [`ToplistBrowseApi`](toplist::ToplistBrowseApi) - Toplist browse requests and results
//! - [`MetadataApi`](metadata::MetadataApi) - Tracks, albums, artists, users and links
//!
//! ### Upcalls
//! - [`NativeCallbacks`](callbacks::NativeCallbacks) - Completion and event notifications
//!   delivered by the SDK
//!
//! ### Host integration
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Handle Ownership
//!
//! Every method returning an `Option<RawHandle>` documents whether the
//! reference is *borrowed* (the caller must `add_ref` to keep it) or
//! *pre-owned* (the SDK already counted one reference for the caller). The
//! core wraps borrowed handles with an acquire and pre-owned handles without
//! one; either way exactly one `release` follows.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`. Implementations are not required to be
//! reentrant: the core serializes every call through a single lock.

pub mod callbacks;
pub mod container;
pub mod error;
pub mod handle;
pub mod logging;
pub mod metadata;
pub mod playlist;
pub mod refcount;
pub mod session;
pub mod toplist;
pub mod types;

pub use callbacks::NativeCallbacks;
pub use container::PlaylistContainerApi;
pub use error::{ErrorType, NativeResult};
pub use handle::{CompletionToken, HandleKind, RawHandle};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use metadata::MetadataApi;
pub use playlist::PlaylistApi;
pub use refcount::ReferenceCounting;
pub use session::{NativeSessionConfig, SessionApi};
pub use toplist::{ToplistBrowseApi, REGION_EVERYWHERE, REGION_USER};
pub use types::{ConnectionState, PlaylistType, ToplistType};

/// The full native surface required by the core.
///
/// Implemented automatically for any type providing every capability trait.
pub trait NativeSdk:
    ReferenceCounting
    + SessionApi
    + PlaylistContainerApi
    + PlaylistApi
    + ToplistBrowseApi
    + MetadataApi
    + Send
    + Sync
{
}

impl<T> NativeSdk for T where
    T: ReferenceCounting
        + SessionApi
        + PlaylistContainerApi
        + PlaylistApi
        + ToplistBrowseApi
        + MetadataApi
        + Send
        + Sync
{
}
