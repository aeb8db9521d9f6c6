//! Enumerations shared across the native surface.

/// Classification of an entry in a playlist container's flat array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaylistType {
    /// An ordinary playlist.
    Playlist,
    /// Opening sentinel of a folder.
    StartFolder,
    /// Closing sentinel of a folder.
    EndFolder,
    /// Unknown entry, e.g. a playlist the backend has not described yet.
    Placeholder,
}

impl PlaylistType {
    /// Decode a native playlist type. Unknown values are treated as placeholders.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => PlaylistType::Playlist,
            1 => PlaylistType::StartFolder,
            2 => PlaylistType::EndFolder,
            _ => PlaylistType::Placeholder,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            PlaylistType::Playlist => 0,
            PlaylistType::StartFolder => 1,
            PlaylistType::EndFolder => 2,
            PlaylistType::Placeholder => 3,
        }
    }
}

/// What a toplist browse request ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToplistType {
    Artists,
    Albums,
    Tracks,
}

impl ToplistType {
    pub fn code(&self) -> i32 {
        match self {
            ToplistType::Artists => 0,
            ToplistType::Albums => 1,
            ToplistType::Tracks => 2,
        }
    }
}

/// Connection state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    LoggedOut,
    LoggedIn,
    Disconnected,
    Undefined,
    Offline,
}

impl ConnectionState {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ConnectionState::LoggedOut,
            1 => ConnectionState::LoggedIn,
            2 => ConnectionState::Disconnected,
            4 => ConnectionState::Offline,
            _ => ConnectionState::Undefined,
        }
    }

    /// Whether objects may be loaded in this state.
    pub fn allows_loading(&self) -> bool {
        matches!(self, ConnectionState::LoggedIn | ConnectionState::Offline)
    }
}
