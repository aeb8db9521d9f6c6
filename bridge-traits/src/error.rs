use thiserror::Error;

/// Result codes reported by the native SDK.
///
/// The display text of each variant is the SDK's human readable description
/// of the code; bindings surface it verbatim in their own errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    #[error("No error")]
    Ok,
    #[error("Invalid library version")]
    BadApiVersion,
    #[error("Initialization failed")]
    ApiInitializationFailed,
    #[error("The track cannot be played")]
    TrackNotPlayable,
    #[error("Invalid application key")]
    BadApplicationKey,
    #[error("Incorrect username or password")]
    BadUsernameOrPassword,
    #[error("Your account has been banned")]
    UserBanned,
    #[error("Cannot connect to the backend system")]
    UnableToContactServer,
    #[error("Client is too old")]
    ClientTooOld,
    #[error("Unknown error from the backend")]
    OtherPermanent,
    #[error("Invalid user agent")]
    BadUserAgent,
    #[error("No valid callback registered to handle events")]
    MissingCallback,
    #[error("Invalid input data")]
    InvalidIndata,
    #[error("Index out of range")]
    IndexOutOfRange,
    #[error("A premium account is required")]
    UserNeedsPremium,
    #[error("A transient error occurred")]
    OtherTransient,
    #[error("The resource is currently loading")]
    IsLoading,
    #[error("Could not find any suitable stream to play")]
    NoStreamAvailable,
    #[error("Permission denied")]
    PermissionDenied,
    #[error("Target inbox is full")]
    InboxIsFull,
    #[error("Cache is not enabled")]
    NoCache,
    #[error("No such user")]
    NoSuchUser,
    #[error("No credentials are stored")]
    NoCredentials,
    #[error("Network disabled")]
    NetworkDisabled,
    #[error("Invalid device ID")]
    InvalidDeviceId,
    #[error("Cannot open trace file")]
    CantOpenTraceFile,
    #[error("This application is no longer allowed to use the service")]
    ApplicationBanned,
    #[error("Reached the device limit for number of tracks to download")]
    OfflineTooManyTracks,
    #[error("Disk cache error")]
    OfflineDiskCache,
    #[error("Offline key has expired, the user needs to go online again")]
    OfflineExpired,
    #[error("This user is not allowed to use offline mode")]
    OfflineNotAllowed,
    #[error("The license for this device has been lost")]
    OfflineLicenseLost,
    #[error("Offline license error")]
    OfflineLicenseError,
    #[error("Scrobbling authentication failed")]
    LastfmAuthError,
    #[error("Invalid argument")]
    InvalidArgument,
    #[error("System failure")]
    SystemFailure,
    #[error("Unknown error code {0}")]
    Unknown(i32),
}

/// `(variant, native code)` pairs for every known result code.
const CODES: &[(ErrorType, i32)] = &[
    (ErrorType::Ok, 0),
    (ErrorType::BadApiVersion, 1),
    (ErrorType::ApiInitializationFailed, 2),
    (ErrorType::TrackNotPlayable, 3),
    (ErrorType::BadApplicationKey, 5),
    (ErrorType::BadUsernameOrPassword, 6),
    (ErrorType::UserBanned, 7),
    (ErrorType::UnableToContactServer, 8),
    (ErrorType::ClientTooOld, 9),
    (ErrorType::OtherPermanent, 10),
    (ErrorType::BadUserAgent, 11),
    (ErrorType::MissingCallback, 12),
    (ErrorType::InvalidIndata, 13),
    (ErrorType::IndexOutOfRange, 14),
    (ErrorType::UserNeedsPremium, 15),
    (ErrorType::OtherTransient, 16),
    (ErrorType::IsLoading, 17),
    (ErrorType::NoStreamAvailable, 18),
    (ErrorType::PermissionDenied, 19),
    (ErrorType::InboxIsFull, 20),
    (ErrorType::NoCache, 21),
    (ErrorType::NoSuchUser, 22),
    (ErrorType::NoCredentials, 23),
    (ErrorType::NetworkDisabled, 24),
    (ErrorType::InvalidDeviceId, 25),
    (ErrorType::CantOpenTraceFile, 26),
    (ErrorType::ApplicationBanned, 27),
    (ErrorType::OfflineTooManyTracks, 31),
    (ErrorType::OfflineDiskCache, 32),
    (ErrorType::OfflineExpired, 33),
    (ErrorType::OfflineNotAllowed, 34),
    (ErrorType::OfflineLicenseLost, 35),
    (ErrorType::OfflineLicenseError, 36),
    (ErrorType::LastfmAuthError, 39),
    (ErrorType::InvalidArgument, 40),
    (ErrorType::SystemFailure, 41),
];

impl ErrorType {
    /// Decode a native result code. Unrecognised codes are preserved in
    /// [`ErrorType::Unknown`].
    pub fn from_code(code: i32) -> Self {
        CODES
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(error, _)| *error)
            .unwrap_or(ErrorType::Unknown(code))
    }

    /// The native integer code for this result.
    pub fn code(&self) -> i32 {
        match self {
            ErrorType::Unknown(code) => *code,
            known => CODES
                .iter()
                .find(|(error, _)| error == known)
                .map(|(_, code)| *code)
                .unwrap_or(-1),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ErrorType::Ok)
    }

    /// Human readable description, as the native `error_message` call returns it.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Result of a native call that either yields a value or a non-OK code.
pub type NativeResult<T> = std::result::Result<T, ErrorType>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_decode() {
        assert_eq!(ErrorType::from_code(0), ErrorType::Ok);
        assert_eq!(ErrorType::from_code(14), ErrorType::IndexOutOfRange);
        assert_eq!(ErrorType::from_code(17), ErrorType::IsLoading);
        assert_eq!(ErrorType::from_code(41), ErrorType::SystemFailure);
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let error = ErrorType::from_code(4);
        assert_eq!(error, ErrorType::Unknown(4));
        assert_eq!(error.code(), 4);
        assert_eq!(error.message(), "Unknown error code 4");
    }

    #[test]
    fn test_code_matches_table() {
        for (error, code) in CODES {
            assert_eq!(error.code(), *code);
            assert_eq!(ErrorType::from_code(*code), *error);
        }
    }

    #[test]
    fn test_message() {
        assert!(ErrorType::Ok.is_ok());
        assert!(!ErrorType::IndexOutOfRange.is_ok());
        assert_eq!(ErrorType::IndexOutOfRange.message(), "Index out of range");
    }
}
