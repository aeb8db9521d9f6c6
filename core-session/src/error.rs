use std::time::Duration;

use bridge_traits::ErrorType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Index out of range: {index} (length {len})")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("Invalid index type: {0}")]
    InvalidIndexType(String),

    #[error("Invalid type: {0}")]
    InvalidType(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A native call returned a non-OK status.
    #[error("{0}")]
    Native(ErrorType),

    /// A native operation failed without reporting a status code.
    #[error("{0}")]
    Operation(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Session must be logged in and online to load objects")]
    NotLoggedIn,

    #[error(transparent)]
    Runtime(#[from] core_runtime::Error),
}

impl SessionError {
    /// Turn a native status into `Ok(())` or a [`SessionError::Native`].
    pub fn maybe_raise(code: ErrorType) -> Result<()> {
        Self::maybe_raise_ignoring(code, &[])
    }

    /// Like [`maybe_raise`](Self::maybe_raise), but treats the listed codes as success.
    pub fn maybe_raise_ignoring(code: ErrorType, ignore: &[ErrorType]) -> Result<()> {
        if code.is_ok() || ignore.contains(&code) {
            Ok(())
        } else {
            Err(SessionError::Native(code))
        }
    }

    /// The native status behind this error, if there is one.
    pub fn error_type(&self) -> Option<ErrorType> {
        match self {
            SessionError::Native(code) => Some(*code),
            _ => None,
        }
    }

    pub(crate) fn out_of_range(index: impl TryInto<i64>, len: usize) -> Self {
        SessionError::IndexOutOfRange {
            index: index.try_into().unwrap_or(i64::MAX),
            len,
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
