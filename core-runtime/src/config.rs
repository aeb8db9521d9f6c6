//! # Session Configuration
//!
//! Settings for a binding session.
//!
//! ## Overview
//!
//! A [`SessionConfig`] is built with [`SessionConfigBuilder`] and validated
//! up front, so a bad configuration fails before any native call is made.
//! The parts the native SDK consumes are projected into a
//! [`NativeSessionConfig`] by [`SessionConfig::native`]; the rest governs the
//! binding itself (blocking load timeout, playlist name bound, unseen track
//! batching).
//!
//! ## Required Settings
//!
//! - `application_key` - the key issued for the application
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::SessionConfig;
//! use std::time::Duration;
//!
//! let config = SessionConfig::builder()
//!     .application_key(std::fs::read("spotify_appkey.key")?)
//!     .user_agent("my-player")
//!     .cache_location("/tmp/sp-cache")
//!     .load_timeout(Duration::from_secs(5))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! A missing application key is reported as [`Error::CapabilityMissing`];
//! out-of-range values are reported as [`Error::Config`].

use crate::error::{Error, Result};
use bridge_traits::NativeSessionConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Default user agent reported to the backend.
pub const DEFAULT_USER_AGENT: &str = "sp-bindings";

/// Default timeout for blocking `load` calls.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest accepted `load` timeout.
pub const MAX_LOAD_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Default upper bound on playlist and folder names, in characters.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 255;

/// Hard upper bound for [`SessionConfig::max_name_length`].
pub const MAX_NAME_LENGTH_LIMIT: usize = 4096;

/// Default number of unseen tracks fetched per native call.
pub const DEFAULT_UNSEEN_TRACKS_BATCH_SIZE: usize = 100;

/// Configuration for a binding session.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Application key handed to the native SDK
    pub application_key: Vec<u8>,

    /// User agent reported to the backend
    pub user_agent: String,

    /// Directory for the native cache
    pub cache_location: Option<PathBuf>,

    /// Directory for the native settings files
    pub settings_location: Option<PathBuf>,

    /// Timeout used by `load` when none is given
    pub load_timeout: Duration,

    /// Upper bound on playlist and folder names, in characters
    pub max_name_length: usize,

    /// Unseen tracks fetched per native call
    pub unseen_tracks_batch_size: usize,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field(
                "application_key",
                &format_args!("[{} bytes]", self.application_key.len()),
            )
            .field("user_agent", &self.user_agent)
            .field("cache_location", &self.cache_location)
            .field("settings_location", &self.settings_location)
            .field("load_timeout", &self.load_timeout)
            .field("max_name_length", &self.max_name_length)
            .field("unseen_tracks_batch_size", &self.unseen_tracks_batch_size)
            .finish()
    }
}

impl SessionConfig {
    /// Creates a new builder for constructing a `SessionConfig`.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The application key is not empty
    /// - The user agent is not blank
    /// - The load timeout is positive and at most one hour
    /// - The name bound is within `1..=4096`
    /// - The unseen track batch size is positive
    pub fn validate(&self) -> Result<()> {
        if self.application_key.is_empty() {
            return Err(Error::Config("Application key cannot be empty".to_string()));
        }

        if self.user_agent.trim().is_empty() {
            return Err(Error::Config("User agent cannot be empty".to_string()));
        }

        if self.load_timeout.is_zero() {
            return Err(Error::Config(
                "Load timeout must be greater than zero".to_string(),
            ));
        }

        if self.load_timeout > MAX_LOAD_TIMEOUT {
            return Err(Error::Config(
                "Load timeout exceeds maximum of 1 hour".to_string(),
            ));
        }

        if self.max_name_length == 0 || self.max_name_length > MAX_NAME_LENGTH_LIMIT {
            return Err(Error::Config(format!(
                "Maximum name length must be between 1 and {}",
                MAX_NAME_LENGTH_LIMIT
            )));
        }

        if self.unseen_tracks_batch_size == 0 {
            return Err(Error::Config(
                "Unseen tracks batch size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// The subset of settings passed to the native session constructor.
    pub fn native(&self) -> NativeSessionConfig {
        NativeSessionConfig {
            application_key: self.application_key.clone(),
            user_agent: self.user_agent.clone(),
            cache_location: self.cache_location.clone(),
            settings_location: self.settings_location.clone(),
        }
    }
}

/// Builder for constructing [`SessionConfig`] instances.
#[derive(Default)]
pub struct SessionConfigBuilder {
    application_key: Option<Vec<u8>>,
    user_agent: Option<String>,
    cache_location: Option<PathBuf>,
    settings_location: Option<PathBuf>,
    load_timeout: Option<Duration>,
    max_name_length: Option<usize>,
    unseen_tracks_batch_size: Option<usize>,
}

impl SessionConfigBuilder {
    /// Sets the application key (required).
    pub fn application_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.application_key = Some(key.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn cache_location<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cache_location = Some(path.into());
        self
    }

    pub fn settings_location<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_location = Some(path.into());
        self
    }

    /// Sets the default timeout for blocking loads.
    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    pub fn max_name_length(mut self, length: usize) -> Self {
        self.max_name_length = Some(length);
        self
    }

    pub fn unseen_tracks_batch_size(mut self, size: usize) -> Self {
        self.unseen_tracks_batch_size = Some(size);
        self
    }

    /// Builds the final `SessionConfig` instance.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] if no application key was provided
    /// - [`Error::Config`] if any value fails [`SessionConfig::validate`]
    pub fn build(self) -> Result<SessionConfig> {
        let application_key = self.application_key.ok_or_else(|| Error::CapabilityMissing {
            capability: "ApplicationKey".to_string(),
            message: "An application key is required to create a session. \
                      Use .application_key() with the key issued for your application."
                .to_string(),
        })?;

        let config = SessionConfig {
            application_key,
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            cache_location: self.cache_location,
            settings_location: self.settings_location,
            load_timeout: self.load_timeout.unwrap_or(DEFAULT_LOAD_TIMEOUT),
            max_name_length: self.max_name_length.unwrap_or(DEFAULT_MAX_NAME_LENGTH),
            unseen_tracks_batch_size: self
                .unseen_tracks_batch_size
                .unwrap_or(DEFAULT_UNSEEN_TRACKS_BATCH_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> SessionConfigBuilder {
        SessionConfig::builder().application_key(vec![0x01, 0x02])
    }

    #[test]
    fn test_builder_defaults() {
        let config = builder().build().unwrap();

        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.load_timeout, DEFAULT_LOAD_TIMEOUT);
        assert_eq!(config.max_name_length, 255);
        assert_eq!(config.unseen_tracks_batch_size, 100);
        assert!(config.cache_location.is_none());
        assert!(config.settings_location.is_none());
    }

    #[test]
    fn test_builder_requires_application_key() {
        let result = SessionConfig::builder().build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "ApplicationKey");
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_empty_key() {
        let result = SessionConfig::builder()
            .application_key(Vec::new())
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_blank_user_agent() {
        let result = builder().user_agent("   ").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_load_timeout_bounds() {
        assert!(builder().load_timeout(Duration::ZERO).build().is_err());
        assert!(builder()
            .load_timeout(MAX_LOAD_TIMEOUT + Duration::from_secs(1))
            .build()
            .is_err());
        assert!(builder().load_timeout(MAX_LOAD_TIMEOUT).build().is_ok());
    }

    #[test]
    fn test_validate_name_length_bounds() {
        assert!(builder().max_name_length(0).build().is_err());
        assert!(builder().max_name_length(4097).build().is_err());
        assert_eq!(
            builder().max_name_length(4096).build().unwrap().max_name_length,
            4096
        );
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        assert!(builder().unseen_tracks_batch_size(0).build().is_err());
    }

    #[test]
    fn test_native_projection() {
        let config = builder()
            .user_agent("tests")
            .cache_location("/tmp/cache")
            .settings_location("/tmp/settings")
            .build()
            .unwrap();

        let native = config.native();
        assert_eq!(native.application_key, vec![0x01, 0x02]);
        assert_eq!(native.user_agent, "tests");
        assert_eq!(native.cache_location, Some(PathBuf::from("/tmp/cache")));
        assert_eq!(
            native.settings_location,
            Some(PathBuf::from("/tmp/settings"))
        );
    }

    #[test]
    fn test_debug_hides_application_key() {
        let config = builder().build().unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("[2 bytes]"));
        assert!(!rendered.contains("[1, 2]"));
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = builder().build().unwrap();
        assert_eq!(config.clone(), config);
    }
}
