//! # Core Runtime Module
//!
//! Foundational infrastructure shared by the binding crates:
//! - Logging and tracing infrastructure
//! - Session configuration
//! - Runtime error type
//!
//! ## Overview
//!
//! This crate holds the pieces that are not specific to any native object:
//! how a session is configured and validated, and how log events are
//! formatted and mirrored to the host language.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{SessionConfig, SessionConfigBuilder};
pub use error::{Error, Result};
