//! Bindings over the native streaming SDK.
//!
//! This crate gathers the workspace crates behind one dependency:
//!
//! - [`native`]: the traits the native SDK is reached through
//! - [`runtime`]: configuration and logging
//! - the session API from `core-session`, re-exported at the root
//!
//! With the `sim` feature, [`sim`] provides an in-process SDK for tests and
//! demos.

pub use bridge_traits as native;
pub use core_runtime as runtime;
pub use core_session::*;

#[cfg(feature = "sim")]
pub use bridge_sim as sim;

pub use bridge_traits::{ConnectionState, ErrorType, ToplistType};
pub use core_runtime::logging::{init_logging, LoggingConfig};
pub use core_runtime::SessionConfig;
