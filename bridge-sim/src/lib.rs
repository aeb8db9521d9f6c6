//! # Simulated Native SDK
//!
//! An in-process implementation of every `bridge-traits` capability.
//!
//! ## Overview
//!
//! The simulator stands in for the native streaming library during
//! development and in tests. It behaves like the real thing where the binding
//! can observe it:
//! - handles are opaque identities with per-handle reference counts
//! - playlist containers are flat arrays with folder sentinel pairs
//! - asynchronous requests complete later, on a worker thread
//! - events are only delivered for objects with registered callbacks
//!
//! On top of that it records what the binding did: a log of state changing
//! calls ([`SimCall`]), a reference ledger per handle ([`RefLedger`]) and a
//! list of protocol violations (double release, duplicate registration,
//! overlapping native calls).
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_sim::{SimEntry, SimSdk};
//!
//! let sim = SimSdk::new();
//! sim.seed_container(vec![
//!     SimEntry::start_folder(173, "Road trip"),
//!     SimEntry::playlist("Morning"),
//!     SimEntry::end_folder(173),
//! ]);
//! // hand `sim.clone()` to the session as its `Arc<dyn NativeSdk>`
//! ```

mod sdk;
mod state;
mod worker;

pub use sdk::{SimSdk, BACKEND_REQUEST_DURATION_MS, MAX_PLAYLIST_NAME};
pub use state::{FailPoint, RefLedger, SimCall, SimEntry};
