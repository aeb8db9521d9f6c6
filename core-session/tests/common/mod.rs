#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use bridge_sim::{SimEntry, SimSdk};
use core_runtime::SessionConfig;
use core_session::{PlaylistContainer, Session};
use parking_lot::Mutex;

pub fn config() -> SessionConfig {
    SessionConfig::builder()
        .application_key(vec![0x01, 0x02, 0x03])
        .user_agent("core-session-tests")
        .load_timeout(Duration::from_secs(5))
        .unseen_tracks_batch_size(2)
        .build()
        .unwrap()
}

pub fn session(sim: &Arc<SimSdk>) -> Session {
    Session::new(sim.clone(), config()).unwrap()
}

pub struct Harness {
    pub sim: Arc<SimSdk>,
    pub session: Session,
}

impl Harness {
    /// A session logged in as `alice` whose container holds `layout`.
    pub fn logged_in(layout: Vec<SimEntry>) -> Self {
        let sim = SimSdk::new();
        sim.seed_container(layout);
        let session = session(&sim);
        session.login("alice", "secret", false).unwrap();
        sim.wait_idle();
        Self { sim, session }
    }

    pub fn container(&self) -> PlaylistContainer {
        self.session.playlist_container().expect("logged in")
    }

    /// Playlist names and folder markers, as the simulator sees them.
    pub fn layout(&self) -> Vec<SimEntry> {
        self.sim.layout()
    }
}

pub fn playlists(names: &[&str]) -> Vec<SimEntry> {
    names.iter().map(|name| SimEntry::playlist(*name)).collect()
}

/// Drop everything and check the binding gave back every reference.
pub fn assert_clean_shutdown(sim: &Arc<SimSdk>) {
    sim.wait_idle();
    assert_eq!(sim.outstanding_references(), Vec::new());
    assert_eq!(sim.violations(), Vec::<String>::new());
}

/// Shared log for listeners.
pub struct EventLog<T>(Arc<Mutex<Vec<T>>>);

impl<T> Clone for EventLog<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Default for EventLog<T> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }
}

impl<T> EventLog<T> {
    pub fn push(&self, value: T) {
        self.0.lock().push(value);
    }

    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }
}
