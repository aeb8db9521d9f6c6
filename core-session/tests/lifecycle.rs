//! Wrapper identity, reference balance, loading and session construction.

mod common;

use std::thread;
use std::time::{Duration, Instant};

use bridge_sim::SimSdk;
use bridge_traits::ErrorType;
use common::{assert_clean_shutdown, config, playlists, session, Harness};
use core_session::{Loadable, Session, SessionError};

#[test]
fn test_wrappers_are_identity_stable() {
    let harness = Harness::logged_in(playlists(&["a", "b"]));
    let container = harness.container();

    assert!(container.same_instance(&harness.container()));

    let first = container.get(1).unwrap().as_playlist().unwrap().clone();
    let again = container.get(1).unwrap().as_playlist().unwrap().clone();
    assert!(first.same_instance(&again));

    let by_uri = harness
        .session
        .get_playlist(&first.link().unwrap().uri())
        .unwrap();
    assert!(by_uri.same_instance(&first));

    let owner = container.owner().unwrap();
    assert!(owner.same_instance(&harness.session.user().unwrap()));
}

#[test]
fn test_each_wrapper_holds_one_reference() {
    let harness = Harness::logged_in(playlists(&["a"]));
    let container = harness.container();
    let playlist = container.get(0).unwrap().as_playlist().unwrap().clone();
    let copies: Vec<_> = (0..5).map(|_| playlist.clone()).collect();

    assert_eq!(harness.sim.ledger(playlist.raw()).count, 1);
    assert_eq!(harness.sim.ledger(container.raw()).count, 1);

    drop(copies);
    assert_eq!(harness.sim.ledger(playlist.raw()).count, 1);
    drop(playlist);
    drop(container);

    let outstanding = harness.sim.outstanding_references();
    assert_eq!(outstanding, vec![(harness.session.raw(), 1)]);
    assert_eq!(harness.session.cached_object_count(), 0);
}

#[test]
fn test_dropped_wrapper_is_rebuilt() {
    let harness = Harness::logged_in(playlists(&["a"]));
    let raw = {
        let playlist = harness.container().get(0).unwrap().as_playlist().unwrap().clone();
        playlist.raw()
    };
    let ledger = harness.sim.ledger(raw);
    assert_eq!((ledger.count, ledger.add_refs, ledger.releases), (0, 1, 1));

    let playlist = harness.container().get(0).unwrap().as_playlist().unwrap().clone();
    assert_eq!(playlist.raw(), raw);
    assert_eq!(harness.sim.ledger(raw).count, 1);
}

#[test]
fn test_objects_outlive_the_session() {
    let harness = Harness::logged_in(playlists(&["a"]));
    let playlist = harness.container().get(0).unwrap().as_playlist().unwrap().clone();

    let Harness { sim, session } = harness;
    drop(session);

    assert!(sim.session_handle().is_some());
    assert_eq!(playlist.name().as_deref(), Some("a"));

    drop(playlist);
    assert!(sim.session_handle().is_none());
    assert_clean_shutdown(&sim);
}

#[test]
fn test_load_returns_at_once_when_loaded() {
    let harness = Harness::logged_in(playlists(&["a"]));
    let container = harness.container();

    let started = Instant::now();
    container.load(None).unwrap();
    container.get(0).unwrap().as_playlist().unwrap().load(None).unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_load_waits_for_the_object() {
    let harness = Harness::logged_in(playlists(&["a"]));
    let playlist = harness.container().get(0).unwrap().as_playlist().unwrap().clone();
    harness.sim.set_playlist_loaded(playlist.raw(), false);
    assert!(!playlist.is_loaded());
    assert_eq!(playlist.name(), None);

    let sim = harness.sim.clone();
    let raw = playlist.raw();
    let loader = thread::spawn(move || {
        thread::sleep(Duration::from_millis(120));
        sim.set_playlist_loaded(raw, true);
    });

    playlist.load(Some(Duration::from_secs(5))).unwrap();
    assert_eq!(playlist.name().as_deref(), Some("a"));
    loader.join().unwrap();
}

#[test]
fn test_load_times_out() {
    let harness = Harness::logged_in(playlists(&["a"]));
    let container = harness.container();
    harness.sim.set_container_loaded(false);

    let started = Instant::now();
    match container.load(Some(Duration::from_millis(150))) {
        Err(SessionError::Timeout(timeout)) => assert_eq!(timeout, Duration::from_millis(150)),
        other => panic!("expected a timeout, got {other:?}"),
    }
    assert!(started.elapsed() >= Duration::from_millis(150));
}

#[test]
fn test_load_requires_a_connection() {
    let harness = Harness::logged_in(playlists(&["a"]));
    let playlist = harness.container().get(0).unwrap().as_playlist().unwrap().clone();

    harness.session.logout().unwrap();
    harness.sim.wait_idle();

    // loaded objects still report success
    playlist.load(None).unwrap();

    harness.sim.set_playlist_loaded(playlist.raw(), false);
    assert!(matches!(
        playlist.load(Some(Duration::from_secs(5))),
        Err(SessionError::NotLoggedIn)
    ));
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let sim = SimSdk::new();
    let mut bad = config();
    bad.application_key.clear();

    match Session::new(sim.clone(), bad) {
        Err(SessionError::Runtime(err)) => {
            assert!(err.to_string().contains("Application key"));
        }
        other => panic!("expected a configuration error, got {other:?}"),
    }
    assert!(sim.session_handle().is_none());
}

#[test]
fn test_one_native_session_at_a_time() {
    let sim = SimSdk::new();
    let first = session(&sim);

    let err = Session::new(sim.clone(), config()).unwrap_err();
    assert_eq!(err.error_type(), Some(ErrorType::ApiInitializationFailed));

    drop(first);
    let second = session(&sim);
    drop(second);
    assert_clean_shutdown(&sim);
}

#[test]
fn test_links() {
    let harness = Harness::logged_in(playlists(&["a"]));

    let link = harness.session.get_link("spotify:track:abc").unwrap();
    assert_eq!(link.uri(), "spotify:track:abc");
    assert_eq!(link.to_string(), "spotify:track:abc");
    assert!(link.as_playlist().is_none());

    assert!(matches!(
        harness.session.get_link("not a uri"),
        Err(SessionError::InvalidValue(_))
    ));
    assert!(matches!(
        harness.session.get_playlist("spotify:track:abc"),
        Err(SessionError::InvalidValue(_))
    ));
}

#[test]
fn test_concurrent_use_is_serialized() {
    let harness = Harness::logged_in(playlists(&["a", "b", "c"]));

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let container = harness.container();
                for _ in 0..50 {
                    let entries = container.entries().unwrap();
                    assert!(entries.len() >= 3);
                    for entry in &entries {
                        if let Some(playlist) = entry.as_playlist() {
                            playlist.name();
                        }
                    }
                }
            });
        }
        scope.spawn(|| {
            let container = harness.container();
            for n in 0..20 {
                container.add_new_playlist(&format!("p{n}"), Some(0)).unwrap();
            }
        });
    });

    assert_eq!(harness.container().len(), 23);
    assert!(harness.sim.violations().is_empty());

    let Harness { sim, session } = harness;
    drop(session);
    assert_clean_shutdown(&sim);
}
