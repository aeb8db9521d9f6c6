//! Asynchronous toplist requests and their live result sequences.

mod common;

use std::time::Duration;

use bridge_sim::{FailPoint, SimCall};
use bridge_traits::{ErrorType, ToplistType};
use common::{assert_clean_shutdown, playlists, EventLog, Harness};
use core_session::{Loadable, RequestDuration, SessionError, Toplist, ToplistRegion};

const NO_CALLBACK: Option<fn(&Toplist)> = None;

fn toplist_calls(harness: &Harness) -> Vec<SimCall> {
    harness
        .sim
        .take_calls()
        .into_iter()
        .filter(|call| matches!(call, SimCall::ToplistBrowseCreate { .. }))
        .collect()
}

#[test]
fn test_callback_runs_once_after_host_drops_toplist() {
    let harness = Harness::logged_in(playlists(&["a"]));
    harness
        .sim
        .seed_toplist(ToplistType::Tracks, ["t1", "t2"]);
    let log: EventLog<Vec<String>> = EventLog::default();

    let sink = log.clone();
    let toplist = harness
        .session
        .get_toplist(
            ToplistType::Tracks,
            ToplistRegion::Everywhere,
            None,
            Some(move |toplist: &Toplist| {
                assert!(toplist.complete_event().is_set());
                let names = toplist
                    .tracks()
                    .unwrap()
                    .iter()
                    .filter_map(|track| track.name())
                    .collect();
                sink.push(names);
            }),
        )
        .unwrap();
    drop(toplist);

    harness.sim.wait_idle();
    assert_eq!(log.take(), vec![vec!["t1".to_string(), "t2".to_string()]]);
    assert_eq!(harness.session.pending_request_count(), 0);

    let Harness { sim, session } = harness;
    drop(session);
    assert_clean_shutdown(&sim);
}

#[test]
fn test_results_are_empty_until_complete() {
    let harness = Harness::logged_in(playlists(&["a"]));
    harness.sim.seed_toplist(ToplistType::Albums, ["x", "y", "z"]);
    harness.sim.hold_completions();

    let toplist = harness
        .session
        .get_toplist(
            ToplistType::Albums,
            ToplistRegion::country("se").unwrap(),
            None,
            NO_CALLBACK,
        )
        .unwrap();

    assert!(!toplist.is_loaded());
    assert!(!toplist.complete_event().is_set());
    assert_eq!(toplist.error(), ErrorType::IsLoading);
    assert!(toplist.albums().unwrap().is_empty());
    assert_eq!(toplist.backend_request_duration(), None);
    assert_eq!(harness.session.pending_request_count(), 1);
    assert!(matches!(
        toplist.load(Some(Duration::from_millis(100))),
        Err(SessionError::Timeout(_))
    ));

    harness.sim.release_completions();
    harness.sim.wait_idle();

    toplist.load(None).unwrap();
    assert!(toplist.complete_event().is_set());
    assert_eq!(toplist.error(), ErrorType::Ok);
    assert_eq!(
        toplist.backend_request_duration(),
        Some(RequestDuration::Backend(Duration::from_millis(42)))
    );
    let albums = toplist.albums().unwrap();
    assert_eq!(albums.len(), 3);
    assert_eq!(albums.get(1).unwrap().name().as_deref(), Some("y"));
    assert!(toplist.tracks().unwrap().is_empty());
    assert_eq!(harness.session.pending_request_count(), 0);
}

#[test]
fn test_failed_request_reports_error() {
    let harness = Harness::logged_in(playlists(&["a"]));
    harness
        .sim
        .fail_next(FailPoint::ToplistBrowse, ErrorType::OtherTransient);

    let toplist = harness
        .session
        .get_toplist(ToplistType::Artists, ToplistRegion::Everywhere, None, NO_CALLBACK)
        .unwrap();
    toplist.load(None).unwrap();

    assert_eq!(toplist.error(), ErrorType::OtherTransient);
    match toplist.artists() {
        Err(err) => assert_eq!(err.error_type(), Some(ErrorType::OtherTransient)),
        Ok(view) => panic!("expected an error, got {view:?}"),
    }
}

#[test]
fn test_region_and_username_reach_native_call() {
    let harness = Harness::logged_in(playlists(&["a"]));
    harness.sim.take_calls();

    let by_user = harness
        .session
        .get_toplist(ToplistType::Tracks, ToplistRegion::User, Some("bob"), NO_CALLBACK)
        .unwrap();
    assert_eq!(by_user.canonical_username(), Some("bob"));

    let country = ToplistRegion::country("SE").unwrap();
    let by_country = harness
        .session
        .get_toplist(ToplistType::Tracks, country, Some("bob"), NO_CALLBACK)
        .unwrap();
    assert_eq!(by_country.canonical_username(), Some("bob"));
    assert_eq!(by_country.region(), country);

    assert_eq!(
        toplist_calls(&harness),
        vec![
            SimCall::ToplistBrowseCreate {
                toplist_type: ToplistType::Tracks,
                region: ToplistRegion::User.code(),
                username: Some("bob".to_string()),
            },
            SimCall::ToplistBrowseCreate {
                toplist_type: ToplistType::Tracks,
                region: country.code(),
                username: Some("bob".to_string()),
            },
        ]
    );
    assert!(by_user != by_country);
}

#[test]
fn test_cached_result_is_distinct_from_unloaded() {
    let harness = Harness::logged_in(playlists(&["a"]));
    harness.sim.hold_completions();

    let toplist = harness
        .session
        .get_toplist(ToplistType::Tracks, ToplistRegion::Everywhere, None, NO_CALLBACK)
        .unwrap();
    assert_eq!(toplist.backend_request_duration(), None);

    harness.sim.release_completions();
    toplist.load(None).unwrap();
    harness.sim.set_toplist_duration(toplist.raw(), -1);
    assert_eq!(
        toplist.backend_request_duration(),
        Some(RequestDuration::LocalCache)
    );
}

#[test]
fn test_length_is_read_live() {
    let harness = Harness::logged_in(playlists(&["a"]));
    harness.sim.seed_toplist(ToplistType::Tracks, ["t1", "t2"]);

    let toplist = harness
        .session
        .get_toplist(ToplistType::Tracks, ToplistRegion::Everywhere, None, NO_CALLBACK)
        .unwrap();
    toplist.load(None).unwrap();
    let tracks = toplist.tracks().unwrap();
    assert_eq!(tracks.len(), 2);

    harness.sim.push_toplist_track(toplist.raw(), "t3");
    assert_eq!(tracks.len(), 3);
    assert_eq!(tracks.get(2).unwrap().name().as_deref(), Some("t3"));
    assert!(matches!(
        tracks.get(3),
        Err(SessionError::IndexOutOfRange { index: 3, len: 3 })
    ));

    // the same track is the same wrapper however it is reached
    let first = tracks.get(0).unwrap();
    assert!(first.same_instance(&tracks.to_vec()[0]));
}

#[test]
fn test_abandoned_request_never_calls_back() {
    let harness = Harness::logged_in(playlists(&["a"]));
    harness.sim.hold_completions();
    let log: EventLog<()> = EventLog::default();

    let sink = log.clone();
    let toplist = harness
        .session
        .get_toplist(
            ToplistType::Tracks,
            ToplistRegion::Everywhere,
            None,
            Some(move |_: &Toplist| sink.push(())),
        )
        .unwrap();
    drop(toplist);

    let Harness { sim, session } = harness;
    assert_eq!(session.pending_request_count(), 1);
    drop(session);

    sim.release_completions();
    sim.wait_idle();
    assert_eq!(log.len(), 0);
    assert_clean_shutdown(&sim);
}
