//! Loosely typed subscripts as a scripting host issues them.

mod common;

use common::{playlists, Harness};
use core_session::host::{self, HostItem, HostKey, HostValue};
use core_session::{SessionError, SliceBounds};

fn names(harness: &Harness) -> Vec<String> {
    harness
        .container()
        .entries()
        .unwrap()
        .iter()
        .filter_map(|entry| entry.as_playlist().and_then(|playlist| playlist.name()))
        .collect()
}

#[test]
fn test_index_and_slice_reads() {
    let harness = Harness::logged_in(playlists(&["a", "b", "c"]));
    let container = harness.container();

    match host::get_item(&container, &HostKey::Index(1)).unwrap() {
        HostItem::Entry(entry) => {
            assert_eq!(entry.as_playlist().unwrap().name().as_deref(), Some("b"));
        }
        other => panic!("expected a single entry, got {other:?}"),
    }
    match host::get_item(&container, &HostKey::Slice(SliceBounds::new(None, Some(-1)))).unwrap() {
        HostItem::Entries(entries) => assert_eq!(entries.len(), 2),
        other => panic!("expected entries, got {other:?}"),
    }
}

#[test]
fn test_negative_index_is_out_of_range() {
    let harness = Harness::logged_in(playlists(&["a", "b"]));
    let container = harness.container();

    match host::get_item(&container, &HostKey::Index(-1)) {
        Err(SessionError::IndexOutOfRange { index, len }) => assert_eq!((index, len), (-1, 2)),
        other => panic!("expected index error, got {other:?}"),
    }
    assert!(matches!(
        host::del_item(&container, &HostKey::Index(-2)),
        Err(SessionError::IndexOutOfRange { .. })
    ));
}

#[test]
fn test_unsupported_key_type() {
    let harness = Harness::logged_in(playlists(&["a"]));
    let container = harness.container();
    let key = HostKey::Other("str".to_string());

    let err = host::get_item(&container, &key).unwrap_err();
    assert!(matches!(err, SessionError::InvalidIndexType(_)));
    assert_eq!(
        err.to_string(),
        "Invalid index type: indices must be integers or slices, not str"
    );
    assert!(host::set_item(&container, &key, HostValue::Str("x".into())).is_err());
    assert!(host::del_item(&container, &key).is_err());
}

#[test]
fn test_bad_values_change_nothing() {
    let harness = Harness::logged_in(playlists(&["a", "b"]));
    let container = harness.container();
    harness.sim.take_calls();

    assert!(matches!(
        host::set_item(&container, &HostKey::Index(0), HostValue::Bool(true)),
        Err(SessionError::InvalidValue(_))
    ));
    assert!(matches!(
        host::set_item(
            &container,
            &HostKey::Slice(SliceBounds::from(0..1)),
            HostValue::Str("x".into())
        ),
        Err(SessionError::InvalidType(_))
    ));
    // the second element is checked before the first is written
    assert!(host::set_item(
        &container,
        &HostKey::Slice(SliceBounds::from(0..1)),
        HostValue::List(vec![HostValue::Str("x".into()), HostValue::Int(3)])
    )
    .is_err());

    assert!(harness.sim.take_calls().is_empty());
    assert_eq!(names(&harness), vec!["a", "b"]);
}

#[test]
fn test_writes_through_subscripts() {
    let harness = Harness::logged_in(playlists(&["a", "b", "c"]));
    let container = harness.container();

    host::set_item(&container, &HostKey::Index(0), HostValue::Str("x".into())).unwrap();
    assert_eq!(names(&harness), vec!["x", "b", "c"]);

    host::set_item(
        &container,
        &HostKey::Slice(SliceBounds::new(Some(1), None)),
        HostValue::List(vec![HostValue::Str("y".into())]),
    )
    .unwrap();
    assert_eq!(names(&harness), vec!["x", "y"]);

    host::del_item(&container, &HostKey::Slice(SliceBounds::new(Some(-1), None))).unwrap();
    assert_eq!(names(&harness), vec!["x"]);
}

#[test]
fn test_insert_follows_slice_positions() {
    let harness = Harness::logged_in(playlists(&["a", "b", "c"]));
    let container = harness.container();

    host::insert(&container, -1, HostValue::Str("z".into())).unwrap();
    assert_eq!(names(&harness), vec!["a", "b", "z", "c"]);

    host::insert(&container, 100, HostValue::Str("end".into())).unwrap();
    host::insert(&container, -100, HostValue::Str("start".into())).unwrap();
    assert_eq!(names(&harness), vec!["start", "a", "b", "z", "c", "end"]);
}

#[test]
fn test_add_playlist_argument_type() {
    let harness = Harness::logged_in(playlists(&["a"]));
    let container = harness.container();

    match host::add_playlist(&container, &HostValue::Str("a".into()), None) {
        Err(SessionError::InvalidType(message)) => {
            assert_eq!(message, "Argument must be Link or Playlist, got str");
        }
        other => panic!("expected a type error, got {other:?}"),
    }

    let link = harness
        .session
        .get_link("spotify:user:bob:playlist:000777")
        .unwrap();
    let added = host::add_playlist(&container, &HostValue::Link(link), Some(0)).unwrap();
    assert!(added.is_some());
    assert_eq!(container.len(), 2);
}
