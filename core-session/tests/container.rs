//! Sequence semantics of the playlist container over the simulated SDK.

mod common;

use bridge_sim::{FailPoint, SimCall, SimEntry};
use bridge_traits::ErrorType;
use common::{assert_clean_shutdown, playlists, Harness};
use core_session::{
    ContainerEntry, FolderNode, NewEntry, PlaylistFolder, PlaylistSource, SessionError,
    SliceBounds,
};

fn names(harness: &Harness) -> Vec<String> {
    harness
        .layout()
        .into_iter()
        .map(|entry| match entry {
            SimEntry::Playlist(name) => name,
            SimEntry::StartFolder { id, name } => format!("[{id}:{name}"),
            SimEntry::EndFolder { id } => format!("{id}]"),
            SimEntry::Placeholder => "?".to_string(),
        })
        .collect()
}

fn playlist_name(entry: &ContainerEntry) -> String {
    entry
        .as_playlist()
        .and_then(|playlist| playlist.name())
        .unwrap_or_default()
}

fn folder_layout() -> Vec<SimEntry> {
    vec![
        SimEntry::playlist("a"),
        SimEntry::start_folder(5, "Outer"),
        SimEntry::playlist("b"),
        SimEntry::start_folder(6, "Inner"),
        SimEntry::playlist("c"),
        SimEntry::end_folder(6),
        SimEntry::end_folder(5),
        SimEntry::playlist("d"),
    ]
}

#[test]
fn test_entries_are_classified() {
    let harness = Harness::logged_in(vec![
        SimEntry::playlist("a"),
        SimEntry::start_folder(5, "Folder"),
        SimEntry::playlist("b"),
        SimEntry::end_folder(5),
        SimEntry::Placeholder,
    ]);
    let container = harness.container();

    assert_eq!(container.len(), 5);
    assert_eq!(playlist_name(&container.get(0).unwrap()), "a");
    assert_eq!(
        container.get(1).unwrap(),
        ContainerEntry::Folder(PlaylistFolder::start(5, "Folder"))
    );
    assert_eq!(
        container.get(3).unwrap(),
        ContainerEntry::Folder(PlaylistFolder::end(5))
    );

    match container.get(4) {
        Err(SessionError::Operation(message)) => {
            assert!(message.contains("Unknown playlist type"));
        }
        other => panic!("expected an unknown type error, got {other:?}"),
    }
    assert!(container.entries().is_err());

    match container.get(5) {
        Err(SessionError::IndexOutOfRange { index, len }) => {
            assert_eq!((index, len), (5, 5));
        }
        other => panic!("expected index error, got {other:?}"),
    }
}

#[test]
fn test_placeholder_can_still_be_removed() {
    let harness = Harness::logged_in(vec![
        SimEntry::playlist("a"),
        SimEntry::Placeholder,
        SimEntry::start_folder(5, "Folder"),
        SimEntry::end_folder(5),
    ]);
    let container = harness.container();

    assert_eq!(container.find_folder_indexes(5, false).unwrap(), vec![2, 3]);
    container.remove_playlist(1, false).unwrap();
    assert_eq!(names(&harness), vec!["a", "[5:Folder", "5]"]);
}

#[test]
fn test_undefined_length_reads_as_empty() {
    let harness = Harness::logged_in(playlists(&["a", "b"]));
    let container = harness.container();

    harness.sim.set_container_loaded(false);
    assert_eq!(container.len(), 0);
    assert!(container.is_empty());
    assert!(matches!(
        container.get(0),
        Err(SessionError::IndexOutOfRange { .. })
    ));
    assert_eq!(container.entries().unwrap(), Vec::new());

    harness.sim.set_container_loaded(true);
    assert_eq!(container.len(), 2);
}

#[test]
fn test_slice_reads() {
    let harness = Harness::logged_in(playlists(&["a", "b", "c", "d"]));
    let container = harness.container();

    let middle: Vec<_> = container
        .slice(SliceBounds::new(Some(1), Some(3)))
        .unwrap()
        .iter()
        .map(playlist_name)
        .collect();
    assert_eq!(middle, vec!["b", "c"]);

    let tail: Vec<_> = container
        .slice(SliceBounds::new(Some(-1), None))
        .unwrap()
        .iter()
        .map(playlist_name)
        .collect();
    assert_eq!(tail, vec!["d"]);

    assert!(container
        .slice(SliceBounds::new(Some(3), Some(1)))
        .unwrap()
        .is_empty());
}

#[test]
fn test_slice_read_materializes_every_entry() {
    let harness = Harness::logged_in(playlists(&["a", "b", "c"]));
    let container = harness.container();
    let last = container.get(2).unwrap().as_playlist().unwrap().raw();
    let before = harness.sim.ledger(last).add_refs;

    let head = container.slice(SliceBounds::from(0..2)).unwrap();

    assert_eq!(head.len(), 2);
    assert_eq!(harness.sim.ledger(last).add_refs, before + 1);
    assert_eq!(harness.sim.ledger(last).count, 0);
}

#[test]
fn test_set_inserts_then_removes_displaced() {
    let harness = Harness::logged_in(playlists(&["a", "b", "c"]));
    let container = harness.container();
    harness.sim.take_calls();

    container.set(1, NewEntry::from("x")).unwrap();

    assert_eq!(names(&harness), vec!["a", "x", "c"]);
    assert_eq!(
        harness.sim.take_calls(),
        vec![
            SimCall::AddNewPlaylist {
                name: "x".to_string()
            },
            SimCall::MovePlaylist {
                from: 3,
                to: 1,
                dry_run: false
            },
            SimCall::RemovePlaylist { index: 2 },
        ]
    );
}

#[test]
fn test_set_with_existing_playlist() {
    let harness = Harness::logged_in(playlists(&["a", "b", "c"]));
    let container = harness.container();
    let outside = harness
        .session
        .get_playlist("spotify:user:bob:playlist:000777")
        .unwrap();

    container.set(0, NewEntry::from(outside.clone())).unwrap();

    assert_eq!(names(&harness), vec!["", "b", "c"]);
    let first = container.get(0).unwrap();
    assert!(first.as_playlist().unwrap().same_instance(&outside));
}

#[test]
fn test_insert_of_present_playlist_is_a_no_op() {
    let harness = Harness::logged_in(playlists(&["a", "b", "c"]));
    let container = harness.container();
    let present = container.get(1).unwrap().as_playlist().unwrap().clone();

    container.insert(0, NewEntry::from(present.clone())).unwrap();
    assert_eq!(names(&harness), vec!["a", "b", "c"]);
    assert!(harness.sim.violations().is_empty());
}

#[test]
fn test_set_with_present_playlist_removes_original_entry() {
    let harness = Harness::logged_in(playlists(&["a", "b", "c"]));
    let container = harness.container();
    let present = container.get(2).unwrap().as_playlist().unwrap().clone();
    harness.sim.take_calls();

    container.set(0, NewEntry::from(present)).unwrap();

    assert_eq!(names(&harness), vec!["b", "c"]);
    let removals: Vec<_> = harness
        .sim
        .take_calls()
        .into_iter()
        .filter_map(|call| match call {
            SimCall::RemovePlaylist { index } => Some(index),
            _ => None,
        })
        .collect();
    assert_eq!(removals, vec![0]);
}

#[test]
fn test_slice_write_skips_declined_playlists() {
    let harness = Harness::logged_in(playlists(&["a", "b", "c", "d"]));
    let container = harness.container();
    let present = container.get(3).unwrap().as_playlist().unwrap().clone();

    container
        .set_slice(
            SliceBounds::from(0..2),
            vec![NewEntry::from(present), NewEntry::from("x")],
        )
        .unwrap();

    assert_eq!(names(&harness), vec!["x", "c", "d"]);
}

#[test]
fn test_set_out_of_range_changes_nothing() {
    let harness = Harness::logged_in(playlists(&["a"]));
    let container = harness.container();
    harness.sim.take_calls();

    assert!(matches!(
        container.set(1, NewEntry::from("x")),
        Err(SessionError::IndexOutOfRange { .. })
    ));
    assert!(harness.sim.take_calls().is_empty());
}

#[test]
fn test_failed_insert_removes_nothing() {
    let harness = Harness::logged_in(playlists(&["a", "b"]));
    let container = harness.container();
    harness.sim.take_calls();

    let err = container.set(0, NewEntry::from("")).unwrap_err();
    assert!(matches!(err, SessionError::InvalidValue(_)));
    assert!(harness.sim.take_calls().is_empty());
    assert_eq!(names(&harness), vec!["a", "b"]);
}

#[test]
fn test_slice_write_replaces_range() {
    let harness = Harness::logged_in(playlists(&["a", "b", "c", "d", "e"]));
    let container = harness.container();

    container
        .set_slice(
            SliceBounds::from(0..2),
            vec![NewEntry::from("x"), NewEntry::from("y")],
        )
        .unwrap();
    assert_eq!(names(&harness), vec!["x", "y", "c", "d", "e"]);

    container
        .set_slice(SliceBounds::from(1..4), vec![NewEntry::from("z")])
        .unwrap();
    assert_eq!(names(&harness), vec!["x", "z", "e"]);
}

#[test]
fn test_slice_write_of_mixed_entries() {
    let harness = Harness::logged_in(playlists(&["a", "b", "c", "d", "e"]));
    let container = harness.container();
    let outside = harness
        .session
        .get_playlist("spotify:user:bob:playlist:000777")
        .unwrap();
    harness.sim.take_calls();

    container
        .set_slice(
            SliceBounds::from(0..2),
            vec![NewEntry::from("x"), NewEntry::from(outside)],
        )
        .unwrap();

    let calls = harness.sim.take_calls();
    let moves: Vec<_> = calls
        .iter()
        .filter_map(|call| match call {
            SimCall::MovePlaylist { to, .. } => Some(*to),
            _ => None,
        })
        .collect();
    let removals: Vec<_> = calls
        .iter()
        .filter_map(|call| match call {
            SimCall::RemovePlaylist { index } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(moves, vec![0, 1]);
    assert_eq!(removals, vec![3, 2]);
    assert_eq!(names(&harness), vec!["x", "", "c", "d", "e"]);
}

#[test]
fn test_delete_slice_removes_highest_first() {
    let harness = Harness::logged_in(playlists(&["a", "b", "c"]));
    let container = harness.container();
    harness.sim.take_calls();

    container.delete_slice(SliceBounds::from(0..2)).unwrap();

    assert_eq!(names(&harness), vec!["c"]);
    assert_eq!(
        harness.sim.take_calls(),
        vec![
            SimCall::RemovePlaylist { index: 1 },
            SimCall::RemovePlaylist { index: 0 },
        ]
    );
}

#[test]
fn test_add_new_playlist_appends_or_places() {
    let harness = Harness::logged_in(playlists(&["a", "b"]));
    let container = harness.container();
    harness.sim.take_calls();

    let appended = container.add_new_playlist("tail", None).unwrap();
    assert_eq!(appended.name().as_deref(), Some("tail"));
    // index equal to the append position needs no move
    container.add_new_playlist("end", Some(3)).unwrap();
    container.add_new_playlist("head", Some(0)).unwrap();

    assert_eq!(names(&harness), vec!["head", "a", "b", "tail", "end"]);
    let moves: Vec<_> = harness
        .sim
        .take_calls()
        .into_iter()
        .filter(|call| matches!(call, SimCall::MovePlaylist { .. }))
        .collect();
    assert_eq!(
        moves,
        vec![SimCall::MovePlaylist {
            from: 4,
            to: 0,
            dry_run: false
        }]
    );
}

#[test]
fn test_add_new_playlist_validates_name() {
    let harness = Harness::logged_in(playlists(&["a"]));
    let container = harness.container();
    harness.sim.take_calls();

    let too_long = "x".repeat(300);
    for name in ["", "   ", too_long.as_str()] {
        assert!(
            matches!(
                container.add_new_playlist(name, None),
                Err(SessionError::InvalidValue(_))
            ),
            "{name:?} should be rejected"
        );
    }
    assert!(harness.sim.take_calls().is_empty());

    assert!(container.add_new_playlist(&"x".repeat(255), None).is_ok());
}

#[test]
fn test_add_new_playlist_native_failure() {
    let harness = Harness::logged_in(playlists(&["a"]));
    let container = harness.container();
    harness
        .sim
        .fail_next(FailPoint::AddNewPlaylist, ErrorType::OtherPermanent);

    assert!(matches!(
        container.add_new_playlist("x", None),
        Err(SessionError::Operation(_))
    ));
    assert_eq!(names(&harness), vec!["a"]);
}

#[test]
fn test_add_playlist_by_link_or_wrapper() {
    let harness = Harness::logged_in(playlists(&["a"]));
    let container = harness.container();

    let link = harness
        .session
        .get_link("spotify:user:bob:playlist:000777")
        .unwrap();
    let added = container
        .add_playlist(PlaylistSource::Link(&link), None)
        .unwrap()
        .expect("added");
    assert_eq!(container.len(), 2);

    // already present
    assert!(container
        .add_playlist(PlaylistSource::Playlist(&added), None)
        .unwrap()
        .is_none());

    let track_link = harness.session.get_link("spotify:track:abc").unwrap();
    assert!(container
        .add_playlist(PlaylistSource::Link(&track_link), Some(0))
        .unwrap()
        .is_none());
    assert_eq!(container.len(), 2);
}

#[test]
fn test_add_folder() {
    let harness = Harness::logged_in(playlists(&["a", "b"]));
    let container = harness.container();

    container.add_folder("End", None).unwrap();
    container.add_folder("Front", Some(0)).unwrap();

    assert_eq!(
        names(&harness),
        vec!["[1001:Front", "1001]", "a", "b", "[1000:End", "1000]"]
    );

    assert!(matches!(
        container.add_folder(" ", None),
        Err(SessionError::InvalidValue(_))
    ));
    let err = container.add_folder("Far", Some(99)).unwrap_err();
    assert_eq!(err.error_type(), Some(ErrorType::IndexOutOfRange));
}

#[test]
fn test_remove_folder_removes_both_markers() {
    let harness = Harness::logged_in(folder_layout());
    let container = harness.container();
    harness.sim.take_calls();

    container.remove_playlist(1, false).unwrap();

    assert_eq!(names(&harness), vec!["a", "b", "[6:Inner", "c", "6]", "d"]);
    assert_eq!(
        harness.sim.take_calls(),
        vec![
            SimCall::RemovePlaylist { index: 6 },
            SimCall::RemovePlaylist { index: 1 },
        ]
    );
}

#[test]
fn test_remove_folder_recursively_from_end_marker() {
    let harness = Harness::logged_in(folder_layout());
    let container = harness.container();
    harness.sim.take_calls();

    container.remove_playlist(6, true).unwrap();

    assert_eq!(names(&harness), vec!["a", "d"]);
    let removed: Vec<_> = harness
        .sim
        .take_calls()
        .into_iter()
        .map(|call| match call {
            SimCall::RemovePlaylist { index } => index,
            other => panic!("unexpected call {other:?}"),
        })
        .collect();
    assert_eq!(removed, vec![6, 5, 4, 3, 2, 1]);
}

#[test]
fn test_remove_playlist_errors() {
    let harness = Harness::logged_in(playlists(&["a", "b"]));
    let container = harness.container();

    assert!(matches!(
        container.remove_playlist(2, false),
        Err(SessionError::IndexOutOfRange { .. })
    ));

    harness
        .sim
        .fail_next(FailPoint::RemovePlaylist, ErrorType::PermissionDenied);
    let err = container.remove_playlist(0, false).unwrap_err();
    assert_eq!(err.error_type(), Some(ErrorType::PermissionDenied));
    assert_eq!(names(&harness), vec!["a", "b"]);

    container.delete(0).unwrap();
    assert_eq!(names(&harness), vec!["b"]);
}

#[test]
fn test_move_playlist() {
    let harness = Harness::logged_in(playlists(&["a", "b", "c"]));
    let container = harness.container();

    container.move_playlist(0, 3, true).unwrap();
    assert_eq!(names(&harness), vec!["a", "b", "c"]);

    container.move_playlist(0, 3, false).unwrap();
    assert_eq!(names(&harness), vec!["b", "c", "a"]);

    let err = container.move_playlist(0, 9, false).unwrap_err();
    assert_eq!(err.error_type(), Some(ErrorType::IndexOutOfRange));
}

#[test]
fn test_find_folder_indexes_and_tree() {
    let harness = Harness::logged_in(folder_layout());
    let container = harness.container();

    assert_eq!(container.find_folder_indexes(5, false).unwrap(), vec![1, 6]);
    assert_eq!(container.find_folder_indexes(6, true).unwrap(), vec![3, 4, 5]);
    assert!(container.find_folder_indexes(42, true).unwrap().is_empty());

    let tree = container.folder_tree().unwrap();
    assert_eq!(tree.len(), 3);
    match &tree[1] {
        FolderNode::Folder { id, name, children } => {
            assert_eq!((*id, name.as_str()), (5, "Outer"));
            assert_eq!(children.len(), 2);
            assert!(matches!(&children[1], FolderNode::Folder { id: 6, .. }));
        }
        other => panic!("expected folder, got {other:?}"),
    }
}

#[test]
fn test_owner_is_logged_in_user() {
    let harness = Harness::logged_in(playlists(&["a"]));
    let container = harness.container();

    let owner = container.owner().unwrap();
    assert_eq!(owner.canonical_name(), "alice");
    assert!(owner.same_instance(&harness.session.user().unwrap()));
}

#[test]
fn test_unseen_tracks_are_fetched_in_batches() {
    let harness = Harness::logged_in(playlists(&["a"]));
    harness.sim.seed_unseen_tracks("a", ["t1", "t2", "t3"]);
    let container = harness.container();
    let playlist = container.get(0).unwrap().as_playlist().unwrap().clone();
    harness.sim.take_calls();

    let unseen = container.get_unseen_tracks(&playlist).unwrap();
    assert_eq!(unseen.len(), 3);
    assert_eq!(unseen.get(0).unwrap().name().as_deref(), Some("t1"));
    assert_eq!(unseen.get(2).unwrap().name().as_deref(), Some("t3"));
    assert!(matches!(
        unseen.get(3),
        Err(SessionError::IndexOutOfRange { .. })
    ));

    let capacities: Vec<_> = harness
        .sim
        .take_calls()
        .into_iter()
        .filter_map(|call| match call {
            SimCall::GetUnseenTracks { capacity, .. } => Some(capacity),
            _ => None,
        })
        .collect();
    assert_eq!(capacities, vec![2, 3]);

    let names: Vec<_> = unseen.iter().filter_map(|track| track.name()).collect();
    assert_eq!(names, vec!["t1", "t2", "t3"]);

    container.clear_unseen_tracks(&playlist).unwrap();
    assert!(container.get_unseen_tracks(&playlist).unwrap().is_empty());
}

#[test]
fn test_unseen_tracks_failures() {
    let harness = Harness::logged_in(playlists(&["a"]));
    let container = harness.container();
    let playlist = container.get(0).unwrap().as_playlist().unwrap().clone();

    harness
        .sim
        .fail_next(FailPoint::GetUnseenTracks, ErrorType::OtherPermanent);
    assert!(matches!(
        container.get_unseen_tracks(&playlist),
        Err(SessionError::Operation(_))
    ));

    harness
        .sim
        .fail_next(FailPoint::ClearUnseenTracks, ErrorType::OtherPermanent);
    assert!(matches!(
        container.clear_unseen_tracks(&playlist),
        Err(SessionError::Operation(_))
    ));

    let outside = harness
        .session
        .get_playlist("spotify:user:bob:playlist:000777")
        .unwrap();
    assert!(container.get_unseen_tracks(&outside).is_err());
}

#[test]
fn test_container_operations_release_everything() {
    let harness = Harness::logged_in(folder_layout());
    {
        let container = harness.container();
        container.entries().unwrap();
        container.add_new_playlist("x", Some(2)).unwrap();
        container.remove_playlist(1, true).unwrap();
        container.folder_tree().unwrap();
    }
    let Harness { sim, session } = harness;
    drop(session);
    assert_clean_shutdown(&sim);
}
