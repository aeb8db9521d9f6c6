//! Folder sentinels in the flat container layout.
//!
//! A folder is a pair of entries, a start marker and an end marker sharing
//! one id, with the folder's contents between them. Folders nest.

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FolderBoundaryKind {
    Start,
    End,
}

/// One folder marker as read from the container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaylistFolder {
    pub id: u64,
    /// Empty on end markers.
    pub name: String,
    pub kind: FolderBoundaryKind,
}

impl PlaylistFolder {
    pub fn start(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: FolderBoundaryKind::Start,
        }
    }

    pub fn end(id: u64) -> Self {
        Self {
            id,
            name: String::new(),
            kind: FolderBoundaryKind::End,
        }
    }
}

/// Anything that may be a folder marker.
pub trait FolderBoundary {
    fn as_folder(&self) -> Option<&PlaylistFolder>;
}

impl FolderBoundary for PlaylistFolder {
    fn as_folder(&self) -> Option<&PlaylistFolder> {
        Some(self)
    }
}

impl<E: FolderBoundary> FolderBoundary for Option<E> {
    fn as_folder(&self) -> Option<&PlaylistFolder> {
        self.as_ref().and_then(FolderBoundary::as_folder)
    }
}

/// Positions to delete when removing folder `folder_id`.
///
/// The start marker is the first start with that id; the end marker is the
/// first end with that id after it, or the first anywhere when there is no
/// start. Non-recursive removal yields just the markers that exist; recursive
/// removal yields every position from start through end. Always ascending.
pub fn find_folder_indexes<E: FolderBoundary>(
    entries: &[E],
    folder_id: u64,
    recursive: bool,
) -> Vec<usize> {
    let is_marker = |entry: &E, kind: FolderBoundaryKind| {
        entry
            .as_folder()
            .is_some_and(|folder| folder.id == folder_id && folder.kind == kind)
    };

    let start = entries
        .iter()
        .position(|entry| is_marker(entry, FolderBoundaryKind::Start));
    let search_from = start.map_or(0, |start| start + 1);
    let end = entries[search_from..]
        .iter()
        .position(|entry| is_marker(entry, FolderBoundaryKind::End))
        .map(|offset| offset + search_from);

    match (start, end) {
        (Some(start), Some(end)) if recursive => (start..=end).collect(),
        (Some(start), Some(end)) => vec![start, end],
        (Some(only), None) | (None, Some(only)) => vec![only],
        (None, None) => Vec::new(),
    }
}

/// A node of the nested view over the flat layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderNode<E> {
    Item(E),
    Folder {
        id: u64,
        name: String,
        children: Vec<FolderNode<E>>,
    },
}

/// Nest a flat layout by its folder markers.
///
/// An end marker with no open folder is skipped; folders still open at the
/// end of the layout are closed there.
pub fn build_tree<E: FolderBoundary>(entries: Vec<E>) -> Vec<FolderNode<E>> {
    // Bottom of the stack is the root level.
    let mut stack: Vec<Level<E>> = vec![(None, Vec::new())];

    for entry in entries {
        let marker = entry
            .as_folder()
            .map(|folder| (folder.kind, folder.id, folder.name.clone()));
        match marker {
            Some((FolderBoundaryKind::Start, id, name)) => {
                stack.push((Some((id, name)), Vec::new()));
            }
            Some((FolderBoundaryKind::End, id, _)) => {
                if stack.len() == 1 {
                    warn!(folder_id = id, "Folder end without a matching start");
                    continue;
                }
                close_folder(&mut stack);
            }
            None => {
                if let Some((_, items)) = stack.last_mut() {
                    items.push(FolderNode::Item(entry));
                }
            }
        }
    }

    while stack.len() > 1 {
        close_folder(&mut stack);
    }
    stack.pop().map(|(_, items)| items).unwrap_or_default()
}

type Level<E> = (Option<(u64, String)>, Vec<FolderNode<E>>);

fn close_folder<E>(stack: &mut Vec<Level<E>>) {
    if let Some((Some((id, name)), children)) = stack.pop() {
        if let Some((_, parent)) = stack.last_mut() {
            parent.push(FolderNode::Folder { id, name, children });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Entry {
        Item(&'static str),
        Folder(PlaylistFolder),
    }

    impl FolderBoundary for Entry {
        fn as_folder(&self) -> Option<&PlaylistFolder> {
            match self {
                Entry::Folder(folder) => Some(folder),
                Entry::Item(_) => None,
            }
        }
    }

    fn start(id: u64, name: &str) -> Entry {
        Entry::Folder(PlaylistFolder::start(id, name))
    }

    fn end(id: u64) -> Entry {
        Entry::Folder(PlaylistFolder::end(id))
    }

    fn layout() -> Vec<Entry> {
        // 0 a, 1 [outer, 2 b, 3 [inner, 4 c, 5 ], 6 ], 7 d
        vec![
            Entry::Item("a"),
            start(1, "outer"),
            Entry::Item("b"),
            start(2, "inner"),
            Entry::Item("c"),
            end(2),
            end(1),
            Entry::Item("d"),
        ]
    }

    #[test]
    fn test_non_recursive_returns_markers() {
        assert_eq!(find_folder_indexes(&layout(), 1, false), vec![1, 6]);
        assert_eq!(find_folder_indexes(&layout(), 2, false), vec![3, 5]);
    }

    #[test]
    fn test_recursive_returns_whole_span() {
        assert_eq!(find_folder_indexes(&layout(), 1, true), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(find_folder_indexes(&layout(), 2, true), vec![3, 4, 5]);
    }

    #[test]
    fn test_unknown_folder_is_empty() {
        assert!(find_folder_indexes(&layout(), 99, true).is_empty());
    }

    #[test]
    fn test_half_folders() {
        let only_start = vec![Entry::Item("a"), start(5, "x"), Entry::Item("b")];
        assert_eq!(find_folder_indexes(&only_start, 5, true), vec![1]);

        let only_end = vec![Entry::Item("a"), end(5)];
        assert_eq!(find_folder_indexes(&only_end, 5, false), vec![1]);
    }

    #[test]
    fn test_end_before_start_is_not_paired() {
        let entries = vec![end(7), start(7, "x"), Entry::Item("a"), end(7)];
        assert_eq!(find_folder_indexes(&entries, 7, false), vec![1, 3]);
    }

    #[test]
    fn test_build_tree_nests_folders() {
        let tree = build_tree(layout());
        assert_eq!(
            tree,
            vec![
                FolderNode::Item(Entry::Item("a")),
                FolderNode::Folder {
                    id: 1,
                    name: "outer".into(),
                    children: vec![
                        FolderNode::Item(Entry::Item("b")),
                        FolderNode::Folder {
                            id: 2,
                            name: "inner".into(),
                            children: vec![FolderNode::Item(Entry::Item("c"))],
                        },
                    ],
                },
                FolderNode::Item(Entry::Item("d")),
            ]
        );
    }

    #[test]
    fn test_build_tree_tolerates_unbalanced_markers() {
        let tree = build_tree(vec![end(3), start(4, "open"), Entry::Item("a")]);
        assert_eq!(
            tree,
            vec![FolderNode::Folder {
                id: 4,
                name: "open".into(),
                children: vec![FolderNode::Item(Entry::Item("a"))],
            }]
        );
    }
}
