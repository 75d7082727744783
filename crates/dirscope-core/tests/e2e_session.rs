/// End-to-end session tests: scan a real temporary directory, then search,
/// mark, create and delete through a [`Session`] and check both the disk and
/// the trees.
use dirscope_core::error::TreeError;
use dirscope_core::platform::ClusterProbe;
use dirscope_core::scanner::{scan_with_probe, ScanOptions};
use dirscope_core::search::SearchQuery;
use dirscope_core::session::Session;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

static PROBE: ClusterProbe = ClusterProbe::DEFAULT;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// ```text
/// root/
///   docs/
///     report.pdf   (300 bytes)
///     notes.txt    (20 bytes)
///   img/
///     photo.jpg    (500 bytes)
/// ```
fn build_tree(root: &Path) {
    fs::create_dir(root.join("docs")).unwrap();
    fs::create_dir(root.join("img")).unwrap();
    fs::write(root.join("docs/report.pdf"), vec![1u8; 300]).unwrap();
    fs::write(root.join("docs/notes.txt"), vec![1u8; 20]).unwrap();
    fs::write(root.join("img/photo.jpg"), vec![1u8; 500]).unwrap();
}

fn session_for(root: &Path) -> Session {
    let options = ScanOptions::new(root).without_default_ignore_file();
    let outcome = scan_with_probe(&options, &PROBE).unwrap();
    Session::with_probe(outcome.tree, root, &PROBE)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn test_search_prunes_view_but_not_original() {
    let tmp = TempDir::new().unwrap();
    build_tree(tmp.path());
    let mut session = session_for(tmp.path());

    session.apply_filter(SearchQuery::containing("report", false, false));

    let view = session.view();
    let names: Vec<&str> = view
        .descendants(view.root())
        .map(|(idx, _)| view.node(idx).name.as_str())
        .collect();
    assert_eq!(names[1..], ["docs", "report.pdf"]);
    assert_eq!(session.original().file_count(session.original().root()), 3);
    // Aggregates are copied from the original, not recomputed.
    assert_eq!(session.summary(), "1 file, 12.00 KB on disk");
}

/// Creating "next to" a file puts the new file in that file's directory, and
/// the filtered view is re-derived from the updated original.
#[test]
fn test_create_file_beside_selected_file() {
    let tmp = TempDir::new().unwrap();
    build_tree(tmp.path());
    let mut session = session_for(tmp.path());
    session.apply_filter(SearchQuery::containing("re", false, false));

    let report = session.view().find(&["docs", "report.pdf"]).unwrap();
    let created = session.create_file(report, "readme.md").unwrap();

    assert_eq!(created, tmp.path().join("docs").join("readme.md"));
    assert!(created.is_file());
    assert!(session.original().find(&["docs", "readme.md"]).is_some());
    // "readme.md" contains "re", so it shows up in the filtered view too.
    assert!(session.view().find(&["docs", "readme.md"]).is_some());
    assert!(session.query().is_some());
}

#[test]
fn test_create_existing_file_is_rejected() {
    let tmp = TempDir::new().unwrap();
    build_tree(tmp.path());
    let mut session = session_for(tmp.path());

    let docs = session.view().find(&["docs"]).unwrap();
    let err = session.create_file(docs, "notes.txt").unwrap_err();
    assert!(matches!(err, TreeError::AlreadyExists(_)));
}

#[test]
fn test_remove_file_updates_disk_and_totals() {
    let tmp = TempDir::new().unwrap();
    build_tree(tmp.path());
    let mut session = session_for(tmp.path());
    let before = session.original().total_size();

    let photo = session.view().find(&["img", "photo.jpg"]).unwrap();
    session.toggle_mark(photo);
    let removed = session.remove_file(photo).unwrap();

    assert_eq!(removed, tmp.path().join("img").join("photo.jpg"));
    assert!(!removed.exists());
    assert_eq!(session.original().total_size(), before - 500);
    assert_eq!(session.view().find(&["img", "photo.jpg"]), None);
    assert!(session.marked_paths().is_empty());
}

#[test]
fn test_remove_directory_is_rejected_and_kept() {
    let tmp = TempDir::new().unwrap();
    build_tree(tmp.path());
    let mut session = session_for(tmp.path());

    let img = session.view().find(&["img"]).unwrap();
    assert!(matches!(session.remove_file(img), Err(TreeError::IsDirectory(_))));
    assert!(tmp.path().join("img").is_dir());
}

#[test]
fn test_details_for_scanned_file() {
    let tmp = TempDir::new().unwrap();
    build_tree(tmp.path());
    let session = session_for(tmp.path());

    let notes = session.view().find(&["docs", "notes.txt"]).unwrap();
    let details = session.details(notes);
    assert_eq!(details.path, tmp.path().join("docs").join("notes.txt"));
    assert_eq!(details.size, "20 B real, 4.00 KB on disk (4096)");
    assert!(details.permissions.starts_with('-'));
    assert_ne!(details.modified, "-");
}

// ── Names that are not UTF-8 ─────────────────────────────────────────────────

#[cfg(target_os = "linux")]
mod raw_names {
    use super::*;
    use dirscope_core::model::NodeIndex;
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    /// The view child of the root whose on-disk name is not UTF-8.
    fn raw_child(session: &Session) -> NodeIndex {
        let view = session.view();
        view.children(view.root())
            .iter()
            .copied()
            .find(|&c| view.node(c).raw_name.is_some())
            .unwrap()
    }

    #[test]
    fn test_remove_file_with_invalid_utf8_name() {
        let tmp = TempDir::new().unwrap();
        let raw = tmp.path().join(OsStr::from_bytes(b"b\xfe.bin"));
        fs::write(&raw, vec![1u8; 40]).unwrap();
        fs::write(tmp.path().join("keep.txt"), vec![1u8; 10]).unwrap();
        let mut session = session_for(tmp.path());

        let target = raw_child(&session);
        assert_eq!(session.view().node(target).name.as_str(), "b\u{FFFD}.bin");
        assert_eq!(session.details(target).path, raw);

        let removed = session.remove_file(target).unwrap();
        assert_eq!(removed, raw);
        assert!(!raw.exists());

        let view = session.view();
        let names: Vec<&str> = view
            .children(view.root())
            .iter()
            .map(|&c| view.node(c).name.as_str())
            .collect();
        assert_eq!(names, ["keep.txt"]);
        assert_eq!(session.original().total_size(), 10);
    }

    /// A raw name and a UTF-8 name that render the same are still two files.
    #[test]
    fn test_remove_hits_selected_sibling_when_display_names_collide() {
        let tmp = TempDir::new().unwrap();
        let raw = tmp.path().join(OsStr::from_bytes(b"a\xff"));
        let lookalike = tmp.path().join("a\u{FFFD}");
        fs::write(&raw, vec![1u8; 10]).unwrap();
        fs::write(&lookalike, vec![1u8; 20]).unwrap();
        let mut session = session_for(tmp.path());
        assert_eq!(session.view().children(session.view().root()).len(), 2);

        let target = raw_child(&session);
        session.remove_file(target).unwrap();

        assert!(!raw.exists());
        assert!(lookalike.exists());
        assert_eq!(session.original().total_size(), 20);
        let view = session.view();
        let left = view.children(view.root());
        assert_eq!(left.len(), 1);
        assert!(view.node(left[0]).raw_name.is_none());
    }
}
