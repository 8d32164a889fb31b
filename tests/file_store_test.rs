//! Tests for the file-backed store wired through ServiceContainer

use std::sync::Arc;

use tempfile::TempDir;

use marktree::application::hash;
use marktree::application::services::MarkToggle;
use marktree::domain::{Location, NavigationSession};
use marktree::infrastructure::di::ServiceContainer;
use marktree::infrastructure::traits::{FixedLocationProvider, TracingNotifier};
use marktree::util::testing;

fn open(dir: &TempDir, at: Option<Location>) -> ServiceContainer {
    testing::init_test_setup();
    ServiceContainer::new(
        testing::settings_in(dir.path(), true),
        Arc::new(FixedLocationProvider::new(at)),
        Arc::new(TracingNotifier),
    )
    .unwrap()
}

#[test]
fn given_marked_source_file_when_reopening_then_bookmark_and_hash_survive() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("lib.rs");
    std::fs::write(&source, "pub fn answer() -> u32 { 42 }\n").unwrap();
    let loc = Location::new(&source, 1, 7);

    // Act
    let created = open(&dir, Some(loc.clone()))
        .bookmarks
        .toggle_mark("answer", None, None)
        .unwrap();
    let reopened = open(&dir, None);

    // Assert
    let MarkToggle::Created(bookmark) = created else {
        panic!("expected a new bookmark");
    };
    let expected_hash = hash::file_hash(&source).unwrap();
    assert_eq!(bookmark.content_hash.as_deref(), Some(expected_hash.as_str()));

    let stored = reopened.bookmarks.bookmark_at(&loc).unwrap().unwrap();
    assert_eq!(stored.id, bookmark.id);
    assert_eq!(stored.name, "answer");
    assert!(dir.path().join("bookmarks.json").exists());
}

#[test]
fn given_changed_file_when_checking_hash_then_reported_as_changed() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("notes.md");
    std::fs::write(&source, "first draft\n").unwrap();
    let loc = Location::new(&source, 1, 0);

    let bookmark = open(&dir, Some(loc))
        .bookmarks
        .toggle_mark("draft", None, None)
        .unwrap()
        .bookmark()
        .clone();
    std::fs::write(&source, "second draft\n").unwrap();

    let recorded = bookmark.content_hash.unwrap();
    assert!(!hash::is_unchanged(&source, &recorded));
}

#[test]
fn given_active_list_switched_when_reopening_then_choice_persists() {
    let dir = TempDir::new().unwrap();
    let other = {
        let c = open(&dir, None);
        let list = c
            .bookmarks
            .new_list(marktree::domain::new_list("Work").into(), Some(0))
            .unwrap();
        let mut session = NavigationSession::new();
        c.bookmarks
            .set_active_list(&mut session, list.id.unwrap())
            .unwrap();
        list.id
    };

    let reopened = open(&dir, None);

    assert_eq!(reopened.bookmarks.active_list().unwrap().id, other);
}
