//! Tests for id-order and line-order bookmark navigation

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rstest::rstest;

use marktree::application::services::{BookmarkService, Navigation};
use marktree::config::{NavigationConfig, Settings};
use marktree::domain::{
    new_bookmark, new_list, Direction, Location, NavigationNotice, NavigationSession, NodeId,
};
use marktree::infrastructure::di::ServiceContainer;
use marktree::infrastructure::store::TreeStore;
use marktree::infrastructure::traits::{LocationProvider, Notifier};
use marktree::util::testing;

/// Location provider returning a fixed cursor
struct MockLocation {
    current: Option<Location>,
}

impl LocationProvider for MockLocation {
    fn current_location(&self) -> Option<Location> {
        self.current.clone()
    }
}

/// Notifier collecting every notice it receives
#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<NavigationNotice>>,
}

impl RecordingNotifier {
    fn notices(&self) -> Vec<NavigationNotice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &NavigationNotice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

struct Harness {
    container: ServiceContainer,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn new(current: Option<Location>, wraparound: bool) -> Self {
        testing::init_test_setup();
        let notifier = Arc::new(RecordingNotifier::default());
        let settings = Settings {
            navigation: NavigationConfig { wraparound },
            ..Settings::default()
        };
        let container = ServiceContainer::with_deps(
            settings,
            Arc::new(TreeStore::in_memory()),
            Arc::new(MockLocation { current }),
            notifier.clone(),
        );
        Self {
            container,
            notifier,
        }
    }

    fn svc(&self) -> &BookmarkService {
        &self.container.bookmarks
    }

    fn mark_at(&self, name: &str, path: &str, line: u32) -> NodeId {
        let bookmark = new_bookmark(name).at(Location::new(path, line, 0));
        self.svc()
            .new_bookmark(bookmark.into(), None)
            .unwrap()
            .id
            .unwrap()
    }

    fn step_id_order(&self, session: &mut NavigationSession, direction: Direction) -> Option<String> {
        let mut seen = None;
        let result = match direction {
            Direction::Next => self
                .svc()
                .find_next_bookmark_id_order(session, |b| seen = Some(b.name.clone())),
            Direction::Prev => self
                .svc()
                .find_prev_bookmark_id_order(session, |b| seen = Some(b.name.clone())),
        }
        .unwrap();
        assert_eq!(result.selected().map(|b| b.name.clone()), seen);
        seen
    }

    fn step_line_order(&self, direction: Direction) -> Navigation {
        let callback = |_: &marktree::domain::Bookmark| {};
        match direction {
            Direction::Next => self.svc().find_next_bookmark_line_order(callback),
            Direction::Prev => self.svc().find_prev_bookmark_line_order(callback),
        }
        .unwrap()
    }
}

// ============================================================
// id order
// ============================================================

#[test]
fn given_three_bookmarks_when_stepping_forward_then_cycles_in_order() {
    let h = Harness::new(None, true);
    h.mark_at("one", "a.rs", 30);
    h.mark_at("two", "a.rs", 10);
    h.mark_at("three", "b.rs", 20);
    let mut session = NavigationSession::new();

    let visited = (0..4)
        .map(|_| h.step_id_order(&mut session, Direction::Next))
        .collect::<Vec<_>>();

    assert_eq!(
        visited,
        ["one", "two", "three", "one"].map(|s| Some(s.to_string()))
    );
}

#[test]
fn given_unset_cursor_when_stepping_backward_then_selects_first() {
    let h = Harness::new(None, true);
    h.mark_at("one", "a.rs", 1);
    h.mark_at("two", "a.rs", 2);
    let mut session = NavigationSession::new();

    assert_eq!(
        h.step_id_order(&mut session, Direction::Prev),
        Some("one".to_string())
    );
    assert_eq!(
        h.step_id_order(&mut session, Direction::Prev),
        Some("two".to_string())
    );
}

#[test]
fn given_bookmarks_in_nested_list_when_stepping_then_included() {
    let h = Harness::new(None, true);
    h.mark_at("top", "a.rs", 1);
    let nested = h
        .svc()
        .new_list(new_list("nested").into(), None)
        .unwrap()
        .id
        .unwrap();
    h.svc()
        .new_bookmark(new_bookmark("inner").into(), Some(nested))
        .unwrap();
    let mut session = NavigationSession::new();

    let first = h.step_id_order(&mut session, Direction::Next);
    let second = h.step_id_order(&mut session, Direction::Next);

    let mut names = vec![first.unwrap(), second.unwrap()];
    names.sort();
    assert_eq!(names, vec!["inner".to_string(), "top".to_string()]);
}

#[test]
fn given_empty_active_list_when_stepping_then_notifies_without_callback() {
    let h = Harness::new(None, true);
    let mut session = NavigationSession::new();

    let seen = h.step_id_order(&mut session, Direction::Next);

    assert_eq!(seen, None);
    assert_eq!(h.notifier.notices(), vec![NavigationNotice::NoBookmarksAvailable]);
    assert_eq!(session.last_visited(), None);
}

#[test]
fn given_session_from_other_list_when_stepping_then_cursor_restarts() {
    let h = Harness::new(None, true);
    let first = h.mark_at("one", "a.rs", 1);
    h.mark_at("two", "a.rs", 2);
    let active = h.svc().active_list().unwrap().id.unwrap();
    let mut session = NavigationSession::resume(active + 100, first);

    assert_eq!(
        h.step_id_order(&mut session, Direction::Next),
        Some("one".to_string())
    );
    assert_eq!(session.list_id(), Some(active));
}

// ============================================================
// line order
// ============================================================

fn file_marks(h: &Harness) {
    h.mark_at("top", "src/lib.rs", 5);
    h.mark_at("middle", "src/lib.rs", 20);
    h.mark_at("bottom", "src/lib.rs", 40);
    h.mark_at("elsewhere", "src/main.rs", 30);
}

#[rstest]
#[case(10, Direction::Next, true, "middle")]
#[case(10, Direction::Prev, true, "top")]
#[case(20, Direction::Next, true, "bottom")]
#[case(50, Direction::Next, true, "top")]
#[case(1, Direction::Prev, true, "bottom")]
fn given_cursor_in_file_when_stepping_by_line_then_selects_neighbour(
    #[case] line: u32,
    #[case] direction: Direction,
    #[case] wraparound: bool,
    #[case] expected: &str,
) {
    let h = Harness::new(Some(Location::new("src/lib.rs", line, 0)), wraparound);
    file_marks(&h);

    let result = h.step_line_order(direction);

    assert_eq!(result.selected().map(|b| b.name.as_str()), Some(expected));
    assert!(h.notifier.notices().is_empty());
}

#[rstest]
#[case(50, Direction::Next)]
#[case(1, Direction::Prev)]
fn given_cursor_past_edge_without_wraparound_when_stepping_then_no_match(
    #[case] line: u32,
    #[case] direction: Direction,
) {
    let h = Harness::new(Some(Location::new("src/lib.rs", line, 0)), false);
    file_marks(&h);

    let result = h.step_line_order(direction);

    assert_eq!(
        result,
        Navigation::Nothing(NavigationNotice::NoMatchInDirection(direction))
    );
    assert_eq!(
        h.notifier.notices(),
        vec![NavigationNotice::NoMatchInDirection(direction)]
    );
}

#[test]
fn given_file_without_bookmarks_when_stepping_by_line_then_no_bookmarks_in_file() {
    let h = Harness::new(Some(Location::new("README.md", 1, 0)), true);
    file_marks(&h);

    let result = h.step_line_order(Direction::Next);

    assert_eq!(
        result,
        Navigation::Nothing(NavigationNotice::NoBookmarksInFile(PathBuf::from(
            "README.md"
        )))
    );
}

#[test]
fn given_no_current_location_when_stepping_by_line_then_missing_location() {
    let h = Harness::new(None, true);
    file_marks(&h);

    let result = h
        .svc()
        .find_next_bookmark_line_order(|_: &marktree::domain::Bookmark| {});

    assert!(matches!(
        result,
        Err(marktree::application::ApplicationError::MissingLocation)
    ));
}
