//! Next/previous bookmark navigation within the active list.

use tracing::{debug, instrument};

use crate::application::services::BookmarkService;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::navigation::{select_by_line, select_by_order};
use crate::domain::{get_all_bookmarks, Bookmark, Direction, NavigationNotice, NavigationSession};

/// Result of a navigation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Selected(Bookmark),
    /// Nothing to select; the notifier has already been told.
    Nothing(NavigationNotice),
}

impl Navigation {
    pub fn selected(&self) -> Option<&Bookmark> {
        match self {
            Navigation::Selected(b) => Some(b),
            Navigation::Nothing(_) => None,
        }
    }
}

impl BookmarkService {
    /// Step to the next bookmark by `order`, wrapping at the end.
    pub fn find_next_bookmark_id_order<F>(
        &self,
        session: &mut NavigationSession,
        on_select: F,
    ) -> ApplicationResult<Navigation>
    where
        F: FnOnce(&Bookmark),
    {
        self.step_by_order(session, Direction::Next, on_select)
    }

    /// Step to the previous bookmark by `order`, wrapping at the start.
    pub fn find_prev_bookmark_id_order<F>(
        &self,
        session: &mut NavigationSession,
        on_select: F,
    ) -> ApplicationResult<Navigation>
    where
        F: FnOnce(&Bookmark),
    {
        self.step_by_order(session, Direction::Prev, on_select)
    }

    /// Closest bookmark below the current line in the current file.
    pub fn find_next_bookmark_line_order<F>(&self, on_select: F) -> ApplicationResult<Navigation>
    where
        F: FnOnce(&Bookmark),
    {
        self.step_by_line(Direction::Next, on_select)
    }

    /// Closest bookmark above the current line in the current file.
    pub fn find_prev_bookmark_line_order<F>(&self, on_select: F) -> ApplicationResult<Navigation>
    where
        F: FnOnce(&Bookmark),
    {
        self.step_by_line(Direction::Prev, on_select)
    }

    #[instrument(level = "debug", skip(self, session, on_select))]
    fn step_by_order<F>(
        &self,
        session: &mut NavigationSession,
        direction: Direction,
        on_select: F,
    ) -> ApplicationResult<Navigation>
    where
        F: FnOnce(&Bookmark),
    {
        let list = self.active_list()?;
        session.focus(list.require_id()?);
        let bookmarks = get_all_bookmarks(&list, |id| self.repo.find_node(id))?;

        match select_by_order(&bookmarks, session.last_visited(), direction) {
            Ok(bookmark) => {
                session.record(bookmark.require_id()?);
                debug!("step_by_order: selected {}", bookmark.name);
                on_select(&bookmark);
                Ok(Navigation::Selected(bookmark))
            }
            Err(notice) => Ok(self.report(notice)),
        }
    }

    #[instrument(level = "debug", skip(self, on_select))]
    fn step_by_line<F>(&self, direction: Direction, on_select: F) -> ApplicationResult<Navigation>
    where
        F: FnOnce(&Bookmark),
    {
        let here = self
            .locations
            .current_location()
            .ok_or(ApplicationError::MissingLocation)?;
        let list = self.active_list()?;
        let bookmarks = get_all_bookmarks(&list, |id| self.repo.find_node(id))?;

        match select_by_line(
            &bookmarks,
            &here,
            direction,
            self.settings.navigation.wraparound,
        ) {
            Ok(bookmark) => {
                debug!("step_by_line: {} -> {}", here, bookmark.name);
                on_select(&bookmark);
                Ok(Navigation::Selected(bookmark))
            }
            Err(notice) => Ok(self.report(notice)),
        }
    }

    fn report(&self, notice: NavigationNotice) -> Navigation {
        self.notifier.notify(&notice);
        Navigation::Nothing(notice)
    }
}
