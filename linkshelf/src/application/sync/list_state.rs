// src/application/sync/list_state.rs
use crate::domain::bookmark::{Bookmark, BookmarkId};
use crate::domain::change::ChangeNotification;
use std::fmt;
use tracing::{debug, trace};

/// A user's bookmarks, newest first, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkList {
    items: Vec<Bookmark>,
}

impl BookmarkList {
    pub fn new(mut items: Vec<Bookmark>) -> Self {
        items.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        Self { items }
    }

    pub fn items(&self) -> &[Bookmark] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &BookmarkId) -> bool {
        self.items.iter().any(|b| &b.id == id)
    }

    pub fn get(&self, id: &BookmarkId) -> Option<&Bookmark> {
        self.items.iter().find(|b| &b.id == id)
    }

    /// Apply one change. Returns true if the list was modified.
    pub fn apply(&mut self, change: ChangeNotification) -> bool {
        match change {
            ChangeNotification::Created(bookmark) => {
                if self.contains(&bookmark.id) {
                    trace!("Ignoring duplicate create for {}", bookmark.id);
                    return false;
                }
                // Head for anything newer than the current head; an older
                // row still lands at its place in the ordering.
                let pos = self
                    .items
                    .iter()
                    .position(|existing| bookmark.is_newer_than(existing))
                    .unwrap_or(self.items.len());
                self.items.insert(pos, bookmark);
                true
            }
            ChangeNotification::Updated(bookmark) => {
                match self.items.iter_mut().find(|b| b.id == bookmark.id) {
                    Some(slot) => {
                        *slot = bookmark;
                        true
                    }
                    None => {
                        trace!("Ignoring update for unknown {}", bookmark.id);
                        false
                    }
                }
            }
            ChangeNotification::Deleted(id) => {
                let before = self.items.len();
                self.items.retain(|b| b.id != id);
                before != self.items.len()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPhase {
    /// Not attached to a view; changes are ignored
    Inactive,
    /// Waiting for the initial fetch; changes are buffered
    Loading,
    Ready,
    /// Initial fetch failed
    Failed(String),
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncPhase::Inactive => f.write_str("inactive"),
            SyncPhase::Loading => f.write_str("loading"),
            SyncPhase::Ready => f.write_str("ready"),
            SyncPhase::Failed(msg) => write!(f, "failed: {}", msg),
        }
    }
}

/// Synchronization state of one list view.
///
/// `begin_loading` -> `seed` | `fail`, then `receive` for every change until
/// `deactivate`. Changes received while loading are replayed in arrival order
/// once the seed is in.
#[derive(Debug, Clone)]
pub struct ListState {
    phase: SyncPhase,
    list: BookmarkList,
    pending: Vec<ChangeNotification>,
}

impl Default for ListState {
    fn default() -> Self {
        Self::new()
    }
}

impl ListState {
    pub fn new() -> Self {
        Self {
            phase: SyncPhase::Inactive,
            list: BookmarkList::default(),
            pending: Vec::new(),
        }
    }

    pub fn phase(&self) -> &SyncPhase {
        &self.phase
    }

    pub fn list(&self) -> &BookmarkList {
        &self.list
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn begin_loading(&mut self) {
        self.phase = SyncPhase::Loading;
        self.list = BookmarkList::default();
        self.pending.clear();
    }

    /// Install the fetched rows and replay what arrived meanwhile
    pub fn seed(&mut self, rows: Vec<Bookmark>) {
        if self.phase != SyncPhase::Loading {
            debug!("Discarding fetch result in phase {}", self.phase);
            return;
        }
        self.list = BookmarkList::new(rows);
        self.phase = SyncPhase::Ready;

        let buffered = std::mem::take(&mut self.pending);
        if !buffered.is_empty() {
            debug!("Replaying {} buffered changes", buffered.len());
        }
        for change in buffered {
            self.list.apply(change);
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        if self.phase != SyncPhase::Loading {
            return;
        }
        self.phase = SyncPhase::Failed(message.into());
        self.pending.clear();
    }

    /// Returns true if the visible list changed
    pub fn receive(&mut self, change: ChangeNotification) -> bool {
        match self.phase {
            SyncPhase::Loading => {
                trace!("Buffering {} while loading", change);
                self.pending.push(change);
                false
            }
            SyncPhase::Ready => self.list.apply(change),
            SyncPhase::Inactive | SyncPhase::Failed(_) => {
                trace!("Dropping {} in phase {}", change, self.phase);
                false
            }
        }
    }

    pub fn deactivate(&mut self) {
        self.phase = SyncPhase::Inactive;
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bookmark::{BookmarkBuilder, UserId};
    use chrono::{Duration, TimeZone, Utc};

    fn bookmark(id: &str, minutes: i64) -> Bookmark {
        BookmarkBuilder::default()
            .id(id)
            .user_id(UserId::from("alice"))
            .title(format!("title {}", id))
            .url(format!("https://example.com/{}", id))
            .created_at(Utc.with_ymd_and_hms(2025, 1, 5, 9, 0, 0).unwrap() + Duration::minutes(minutes))
            .build()
            .unwrap()
    }

    fn ids(list: &BookmarkList) -> Vec<&str> {
        list.items().iter().map(|b| b.id.as_str()).collect()
    }

    fn ready(rows: Vec<Bookmark>) -> ListState {
        let mut state = ListState::new();
        state.begin_loading();
        state.seed(rows);
        state
    }

    #[test]
    fn given_unsorted_rows_when_new_then_newest_first() {
        let list = BookmarkList::new(vec![bookmark("1", 0), bookmark("3", 2), bookmark("2", 1)]);
        assert_eq!(ids(&list), vec!["3", "2", "1"]);
    }

    #[test]
    fn given_ready_list_when_created_then_inserted_at_head() {
        let mut state = ready(vec![bookmark("1", 0)]);
        assert!(state.receive(ChangeNotification::Created(bookmark("2", 5))));
        assert_eq!(ids(state.list()), vec!["2", "1"]);
    }

    #[test]
    fn given_existing_id_when_created_again_then_ignored() {
        let mut state = ready(vec![bookmark("1", 0)]);
        let dup = bookmark("1", 0);
        assert!(!state.receive(ChangeNotification::Created(dup.clone())));
        assert!(!state.receive(ChangeNotification::Created(dup)));
        assert_eq!(state.list().len(), 1);
    }

    #[test]
    fn given_absent_id_when_deleted_then_unchanged() {
        let mut state = ready(vec![bookmark("2", 1), bookmark("1", 0)]);
        let before = state.list().clone();
        assert!(!state.receive(ChangeNotification::Deleted(BookmarkId::from("9"))));
        assert_eq!(state.list(), &before);
    }

    #[test]
    fn given_present_id_when_deleted_then_exactly_that_removed() {
        let mut state = ready(vec![bookmark("3", 2), bookmark("2", 1), bookmark("1", 0)]);
        assert!(state.receive(ChangeNotification::Deleted(BookmarkId::from("2"))));
        assert_eq!(ids(state.list()), vec!["3", "1"]);
    }

    #[test]
    fn given_updated_when_present_then_replaced_in_place() {
        let mut state = ready(vec![bookmark("2", 1), bookmark("1", 0)]);
        let mut changed = bookmark("1", 0);
        changed.title = "renamed".to_string();

        assert!(state.receive(ChangeNotification::Updated(changed)));
        assert_eq!(ids(state.list()), vec!["2", "1"]);
        assert_eq!(state.list().items()[1].title, "renamed");

        assert!(!state.receive(ChangeNotification::Updated(bookmark("7", 9))));
        assert_eq!(state.list().len(), 2);
    }

    #[test]
    fn given_mixed_batch_when_applied_then_order_preserved() {
        let mut state = ready(vec![bookmark("2", 1), bookmark("1", 0)]);
        let batch = vec![
            ChangeNotification::Created(bookmark("3", 2)),
            ChangeNotification::Deleted(BookmarkId::from("2")),
            ChangeNotification::Created(bookmark("4", 3)),
            ChangeNotification::Created(bookmark("3", 2)),
            ChangeNotification::Deleted(BookmarkId::from("42")),
            ChangeNotification::Created(bookmark("5", 4)),
        ];
        for change in batch {
            state.receive(change);
        }

        assert_eq!(ids(state.list()), vec!["5", "4", "3", "1"]);
        let items = state.list().items();
        assert!(items.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn given_loading_when_changes_arrive_then_buffered_and_replayed_after_seed() {
        let mut state = ListState::new();
        state.begin_loading();

        assert!(!state.receive(ChangeNotification::Created(bookmark("2", 1))));
        assert!(!state.receive(ChangeNotification::Deleted(BookmarkId::from("1"))));
        assert_eq!(state.pending(), 2);
        assert!(state.list().is_empty());

        // fetch already contains "2", and "1" was deleted after the snapshot
        state.seed(vec![bookmark("2", 1), bookmark("1", 0)]);

        assert_eq!(state.phase(), &SyncPhase::Ready);
        assert_eq!(ids(state.list()), vec!["2"]);
        assert_eq!(state.pending(), 0);
    }

    #[test]
    fn given_loading_when_fetch_fails_then_failed_and_changes_dropped() {
        let mut state = ListState::new();
        state.begin_loading();
        state.receive(ChangeNotification::Created(bookmark("1", 0)));

        state.fail("Store error: offline");

        assert_eq!(state.phase(), &SyncPhase::Failed("Store error: offline".to_string()));
        assert_eq!(state.pending(), 0);
        assert!(!state.receive(ChangeNotification::Created(bookmark("2", 1))));
        assert!(state.list().is_empty());
    }

    #[test]
    fn given_deactivated_when_changes_arrive_then_ignored() {
        let mut state = ready(vec![bookmark("1", 0)]);
        state.deactivate();

        assert!(!state.receive(ChangeNotification::Deleted(BookmarkId::from("1"))));
        assert_eq!(state.list().len(), 1);
        assert_eq!(state.phase(), &SyncPhase::Inactive);
    }

    #[test]
    fn given_not_loading_when_seeded_then_discarded() {
        let mut state = ListState::new();
        state.seed(vec![bookmark("1", 0)]);
        assert_eq!(state.phase(), &SyncPhase::Inactive);
        assert!(state.list().is_empty());
    }
}
