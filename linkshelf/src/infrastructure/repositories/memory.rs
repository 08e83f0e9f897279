// linkshelf/src/infrastructure/repositories/memory.rs
use crate::domain::bookmark::{Bookmark, BookmarkId, NewBookmark, UserId};
use crate::domain::change::ChangePayload;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::repositories::repository::BookmarkRepository;
use crate::domain::subscription::{ChangeHandler, Subscription};
use crate::infrastructure::feed::ChangeFeed;
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument};

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<Bookmark>,
    next_id: u64,
    seq: i64,
    last_created_at: Option<DateTime<Utc>>,
    /// Changes recorded but not yet delivered: (seq, owner, raw payload)
    outbox: VecDeque<(i64, UserId, String)>,
}

/// Store kept in memory.
///
/// Writes are recorded in an outbox and reach subscribers only on
/// `pump_changes`, the way a remote feed echoes them after the request
/// returned. Counters and failure injection make it usable as a test fake.
#[derive(Debug, Default)]
pub struct InMemoryBookmarkRepository {
    state: Mutex<MemoryState>,
    feed: ChangeFeed,
    failing: AtomicBool,
    fetches: AtomicUsize,
    inserts: AtomicUsize,
    deletes: AtomicUsize,
}

impl InMemoryBookmarkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed rows without recording changes
    pub fn with_rows(rows: Vec<Bookmark>) -> Self {
        let repo = Self::new();
        {
            let mut state = repo.state();
            state.next_id = rows.len() as u64;
            state.last_created_at = rows.iter().map(|b| b.created_at).max();
            state.rows = rows;
        }
        repo
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn check_available(&self, operation: &str) -> DomainResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::Store(format!(
                "{}: store unavailable",
                operation
            )));
        }
        Ok(())
    }

    /// Make every following request fail with a store error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn pending_changes(&self) -> usize {
        self.state().outbox.len()
    }

    pub fn rows(&self) -> Vec<Bookmark> {
        self.state().rows.clone()
    }

    /// Record an arbitrary payload, e.g. a change made by another writer
    pub fn emit_raw(&self, user_id: &UserId, raw: impl Into<String>) {
        let mut state = self.state();
        state.seq += 1;
        let seq = state.seq;
        state.outbox.push_back((seq, user_id.clone(), raw.into()));
    }

    /// Replace a row in place and record an UPDATE, as an out-of-band writer would
    pub fn update_row(&self, bookmark: Bookmark) -> DomainResult<()> {
        let mut state = self.state();
        let slot = state
            .rows
            .iter_mut()
            .find(|b| b.id == bookmark.id)
            .ok_or_else(|| DomainError::BookmarkNotFound(bookmark.id.to_string()))?;
        *slot = bookmark.clone();
        state.seq += 1;
        let seq = state.seq;
        state.outbox.push_back((
            seq,
            bookmark.user_id.clone(),
            ChangePayload::updated(&bookmark).to_json(),
        ));
        Ok(())
    }

    fn next_timestamp(state: &mut MemoryState) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = state.last_created_at {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        state.last_created_at = Some(now);
        now
    }
}

impl BookmarkRepository for InMemoryBookmarkRepository {
    #[instrument(skip(self), level = "debug")]
    fn fetch_by_owner(&self, user_id: &UserId) -> DomainResult<Vec<Bookmark>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check_available("fetch bookmarks")?;

        let mut rows: Vec<Bookmark> = self
            .state()
            .rows
            .iter()
            .filter(|b| &b.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        Ok(rows)
    }

    #[instrument(skip(self), level = "debug")]
    fn insert(&self, bookmark: &NewBookmark) -> DomainResult<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.check_available("insert bookmark")?;

        let mut state = self.state();
        state.next_id += 1;
        let row = Bookmark {
            id: BookmarkId::from(state.next_id.to_string()),
            user_id: bookmark.user_id.clone(),
            title: bookmark.title.clone(),
            url: bookmark.url.clone(),
            created_at: Self::next_timestamp(&mut state),
        };
        debug!("Stored {}", row);

        state.seq += 1;
        let seq = state.seq;
        state
            .outbox
            .push_back((seq, row.user_id.clone(), ChangePayload::inserted(&row).to_json()));
        state.rows.push(row);
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn delete(&self, user_id: &UserId, id: &BookmarkId) -> DomainResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check_available("delete bookmark")?;

        let mut state = self.state();
        let Some(pos) = state
            .rows
            .iter()
            .position(|b| &b.id == id && &b.user_id == user_id)
        else {
            debug!("Nothing to delete for id {} of {}", id, user_id);
            return Ok(());
        };
        let row = state.rows.remove(pos);

        state.seq += 1;
        let seq = state.seq;
        state
            .outbox
            .push_back((seq, row.user_id.clone(), ChangePayload::deleted(&row.id).to_json()));
        Ok(())
    }

    #[instrument(skip(self, on_change), level = "debug")]
    fn subscribe(&self, user_id: &UserId, on_change: ChangeHandler) -> DomainResult<Subscription> {
        self.check_available("subscribe to changes")?;
        let since = self.state().seq;
        Ok(self.feed.subscribe(user_id, since, on_change))
    }

    fn pump_changes(&self) -> DomainResult<usize> {
        // Drain first: handlers may call back into the repository.
        let pending: Vec<(i64, UserId, String)> = self.state().outbox.drain(..).collect();
        let count = pending.len();
        for (seq, user_id, raw) in pending {
            self.feed.dispatch(seq, &user_id, &raw);
        }
        Ok(count)
    }
}
