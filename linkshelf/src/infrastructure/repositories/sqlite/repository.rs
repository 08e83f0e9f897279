// src/infrastructure/repositories/sqlite/repository

use chrono::{DateTime, Duration, Utc};
use diesel::dsl::max;
use diesel::prelude::*;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, instrument};

use super::connection::{ConnectionPool, PooledConnection};
use super::error::{SqliteRepositoryError, SqliteResult};
use super::model::{DbBookmark, DbChange, NewDbBookmark};
use super::schema::{bookmark_changes, bookmarks};
use crate::domain::bookmark::{Bookmark, BookmarkId, NewBookmark, UserId};
use crate::domain::error::{DomainResult, ValidationError};
use crate::domain::repositories::repository::BookmarkRepository;
use crate::domain::subscription::{ChangeHandler, Subscription};
use crate::infrastructure::feed::ChangeFeed;

/// Bookmark store on a SQLite file.
///
/// Table triggers append every committed change to `bookmark_changes`;
/// `pump_changes` reads entries past the last seen sequence number and hands
/// them to the in-process feed. Writes from other processes on the same file
/// reach subscribers the same way.
#[derive(Debug)]
pub struct SqliteBookmarkRepository {
    pool: ConnectionPool,
    feed: ChangeFeed,
    /// Highest change sequence number already dispatched
    cursor: Mutex<i64>,
}

impl SqliteBookmarkRepository {
    /// Create a repository on an initialized pool. History already in the
    /// change log is not replayed.
    pub fn new(pool: ConnectionPool) -> SqliteResult<Self> {
        let repo = Self {
            pool,
            feed: ChangeFeed::new(),
            cursor: Mutex::new(0),
        };
        let head = repo.latest_seq()?;
        *repo.cursor() = head;
        Ok(repo)
    }

    /// Create a new SQLite repository with the provided database URL
    #[instrument(skip_all, level = "debug")]
    pub fn from_url(database_url: &str) -> SqliteResult<Self> {
        let pool = super::connection::init_pool(database_url)?;
        Self::new(pool)
    }

    #[instrument(skip_all, level = "trace")]
    pub fn get_connection(&self) -> SqliteResult<PooledConnection> {
        self.pool
            .get()
            .map_err(|e| SqliteRepositoryError::ConnectionPoolError(e.to_string()))
    }

    fn cursor(&self) -> MutexGuard<'_, i64> {
        match self.cursor.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn latest_seq(&self) -> SqliteResult<i64> {
        let mut conn = self.get_connection()?;
        let head: Option<i64> = bookmark_changes::table
            .select(max(bookmark_changes::seq))
            .first(&mut conn)?;
        Ok(head.unwrap_or(0))
    }

    /// Next creation timestamp for `user_id`, strictly after their newest row
    fn next_timestamp(conn: &mut SqliteConnection, user_id: &str) -> QueryResult<DateTime<Utc>> {
        let newest: Option<String> = bookmarks::table
            .filter(bookmarks::user_id.eq(user_id))
            .select(max(bookmarks::created_at))
            .first(conn)?;

        let now = Utc::now();
        let last = newest
            .and_then(|ts| DateTime::parse_from_rfc3339(&ts).ok())
            .map(|ts| ts.with_timezone(&Utc));
        Ok(match last {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        })
    }
}

impl BookmarkRepository for SqliteBookmarkRepository {
    #[instrument(skip(self), level = "debug")]
    fn fetch_by_owner(&self, user_id: &UserId) -> DomainResult<Vec<Bookmark>> {
        let mut conn = self.get_connection()?;

        let rows = bookmarks::table
            .filter(bookmarks::user_id.eq(user_id.as_str()))
            .order((bookmarks::created_at.desc(), bookmarks::id.desc()))
            .select(DbBookmark::as_select())
            .load::<DbBookmark>(&mut conn)
            .map_err(SqliteRepositoryError::DatabaseError)?;

        let bookmarks = rows
            .into_iter()
            .map(Bookmark::try_from)
            .collect::<SqliteResult<Vec<_>>>()
            .inspect_err(|e| error!("Failed to convert bookmark: {}", e))?;
        Ok(bookmarks)
    }

    #[instrument(skip(self), level = "debug")]
    fn insert(&self, bookmark: &NewBookmark) -> DomainResult<()> {
        let mut conn = self.get_connection()?;

        let id = conn
            .immediate_transaction::<i32, diesel::result::Error, _>(|conn| {
                let created_at = Self::next_timestamp(conn, bookmark.user_id.as_str())?;
                let row = NewDbBookmark::from_new(bookmark, created_at);
                debug!("Inserting bookmark: {}", row);

                diesel::insert_into(bookmarks::table)
                    .values(&row)
                    .returning(bookmarks::id)
                    .get_result::<i32>(conn)
            })
            .map_err(SqliteRepositoryError::DatabaseError)?;

        debug!("Inserted bookmark with id {}", id);
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn delete(&self, user_id: &UserId, id: &BookmarkId) -> DomainResult<()> {
        let row_id: i32 = id
            .as_str()
            .parse()
            .map_err(|_| ValidationError::InvalidId(id.to_string()))?;
        let mut conn = self.get_connection()?;

        let deleted = diesel::delete(
            bookmarks::table
                .filter(bookmarks::id.eq(row_id))
                .filter(bookmarks::user_id.eq(user_id.as_str())),
        )
        .execute(&mut conn)
            .map_err(SqliteRepositoryError::DatabaseError)?;

        if deleted == 0 {
            debug!("Nothing to delete for id {} of {}", id, user_id);
        }
        Ok(())
    }

    #[instrument(skip(self, on_change), level = "debug")]
    fn subscribe(&self, user_id: &UserId, on_change: ChangeHandler) -> DomainResult<Subscription> {
        let since = self.latest_seq()?;
        Ok(self.feed.subscribe(user_id, since, on_change))
    }

    #[instrument(skip(self), level = "trace")]
    fn pump_changes(&self) -> DomainResult<usize> {
        let changes = {
            let mut cursor = self.cursor();
            let mut conn = self.get_connection()?;
            let changes = bookmark_changes::table
                .filter(bookmark_changes::seq.gt(*cursor))
                .order(bookmark_changes::seq.asc())
                .select(DbChange::as_select())
                .load::<DbChange>(&mut conn)
                .map_err(SqliteRepositoryError::DatabaseError)?;
            if let Some(last) = changes.last() {
                *cursor = last.seq;
            }
            changes
        };

        // Dispatch without holding the cursor: handlers may call back in.
        for change in &changes {
            self.feed
                .dispatch(change.seq, &UserId::from(change.user_id.as_str()), &change.payload);
        }
        Ok(changes.len())
    }
}
