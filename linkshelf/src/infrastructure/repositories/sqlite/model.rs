// src/infrastructure/repositories/sqlite/model.rs
use chrono::{DateTime, SecondsFormat, Utc};
use diesel::{Insertable, Queryable, Selectable};
use std::fmt;

use super::error::{SqliteRepositoryError, SqliteResult};
use crate::domain::bookmark::{Bookmark, BookmarkId, NewBookmark, UserId};

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::bookmarks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbBookmark {
    pub id: i32,
    pub user_id: String,
    pub title: String,
    pub url: String,
    pub created_at: String,
}

impl TryFrom<DbBookmark> for Bookmark {
    type Error = SqliteRepositoryError;

    fn try_from(row: DbBookmark) -> SqliteResult<Self> {
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| {
                SqliteRepositoryError::ConversionError(format!(
                    "Invalid created_at '{}' for ID {}: {}",
                    row.created_at, row.id, e
                ))
            })?
            .with_timezone(&Utc);

        Ok(Bookmark {
            id: BookmarkId::from(row.id),
            user_id: UserId::from(row.user_id),
            title: row.title,
            url: row.url,
            created_at,
        })
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::bookmarks)]
pub struct NewDbBookmark {
    pub user_id: String,
    pub title: String,
    pub url: String,
    pub created_at: String,
}

impl NewDbBookmark {
    pub fn from_new(bookmark: &NewBookmark, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id: bookmark.user_id.to_string(),
            title: bookmark.title.clone(),
            url: bookmark.url.clone(),
            created_at: format_timestamp(created_at),
        }
    }
}

impl fmt::Display for NewDbBookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "user_id: {}, title: {}, url: {}, created_at: {}",
            self.user_id, self.title, self.url, self.created_at
        )
    }
}

/// One entry of the change log written by the table triggers
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::bookmark_changes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbChange {
    pub seq: i64,
    pub user_id: String,
    pub payload: String,
}

/// Fixed-width RFC3339 so that text order equals time order
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
