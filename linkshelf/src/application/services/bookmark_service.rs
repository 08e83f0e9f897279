// src/application/services/bookmark_service.rs
use crate::application::error::ApplicationResult;
use crate::domain::bookmark::{Bookmark, BookmarkId, UserId};
use crate::domain::subscription::{ChangeHandler, Subscription};
use std::fmt::Debug;

/// Bookmark operations as seen by the views.
///
/// Writes report only whether the request was accepted; their effect arrives
/// later as a change notification on any live subscription.
pub trait BookmarkService: Send + Sync + Debug {
    /// All bookmarks of `user_id`, newest first
    fn list_bookmarks(&self, user_id: &UserId) -> ApplicationResult<Vec<Bookmark>>;

    /// Validate and submit a new bookmark. Invalid input never reaches the store.
    fn create_bookmark(&self, user_id: &UserId, title: &str, url: &str) -> ApplicationResult<()>;

    /// Request deletion of `id` on behalf of `user_id`. Rows of other owners
    /// are never touched.
    fn delete_bookmark(&self, user_id: &UserId, id: &BookmarkId) -> ApplicationResult<()>;

    fn subscribe_to_changes(
        &self,
        user_id: &UserId,
        on_change: ChangeHandler,
    ) -> ApplicationResult<Subscription>;

    /// Deliver changes the store has recorded since the last call
    fn pump_changes(&self) -> ApplicationResult<usize>;
}
