// linkshelf/src/domain/repositories/repository.rs

use crate::domain::bookmark::{Bookmark, BookmarkId, NewBookmark, UserId};
use crate::domain::error::DomainResult;
use crate::domain::subscription::{ChangeHandler, Subscription};

/// Boundary to the persistent store holding bookmark rows.
///
/// Implementations never mutate caller-side state: the outcome of `insert` and
/// `delete` becomes visible only through the change feed.
pub trait BookmarkRepository: std::fmt::Debug + Send + Sync {
    /// Rows owned by `user_id`, newest first
    fn fetch_by_owner(&self, user_id: &UserId) -> DomainResult<Vec<Bookmark>>;

    /// Insert one row; id and creation timestamp are assigned by the store
    fn insert(&self, bookmark: &NewBookmark) -> DomainResult<()>;

    /// Delete the row `id` if it is owned by `user_id`. An unknown id, or a
    /// row of another owner, is left alone and is not an error.
    fn delete(&self, user_id: &UserId, id: &BookmarkId) -> DomainResult<()>;

    /// Register `on_change` for every change to rows owned by `user_id`,
    /// delivered in store order while the returned handle is active
    fn subscribe(&self, user_id: &UserId, on_change: ChangeHandler) -> DomainResult<Subscription>;

    /// Move pending changes from the store to the subscribers. Returns the
    /// number of changes dispatched.
    fn pump_changes(&self) -> DomainResult<usize>;
}
