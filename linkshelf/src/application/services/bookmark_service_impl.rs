// src/application/services/bookmark_service_impl.rs
use std::sync::Arc;

use crate::application::error::ApplicationResult;
use crate::application::services::bookmark_service::BookmarkService;
use crate::domain::bookmark::{Bookmark, BookmarkId, NewBookmark, UserId};
use crate::domain::repositories::repository::BookmarkRepository;
use crate::domain::subscription::{ChangeHandler, Subscription};
use tracing::{debug, error, instrument};

#[derive(Debug)]
pub struct BookmarkServiceImpl<R: BookmarkRepository> {
    repository: Arc<R>,
}

impl<R: BookmarkRepository> BookmarkServiceImpl<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R: BookmarkRepository> BookmarkService for BookmarkServiceImpl<R> {
    #[instrument(skip(self), level = "debug")]
    fn list_bookmarks(&self, user_id: &UserId) -> ApplicationResult<Vec<Bookmark>> {
        let bookmarks = self.repository.fetch_by_owner(user_id).map_err(|e| {
            error!("Failed to fetch bookmarks: {}", e);
            e.context("list bookmarks")
        })?;
        debug!("Fetched {} bookmarks", bookmarks.len());
        Ok(bookmarks)
    }

    #[instrument(skip(self), level = "debug")]
    fn create_bookmark(&self, user_id: &UserId, title: &str, url: &str) -> ApplicationResult<()> {
        let bookmark = NewBookmark::new(user_id.clone(), title, url)?;

        self.repository.insert(&bookmark).map_err(|e| {
            error!("Failed to add bookmark: {}", e);
            e.context("create bookmark")
        })?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn delete_bookmark(&self, user_id: &UserId, id: &BookmarkId) -> ApplicationResult<()> {
        self.repository.delete(user_id, id).map_err(|e| {
            error!("Failed to delete bookmark: {}", e);
            e.context("delete bookmark")
        })?;
        Ok(())
    }

    #[instrument(skip(self, on_change), level = "debug")]
    fn subscribe_to_changes(
        &self,
        user_id: &UserId,
        on_change: ChangeHandler,
    ) -> ApplicationResult<Subscription> {
        let subscription = self.repository.subscribe(user_id, on_change).map_err(|e| {
            error!("Failed to subscribe to changes: {}", e);
            e.context("subscribe to changes")
        })?;
        Ok(subscription)
    }

    fn pump_changes(&self) -> ApplicationResult<usize> {
        Ok(self
            .repository
            .pump_changes()
            .map_err(|e| e.context("poll changes"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::change::ChangeNotification;
    use crate::domain::error::ValidationError;
    use crate::infrastructure::repositories::memory::InMemoryBookmarkRepository;
    use rstest::rstest;
    use std::sync::Mutex;

    fn service() -> (Arc<InMemoryBookmarkRepository>, BookmarkServiceImpl<InMemoryBookmarkRepository>) {
        let repo = Arc::new(InMemoryBookmarkRepository::new());
        (repo.clone(), BookmarkServiceImpl::new(repo))
    }

    #[rstest]
    #[case("", "https://example.com", ValidationError::EmptyTitle)]
    #[case("   ", "https://example.com", ValidationError::EmptyTitle)]
    #[case("Example", "", ValidationError::EmptyUrl)]
    fn given_blank_input_when_create_then_rejected_without_store_call(
        #[case] title: &str,
        #[case] url: &str,
        #[case] expected: ValidationError,
    ) {
        let (repo, service) = service();

        let err = service
            .create_bookmark(&UserId::from("alice"), title, url)
            .unwrap_err();

        assert_eq!(err.validation_error(), Some(&expected));
        assert_eq!(repo.insert_count(), 0);
    }

    #[test]
    fn given_malformed_url_when_create_then_validation_error_and_no_insert() {
        let (repo, service) = service();

        let err = service
            .create_bookmark(&UserId::from("alice"), "Broken", "not a url")
            .unwrap_err();

        assert!(matches!(
            err.validation_error(),
            Some(ValidationError::MalformedUrl { .. })
        ));
        assert_eq!(repo.insert_count(), 0);
        assert_eq!(repo.pending_changes(), 0);
    }

    #[test]
    fn given_valid_input_when_create_then_inserted_trimmed() {
        let (repo, service) = service();

        service
            .create_bookmark(&UserId::from("alice"), " Rust ", " https://www.rust-lang.org ")
            .unwrap();

        let rows = repo.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Rust");
        assert_eq!(rows[0].url, "https://www.rust-lang.org");
    }

    #[test]
    fn given_failing_store_when_list_then_store_error_with_context() {
        let (repo, service) = service();
        repo.set_failing(true);

        let err = service.list_bookmarks(&UserId::from("alice")).unwrap_err();

        assert!(!err.is_validation());
        assert!(err.to_string().contains("list bookmarks"));
    }

    #[test]
    fn given_subscription_when_delete_and_pump_then_deleted_notification() {
        let (repo, service) = service();
        service
            .create_bookmark(&UserId::from("alice"), "Rust", "https://www.rust-lang.org")
            .unwrap();
        service.pump_changes().unwrap();
        let id = repo.rows()[0].id.clone();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = service
            .subscribe_to_changes(
                &UserId::from("alice"),
                Arc::new(move |c| sink.lock().unwrap().push(c)),
            )
            .unwrap();

        service.delete_bookmark(&UserId::from("alice"), &id).unwrap();
        assert_eq!(service.pump_changes().unwrap(), 1);
        assert_eq!(*seen.lock().unwrap(), vec![ChangeNotification::Deleted(id)]);
    }

    #[test]
    fn given_bookmark_of_other_user_when_delete_then_kept() {
        let (repo, service) = service();
        service
            .create_bookmark(&UserId::from("bob"), "Bob's", "https://bob.example.org")
            .unwrap();
        service.pump_changes().unwrap();
        let bob_id = repo.rows()[0].id.clone();

        service.delete_bookmark(&UserId::from("alice"), &bob_id).unwrap();

        assert_eq!(service.list_bookmarks(&UserId::from("bob")).unwrap().len(), 1);
        assert_eq!(service.pump_changes().unwrap(), 0);
    }
}
