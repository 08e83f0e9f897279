use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::notifier::Notifier;
use crate::application::services::bookmark_service::BookmarkService;
use crate::application::sync::session::ListSession;
use crate::application::views::form::BookmarkForm;
use crate::application::BookmarkServiceImpl;
use crate::config::Settings;
use crate::domain::repositories::repository::BookmarkRepository;
use crate::domain::user::CurrentUser;
use crate::infrastructure::favicon::FaviconService;
use crate::infrastructure::repositories::sqlite::repository::SqliteBookmarkRepository;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Production service container, the single place services are wired up
pub struct ServiceContainer {
    pub bookmark_service: Arc<dyn BookmarkService>,
    pub favicon_service: FaviconService,
    pub current_user: CurrentUser,
}

impl ServiceContainer {
    /// Open the configured database; it must have been created with `create-db`
    pub fn new(config: &Settings) -> ApplicationResult<Self> {
        let repository = Self::create_repository(&config.db_url)?;
        Self::with_repository(repository, config)
    }

    /// Wire the services on top of any store
    pub fn with_repository<R: BookmarkRepository + 'static>(
        repository: Arc<R>,
        config: &Settings,
    ) -> ApplicationResult<Self> {
        let current_user = config.current_user()?;
        debug!("Services created for user {}", current_user.id);

        Ok(Self {
            bookmark_service: Arc::new(BookmarkServiceImpl::new(repository)),
            favicon_service: config.favicon_service(),
            current_user,
        })
    }

    fn create_repository(db_url: &str) -> ApplicationResult<Arc<SqliteBookmarkRepository>> {
        if !Path::new(db_url).exists() {
            return Err(ApplicationError::Other(format!(
                "Database not found at '{}'. Create it with 'linkshelf create-db' or set LINKSHELF_DB_URL",
                db_url
            )));
        }

        let repository = SqliteBookmarkRepository::from_url(db_url).map_err(|e| {
            ApplicationError::Other(format!("Failed to open bookmark database: {}", e))
        })?;
        Ok(Arc::new(repository))
    }

    /// A list view of the current user's bookmarks, not yet activated
    pub fn list_session(&self, notifier: Arc<dyn Notifier>) -> ListSession {
        ListSession::new(
            self.bookmark_service.clone(),
            notifier,
            self.current_user.id.clone(),
        )
    }

    pub fn bookmark_form(&self, notifier: Arc<dyn Notifier>) -> BookmarkForm {
        BookmarkForm::new(
            self.bookmark_service.clone(),
            notifier,
            self.current_user.id.clone(),
        )
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("bookmark_service", &"Arc<dyn BookmarkService>")
            .field("favicon_service", &self.favicon_service)
            .field("current_user", &self.current_user.id)
            .finish()
    }
}
