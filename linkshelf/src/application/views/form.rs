// src/application/views/form.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, instrument};

use crate::application::notifier::Notifier;
use crate::application::services::bookmark_service::BookmarkService;
use crate::domain::bookmark::{NewBookmark, UserId};
use crate::domain::error::ValidationError;

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields";
pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL";
pub const ADDED_MESSAGE: &str = "Bookmark added successfully!";
pub const ADD_FAILED_MESSAGE: &str = "Failed to add bookmark";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Store accepted the request; the new row arrives as a change
    Submitted,
    Rejected(ValidationError),
    /// A submission is already in flight
    Busy,
    Failed,
}

#[derive(Debug, Default)]
struct FormInput {
    title: String,
    url: String,
}

/// Input form for new bookmarks
#[derive(Debug)]
pub struct BookmarkForm {
    service: Arc<dyn BookmarkService>,
    notifier: Arc<dyn Notifier>,
    user_id: UserId,
    input: Mutex<FormInput>,
    busy: AtomicBool,
}

/// Clears the busy flag however the submission ends
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl BookmarkForm {
    pub fn new(service: Arc<dyn BookmarkService>, notifier: Arc<dyn Notifier>, user_id: UserId) -> Self {
        Self {
            service,
            notifier,
            user_id,
            input: Mutex::new(FormInput::default()),
            busy: AtomicBool::new(false),
        }
    }

    fn input(&self) -> MutexGuard<'_, FormInput> {
        match self.input.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.input().title = title.into();
    }

    pub fn set_url(&self, url: impl Into<String>) {
        self.input().url = url.into();
    }

    pub fn title(&self) -> String {
        self.input().title.clone()
    }

    pub fn url(&self) -> String {
        self.input().url.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn reject(&self, err: ValidationError) -> SubmitOutcome {
        let message = match err {
            ValidationError::MalformedUrl { .. } => INVALID_URL_MESSAGE,
            _ => MISSING_FIELDS_MESSAGE,
        };
        debug!("Rejected input: {}", err);
        self.notifier.error(message);
        SubmitOutcome::Rejected(err)
    }

    #[instrument(skip(self), fields(user_id = %self.user_id), level = "debug")]
    pub fn submit(&self) -> SubmitOutcome {
        let (title, url) = {
            let input = self.input();
            (input.title.clone(), input.url.clone())
        };
        if let Err(err) = NewBookmark::new(self.user_id.clone(), &title, &url) {
            return self.reject(err);
        }

        if self.busy.swap(true, Ordering::SeqCst) {
            debug!("Submission already in progress");
            return SubmitOutcome::Busy;
        }
        let _guard = BusyGuard(&self.busy);

        match self.service.create_bookmark(&self.user_id, &title, &url) {
            Ok(()) => {
                *self.input() = FormInput::default();
                self.notifier.success(ADDED_MESSAGE);
                SubmitOutcome::Submitted
            }
            Err(e) => {
                if let Some(err) = e.validation_error() {
                    return self.reject(err.clone());
                }
                error!("Error adding bookmark: {}", e);
                self.notifier.error(ADD_FAILED_MESSAGE);
                SubmitOutcome::Failed
            }
        }
    }
}
