// src/application/views/card.rs
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, instrument};

use crate::application::notifier::Notifier;
use crate::application::services::bookmark_service::BookmarkService;
use crate::domain::bookmark::Bookmark;
use crate::infrastructure::favicon::FaviconService;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this bookmark?";
pub const DELETED_MESSAGE: &str = "Bookmark deleted successfully!";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete bookmark";

/// Asks the user to approve a destructive action
pub trait Confirmer {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Approves everything, e.g. for `--yes`
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConfirm;

impl Confirmer for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// User declined; nothing was sent
    Cancelled,
    /// A delete for this card is already in flight
    InProgress,
    /// Store accepted the request; the row leaves the list on its echo
    Requested,
    Failed,
}

#[derive(Debug)]
pub struct BookmarkCard {
    pub bookmark: Bookmark,
    pub favicon_url: Option<String>,
    deleting: AtomicBool,
}

impl BookmarkCard {
    pub fn new(bookmark: Bookmark, favicons: &FaviconService) -> Self {
        let favicon_url = favicons.for_bookmark(&bookmark);
        Self {
            bookmark,
            favicon_url,
            deleting: AtomicBool::new(false),
        }
    }

    /// e.g. "Added Jan 5, 2025"
    pub fn added_label(&self) -> String {
        format!("Added {}", self.bookmark.created_at.format("%b %-d, %Y"))
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.load(Ordering::SeqCst)
    }

    #[instrument(skip_all, fields(id = %self.bookmark.id), level = "debug")]
    pub fn delete(
        &self,
        service: &dyn BookmarkService,
        confirmer: &dyn Confirmer,
        notifier: &dyn Notifier,
    ) -> DeleteOutcome {
        if self.is_deleting() {
            return DeleteOutcome::InProgress;
        }
        if !confirmer.confirm(DELETE_PROMPT) {
            return DeleteOutcome::Cancelled;
        }
        if self.deleting.swap(true, Ordering::SeqCst) {
            return DeleteOutcome::InProgress;
        }

        match service.delete_bookmark(&self.bookmark.user_id, &self.bookmark.id) {
            // stays in `deleting` until the echo removes the card
            Ok(()) => {
                notifier.success(DELETED_MESSAGE);
                DeleteOutcome::Requested
            }
            Err(e) => {
                error!("Error deleting bookmark: {}", e);
                notifier.error(DELETE_FAILED_MESSAGE);
                self.deleting.store(false, Ordering::SeqCst);
                DeleteOutcome::Failed
            }
        }
    }
}
