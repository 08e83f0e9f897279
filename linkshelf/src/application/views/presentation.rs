// src/application/views/presentation.rs
use crate::application::sync::list_state::{ListState, SyncPhase};
use crate::application::views::card::BookmarkCard;
use crate::infrastructure::favicon::FaviconService;

pub const EMPTY_MESSAGE: &str = "No bookmarks yet. Add your first bookmark above!";

/// What a list view shows for the current synchronization state
#[derive(Debug)]
pub enum ListPresentation {
    Loading,
    Empty,
    Failed(String),
    Items {
        count_label: String,
        cards: Vec<BookmarkCard>,
    },
}

impl ListPresentation {
    pub fn from_state(state: &ListState, favicons: &FaviconService) -> Self {
        match state.phase() {
            SyncPhase::Inactive | SyncPhase::Loading => ListPresentation::Loading,
            SyncPhase::Failed(msg) => ListPresentation::Failed(msg.clone()),
            SyncPhase::Ready if state.list().is_empty() => ListPresentation::Empty,
            SyncPhase::Ready => ListPresentation::Items {
                count_label: count_label(state.list().len()),
                cards: state
                    .list()
                    .items()
                    .iter()
                    .map(|b| BookmarkCard::new(b.clone(), favicons))
                    .collect(),
            },
        }
    }
}

pub fn count_label(count: usize) -> String {
    if count == 1 {
        "1 bookmark".to_string()
    } else {
        format!("{} bookmarks", count)
    }
}
