// src/cli/display.rs

use crate::application::notifier::{Notifier, ToastKind};
use crate::application::views::card::BookmarkCard;
use crate::application::views::presentation::{ListPresentation, EMPTY_MESSAGE};
use crate::domain::bookmark::Bookmark;
use crate::domain::user::CurrentUser;
use crate::util::helper::truncate;
use crossterm::style::{StyledContent, Stylize};
use serde::Serialize;
use std::fmt::Display;
use std::io::{self, Write};

const TITLE_WIDTH: usize = 60;

/// Terminal styling that can be switched off
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub color: bool,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint<D: Display>(&self, text: D, style: impl FnOnce(D) -> StyledContent<D>) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Toasts as single lines on stderr
#[derive(Debug, Clone, Copy)]
pub struct ConsoleNotifier {
    palette: Palette,
}

impl ConsoleNotifier {
    pub fn new(color: bool) -> Self {
        Self {
            palette: Palette::new(color),
        }
    }

    pub fn format(&self, kind: ToastKind, message: &str) -> String {
        match kind {
            ToastKind::Success => self.palette.paint(message, |m| m.green()),
            ToastKind::Error => self.palette.paint(message, |m| m.red()),
            ToastKind::Info => self.palette.paint(message, |m| m.dark_grey()),
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: ToastKind, message: &str) {
        eprintln!("{}", self.format(kind, message));
    }
}

pub fn greeting(user: &CurrentUser) -> String {
    format!("Hi {}!", user.greeting_name())
}

fn render_card(out: &mut dyn Write, card: &BookmarkCard, palette: Palette) -> io::Result<()> {
    let id = format!("[{}]", card.bookmark.id);
    writeln!(
        out,
        "{} {}  {}",
        palette.paint(id.as_str(), |s| s.yellow()),
        palette.paint(truncate(&card.bookmark.title, TITLE_WIDTH).as_str(), |s| s.bold()),
        palette.paint(card.added_label().as_str(), |s| s.dark_grey()),
    )?;
    writeln!(out, "    {}", palette.paint(card.bookmark.url.as_str(), |s| s.cyan()))
}

/// Render a list view: greeting, count and one entry per bookmark
pub fn render_list(
    out: &mut dyn Write,
    user: &CurrentUser,
    presentation: &ListPresentation,
    palette: Palette,
) -> io::Result<()> {
    writeln!(out, "{}", palette.paint(greeting(user).as_str(), |s| s.bold()))?;
    match presentation {
        ListPresentation::Loading => writeln!(out, "Loading bookmarks..."),
        ListPresentation::Empty => writeln!(out, "{}", EMPTY_MESSAGE),
        ListPresentation::Failed(msg) => writeln!(
            out,
            "{}",
            palette.paint(format!("Could not load bookmarks: {}", msg).as_str(), |s| s.red())
        ),
        ListPresentation::Items { count_label, cards } => {
            writeln!(out, "Your bookmarks ({})", count_label)?;
            for card in cards {
                render_card(out, card, palette)?;
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct JsonBookmark<'a> {
    #[serde(flatten)]
    bookmark: &'a Bookmark,
    favicon_url: Option<&'a str>,
}

/// Cards as a JSON array, favicon URL included
pub fn cards_to_json(cards: &[BookmarkCard]) -> serde_json::Result<String> {
    let rows: Vec<JsonBookmark> = cards
        .iter()
        .map(|c| JsonBookmark {
            bookmark: &c.bookmark,
            favicon_url: c.favicon_url.as_deref(),
        })
        .collect();
    serde_json::to_string_pretty(&rows)
}
