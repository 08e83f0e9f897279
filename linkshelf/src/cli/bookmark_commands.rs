// src/cli/bookmark_commands.rs
use std::future::Future;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::application::notifier::Notifier;
use crate::application::sync::list_state::SyncPhase;
use crate::application::sync::session::ListSession;
use crate::application::views::card::{AlwaysConfirm, BookmarkCard, Confirmer, DeleteOutcome};
use crate::application::views::form::SubmitOutcome;
use crate::application::views::presentation::ListPresentation;
use crate::cli::display::{self, cards_to_json, ConsoleNotifier, Palette};
use crate::cli::error::{CliError, CliResult};
use crate::config::Settings;
use crate::domain::bookmark::{Bookmark, BookmarkId};
use crate::domain::change::ChangeNotification;
use crate::infrastructure::di::service_container::ServiceContainer;
use crate::infrastructure::repositories::sqlite::repository::SqliteBookmarkRepository;
use crate::util::helper::{confirm, is_stdout_piped};

/// Asks on the terminal, showing which bookmark is about to go
struct TerminalConfirm<'a> {
    bookmark: &'a Bookmark,
}

impl Confirmer for TerminalConfirm<'_> {
    fn confirm(&self, prompt: &str) -> bool {
        eprintln!("[{}] {}: {}", self.bookmark.id, self.bookmark.title, self.bookmark.url);
        confirm(prompt)
    }
}

#[instrument(skip(settings))]
pub fn create_db(path: Option<String>, settings: &Settings) -> CliResult<()> {
    let path = path
        .map(|p| shellexpand::tilde(&p).to_string())
        .unwrap_or_else(|| settings.db_url.clone());

    if Path::new(&path).exists() {
        return Err(CliError::InvalidInput(format!(
            "Database already exists at: {}. Please choose a different path or delete the existing file.",
            path
        )));
    }

    eprintln!("Creating new database at: {}", path);
    SqliteBookmarkRepository::from_url(&path)?;
    println!("Database created successfully at: {}", path);
    Ok(())
}

#[instrument(skip(services, notifier))]
pub fn add(
    title: &str,
    url: &str,
    services: &ServiceContainer,
    notifier: Arc<dyn Notifier>,
) -> CliResult<()> {
    let form = services.bookmark_form(notifier);
    form.set_title(title);
    form.set_url(url);

    match form.submit() {
        SubmitOutcome::Submitted => Ok(()),
        SubmitOutcome::Rejected(err) => Err(CliError::InvalidInput(err.to_string())),
        SubmitOutcome::Busy => Err(CliError::CommandFailed(
            "A submission is already in progress".to_string(),
        )),
        SubmitOutcome::Failed => Err(CliError::CommandFailed("Failed to add bookmark".to_string())),
    }
}

#[instrument(skip(services, notifier))]
pub fn list(
    is_json: bool,
    services: &ServiceContainer,
    notifier: Arc<dyn Notifier>,
    palette: Palette,
) -> CliResult<()> {
    let mut session = services.list_session(notifier);
    session.activate();
    let presentation = ListPresentation::from_state(session.state(), &services.favicon_service);
    session.deactivate();

    if let ListPresentation::Failed(msg) = &presentation {
        return Err(CliError::CommandFailed(format!("Could not load bookmarks: {}", msg)));
    }

    let mut out = io::stdout().lock();
    if is_json {
        let cards: &[BookmarkCard] = match &presentation {
            ListPresentation::Items { cards, .. } => cards,
            _ => &[],
        };
        writeln!(out, "{}", cards_to_json(cards)?)?;
    } else {
        display::render_list(&mut out, &services.current_user, &presentation, palette)?;
    }
    Ok(())
}

fn own_bookmark(services: &ServiceContainer, id: &BookmarkId) -> CliResult<Bookmark> {
    let bookmarks = services
        .bookmark_service
        .list_bookmarks(&services.current_user.id)?;
    bookmarks
        .into_iter()
        .find(|b| &b.id == id)
        .ok_or_else(|| CliError::InvalidInput(format!("Bookmark with ID {} not found", id)))
}

fn parse_id(raw: &str) -> CliResult<BookmarkId> {
    BookmarkId::new(raw).map_err(|e| CliError::InvalidInput(e.to_string()))
}

#[instrument(skip(services, notifier))]
pub fn delete(
    ids: &[String],
    yes: bool,
    services: &ServiceContainer,
    notifier: Arc<dyn Notifier>,
) -> CliResult<()> {
    let mut failed = 0;
    let mut declined = 0;
    for raw in ids {
        let bookmark = match parse_id(raw).and_then(|id| own_bookmark(services, &id)) {
            Ok(bookmark) => bookmark,
            Err(e) => {
                notifier.error(&e.to_string());
                failed += 1;
                continue;
            }
        };

        let card = BookmarkCard::new(bookmark, &services.favicon_service);
        let outcome = if yes {
            card.delete(services.bookmark_service.as_ref(), &AlwaysConfirm, notifier.as_ref())
        } else {
            let confirmer = TerminalConfirm {
                bookmark: &card.bookmark,
            };
            card.delete(services.bookmark_service.as_ref(), &confirmer, notifier.as_ref())
        };
        debug!("Delete {}: {:?}", raw, outcome);
        match outcome {
            DeleteOutcome::Failed => failed += 1,
            DeleteOutcome::Cancelled => {
                notifier.info("Skipped");
                declined += 1;
            }
            DeleteOutcome::Requested | DeleteOutcome::InProgress => {}
        }
    }

    if failed > 0 {
        return Err(CliError::CommandFailed(format!(
            "{} of {} deletions failed",
            failed,
            ids.len()
        )));
    }
    if declined > 0 && declined == ids.len() {
        return Err(CliError::OperationAborted);
    }
    Ok(())
}

#[instrument(skip(services))]
pub fn open(id: &str, services: &ServiceContainer) -> CliResult<()> {
    let bookmark = own_bookmark(services, &parse_id(id)?)?;
    open::that(&bookmark.url)
        .map_err(|e| CliError::CommandFailed(format!("Failed to open {}: {}", bookmark.url, e)))?;
    eprintln!("Opened: {}", bookmark.url);
    Ok(())
}

pub fn whoami(services: &ServiceContainer, settings: &Settings) -> CliResult<()> {
    let user = &services.current_user;
    let mut out = io::stdout().lock();
    writeln!(out, "{}", display::greeting(user))?;
    writeln!(out, "User:     {} ({})", user.label(), user.id)?;
    if let Some(email) = &user.email {
        writeln!(out, "Email:    {}", email)?;
    }
    if let Some(avatar) = &user.avatar_url {
        writeln!(out, "Avatar:   {}", avatar)?;
    }
    writeln!(out, "Database: {}", settings.db_url)?;
    Ok(())
}

enum WatchEvent {
    Change(Option<ChangeNotification>),
    Tick,
    Interrupt,
}

fn redraw(session: &ListSession, services: &ServiceContainer, palette: Palette) -> CliResult<()> {
    let mut out = io::stdout().lock();
    if !is_stdout_piped() {
        execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    }
    let presentation = ListPresentation::from_state(session.state(), &services.favicon_service);
    display::render_list(&mut out, &services.current_user, &presentation, palette)?;
    if session.phase() == &SyncPhase::Ready {
        writeln!(out, "\nWatching for changes, press Ctrl-C to stop.")?;
    }
    out.flush()?;
    Ok(())
}

/// Keep the list live until `interrupt` resolves or the feed closes
async fn watch_loop<F>(
    services: &ServiceContainer,
    settings: &Settings,
    notifier: Arc<dyn Notifier>,
    palette: Palette,
    interrupt: F,
) -> CliResult<()>
where
    F: Future<Output = io::Result<()>>,
{
    let mut session = services.list_session(notifier);
    session.activate();
    redraw(&session, services, palette)?;
    if let SyncPhase::Failed(msg) = session.phase() {
        return Err(CliError::CommandFailed(format!("Could not load bookmarks: {}", msg)));
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(settings.poll_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Polled across iterations so a signal during redraw is not lost
    tokio::pin!(interrupt);

    loop {
        let event = tokio::select! {
            change = session.recv() => WatchEvent::Change(change),
            _ = ticker.tick() => WatchEvent::Tick,
            _ = &mut interrupt => WatchEvent::Interrupt,
        };

        match event {
            WatchEvent::Change(Some(change)) => {
                debug!("Applying {}", change);
                if session.apply(change) {
                    redraw(&session, services, palette)?;
                }
            }
            WatchEvent::Change(None) => {
                warn!("Change feed closed");
                break;
            }
            WatchEvent::Tick => {
                if let Err(e) = services.bookmark_service.pump_changes() {
                    warn!("Failed to poll bookmark changes: {}", e);
                }
            }
            WatchEvent::Interrupt => {
                info!("Interrupted, stopping watch");
                break;
            }
        }
    }

    session.deactivate();
    eprintln!("Stopped watching.");
    Ok(())
}

#[instrument(skip(services, settings, notifier))]
pub fn watch(
    services: &ServiceContainer,
    settings: &Settings,
    notifier: Arc<dyn Notifier>,
    palette: Palette,
) -> CliResult<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch_loop(
        services,
        settings,
        notifier,
        palette,
        tokio::signal::ctrl_c(),
    ))
}

/// Notifier for the given color choice
pub fn console_notifier(palette: Palette) -> Arc<dyn Notifier> {
    Arc::new(ConsoleNotifier::new(palette.color))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::notifier::RecordingNotifier;
    use crate::infrastructure::repositories::memory::InMemoryBookmarkRepository;
    use tempfile::tempdir;

    fn services() -> (Arc<InMemoryBookmarkRepository>, ServiceContainer) {
        let repo = Arc::new(InMemoryBookmarkRepository::new());
        let container = ServiceContainer::with_repository(repo.clone(), &Settings::default()).unwrap();
        (repo, container)
    }

    #[test]
    fn given_invalid_url_when_add_then_invalid_input_and_nothing_stored() {
        let (repo, services) = services();
        let err = add("Broken", "nope", &services, Arc::new(RecordingNotifier::new())).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
        assert_eq!(repo.insert_count(), 0);
    }

    #[test]
    fn given_unknown_and_known_ids_when_delete_with_yes_then_known_deleted_and_error_reported() {
        let (repo, services) = services();
        let notifier = Arc::new(RecordingNotifier::new());
        add("Rust", "https://www.rust-lang.org", &services, notifier.clone()).unwrap();
        let id = repo.rows()[0].id.to_string();

        let err = delete(&[id, "999".to_string()], true, &services, notifier.clone()).unwrap_err();

        assert!(matches!(err, CliError::CommandFailed(msg) if msg.contains("1 of 2")));
        assert!(repo.rows().is_empty());
        assert_eq!(repo.delete_count(), 1);
    }

    #[test]
    fn given_existing_file_when_create_db_then_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("taken.db");
        std::fs::write(&path, b"").unwrap();

        let err = create_db(Some(path.to_string_lossy().to_string()), &Settings::default()).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(msg) if msg.contains("already exists")));
    }

    #[test]
    fn given_new_path_when_create_db_then_database_usable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fresh/linkshelf.db");

        create_db(Some(path.to_string_lossy().to_string()), &Settings::default()).unwrap();

        let settings = Settings {
            db_url: path.to_string_lossy().to_string(),
            ..Settings::default()
        };
        assert!(ServiceContainer::new(&settings).is_ok());
    }

    #[tokio::test]
    async fn given_interrupt_already_fired_when_watch_then_session_stops() {
        let (_repo, services) = services();
        let notifier = Arc::new(RecordingNotifier::new());
        add("Rust", "https://www.rust-lang.org", &services, notifier.clone()).unwrap();
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        stop.send(()).unwrap();

        let interrupt = async move {
            stopped
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
        };
        let result = watch_loop(
            &services,
            &Settings::default(),
            notifier,
            Palette::new(false),
            interrupt,
        )
        .await;

        assert!(result.is_ok());
    }
}
