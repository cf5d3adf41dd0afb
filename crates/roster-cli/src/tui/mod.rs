//! Terminal user interface (TUI) for roster.
//!
//! ## Entry points
//!
//! - [`run_tui`] — full-screen directory with debounced filtering.

pub mod directory;

use anyhow::{Context, Result, bail};
use crossterm::event::{self, Event, KeyEventKind};
use directory::DirectoryApp;
use ratatui::DefaultTerminal;
use roster_core::clock::SystemClock;
use roster_core::source::DataSource;
use roster_core::{DataAccessError, DirectoryStore, PersonRecord};
use std::io::{self, IsTerminal};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

type FetchResult = Result<Vec<PersonRecord>, DataAccessError>;

/// Run the interactive directory until the user quits.
///
/// The fetch runs on a worker thread; its result is applied to the store on
/// this thread when it arrives.
pub fn run_tui(source: Box<dyn DataSource>, quiet_window: Duration) -> Result<()> {
    if !io::stdout().is_terminal() {
        bail!("The interactive view needs a terminal on stdout; use `roster list` when piping");
    }
    let mut app = DirectoryApp::new(DirectoryStore::with_clock(SystemClock, quiet_window));
    app.begin_load()?;

    let (tx, rx) = mpsc::channel::<FetchResult>();
    info!(source = %source.describe(), "fetching directory");
    thread::Builder::new()
        .name("roster-fetch".to_string())
        .spawn(move || {
            // The receiver is gone if the user quit before the fetch finished.
            let _ = tx.send(source.fetch_all());
        })
        .context("Failed to spawn fetch thread")?;

    let mut terminal = ratatui::try_init().context("Failed to initialize the terminal")?;
    let result = event_loop(&mut terminal, &mut app, &rx);
    ratatui::restore();

    app.shutdown();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    app: &mut DirectoryApp,
    rx: &Receiver<FetchResult>,
) -> Result<()> {
    let mut fetch_pending = true;
    while !app.should_quit() {
        if fetch_pending {
            match rx.try_recv() {
                Ok(result) => {
                    app.finish_load(result)?;
                    fetch_pending = false;
                }
                Err(TryRecvError::Disconnected) => {
                    app.finish_load(Err(DataAccessError::Other(
                        "fetch worker exited without a result".to_string(),
                    )))?;
                    fetch_pending = false;
                }
                Err(TryRecvError::Empty) => {}
            }
        }

        if app.tick() {
            debug!(
                rows = app.store().filtered_records().len(),
                "table recomputed"
            );
        }

        terminal.draw(|frame| app.render(frame))?;

        if event::poll(app.poll_timeout())?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }
    }
    Ok(())
}
