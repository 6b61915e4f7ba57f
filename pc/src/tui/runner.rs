//! TUI Runner - main loop that owns terminal and the catalog cache
//!
//! The TuiRunner is responsible for:
//! - Checking the catalog cache on start, on every tick and on reload
//! - Dispatching events to App for handling
//! - Performing deferred actions (clipboard, reload, diagnostics)
//! - Redrawing after every event

use std::path::PathBuf;
use std::time::{Duration, Instant};

use eyre::Result;
use tracing::{debug, info, warn};

use crate::catalog::CatalogCache;
use crate::compose::Mode;
use crate::diagnostic::{diagnose, locate};

use super::Tui;
use super::app::App;
use super::events::{Event, EventHandler};
use super::state::{AppState, CatalogStatus, PendingAction};
use super::views;

/// How often to check the catalog file for changes
const CATALOG_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner {
    /// Application state
    app: App,
    /// Terminal handle
    terminal: Tui,
    /// Parsed catalogs, re-read when the file changes
    cache: CatalogCache,
    /// Event handler
    event_handler: EventHandler,
    /// Last catalog check
    last_refresh: Instant,
    /// Created on first copy; X11 clipboards only serve content while alive
    clipboard: Option<arboard::Clipboard>,
}

impl TuiRunner {
    pub fn new(terminal: Tui, catalog_path: PathBuf, mode: Mode, tick_rate: Duration) -> Self {
        Self {
            app: App::new(catalog_path, mode),
            terminal,
            cache: CatalogCache::new(),
            event_handler: EventHandler::new(tick_rate),
            last_refresh: Instant::now(),
            clipboard: None,
        }
    }

    /// Run the TUI main loop
    pub fn run(&mut self) -> Result<()> {
        info!("Browser starting with catalog {}", self.app.state().catalog_path.display());
        refresh_catalog(self.app.state_mut(), &mut self.cache);

        loop {
            // Draw the UI
            self.terminal.draw(|frame| views::render(self.app.state(), frame))?;

            match self.event_handler.next()? {
                Event::Tick => self.handle_tick(),
                Event::Key(key_event) => {
                    if self.app.handle_key(key_event) {
                        break;
                    }
                    self.handle_pending_action();
                }
                Event::Resize(width, height) => {
                    debug!(width, height, "TuiRunner::run: resize");
                }
            }

            if self.app.state().should_quit {
                break;
            }
        }

        info!("Browser exiting");
        Ok(())
    }

    /// Periodic catalog check
    fn handle_tick(&mut self) {
        if self.last_refresh.elapsed() >= CATALOG_REFRESH_INTERVAL {
            refresh_catalog(self.app.state_mut(), &mut self.cache);
            self.last_refresh = Instant::now();
        }
    }

    fn handle_pending_action(&mut self) {
        let Some(action) = self.app.state_mut().pending_action.take() else {
            return;
        };
        debug!(?action, "TuiRunner::handle_pending_action: called");

        match action {
            PendingAction::CopyResult => self.copy_result(),
            PendingAction::Reload => {
                self.cache.invalidate(&self.app.state().catalog_path);
                refresh_catalog(self.app.state_mut(), &mut self.cache);
                self.last_refresh = Instant::now();
                if matches!(self.app.state().catalog, CatalogStatus::Loaded(_)) {
                    self.app.state_mut().set_info("Catalog reloaded");
                }
            }
            PendingAction::RunDiagnostics => run_diagnostics(self.app.state_mut()),
        }
    }

    fn copy_result(&mut self) {
        let prompt = match self.app.state().composed() {
            Some(Ok(prompt)) => prompt,
            Some(Err(e)) => {
                self.app.state_mut().set_error(format!("Nothing to copy: {}", e));
                return;
            }
            None => {
                self.app.state_mut().set_error("Nothing to copy: no task selected");
                return;
            }
        };

        if self.clipboard.is_none() {
            match arboard::Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    warn!("Clipboard unavailable: {}", e);
                    self.app.state_mut().set_error(format!("Clipboard unavailable: {}", e));
                    return;
                }
            }
        }

        let Some(clipboard) = self.clipboard.as_mut() else {
            return;
        };
        match clipboard.set_text(prompt) {
            Ok(()) => self.app.state_mut().set_info("Prompt copied to clipboard"),
            Err(e) => {
                warn!("Failed to copy prompt: {}", e);
                self.app.state_mut().set_error(format!("Failed to copy: {}", e));
            }
        }
    }
}

/// Look the catalog up through the cache and install the result
pub(crate) fn refresh_catalog(state: &mut AppState, cache: &mut CatalogCache) {
    let status = match cache.get(&state.catalog_path) {
        Ok(Some(catalog)) => CatalogStatus::Loaded(catalog),
        Ok(None) => CatalogStatus::Missing,
        Err(e) => {
            warn!("Failed to load catalog {}: {}", state.catalog_path.display(), e);
            CatalogStatus::Failed { detail: e.to_string() }
        }
    };
    state.set_catalog(status);
}

/// Diagnose the directory holding the catalog file
pub(crate) fn run_diagnostics(state: &mut AppState) {
    let (dir, filename) = locate(&state.catalog_path);
    match diagnose(&dir, &filename) {
        Ok(report) => state.diagnostic = Some(report),
        Err(e) => {
            warn!("Diagnostics failed: {:#}", e);
            state.diagnostic = None;
            state.set_error(format!("Diagnostics failed: {}", e));
        }
    }
}
