//! TUI application - event handling and state management
//!
//! The App struct owns the AppState and handles all keyboard events.
//! It does not do any rendering - that's delegated to the views module.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::{AppState, Focus, InteractionMode, PendingAction, View};
use crate::compose::Mode;

/// TUI application
#[derive(Debug)]
pub struct App {
    /// Application state
    state: AppState,
}

impl App {
    /// Create a new application instance
    pub fn new(catalog_path: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            state: AppState::new(catalog_path, mode),
        }
    }

    /// Get reference to state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get mutable reference to state
    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Handle a key event
    ///
    /// Returns true if the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true; // Force quit
        }

        // Clear any transient message on key press
        self.state.clear_status();

        match &self.state.interaction_mode {
            InteractionMode::Normal => self.handle_normal_key(key),
            InteractionMode::EditField { .. } => self.handle_edit_key(key),
            InteractionMode::Help => self.handle_help_key(key),
        }
        false
    }

    /// Handle key in normal mode
    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.state.should_quit = true;
            }
            KeyCode::Char('?') | KeyCode::F(1) => {
                self.state.interaction_mode = InteractionMode::Help;
            }
            KeyCode::Char('D') => {
                self.toggle_doctor();
            }
            KeyCode::Char('r') => {
                self.state.pending_action = Some(PendingAction::Reload);
            }
            KeyCode::Esc if self.state.current_view == View::Doctor => {
                self.state.current_view = View::Browse;
            }
            _ if self.state.current_view == View::Browse => self.handle_browse_key(key),
            _ => {}
        }
    }

    /// Keys that only apply to the browser
    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => {
                self.state.focus = self.state.focus.next();
            }
            KeyCode::BackTab => {
                self.state.focus = self.state.focus.prev();
            }
            KeyCode::Char('y') => {
                self.state.pending_action = Some(PendingAction::CopyResult);
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_down(),
            KeyCode::Left | KeyCode::Char('h') => {
                if self.state.focus == Focus::Variables
                    && let Some(field) = self.state.form.field_mut(self.state.field_selection.selected_index)
                {
                    field.select_prev();
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.state.focus == Focus::Variables
                    && let Some(field) = self.state.form.field_mut(self.state.field_selection.selected_index)
                {
                    field.select_next();
                }
            }
            KeyCode::Char(' ') => {
                if self.state.focus == Focus::Variables
                    && let Some(field) = self.state.form.field_mut(self.state.field_selection.selected_index)
                {
                    field.toggle();
                }
            }
            KeyCode::Enter => match self.state.focus {
                Focus::Variables => self.state.begin_edit(),
                Focus::Category | Focus::Task | Focus::Mode => {
                    self.state.focus = self.state.focus.next();
                }
                Focus::Result => {}
            },
            KeyCode::Char('g') if self.state.focus == Focus::Result => {
                self.state.result_scroll = 0;
            }
            _ => {}
        }
    }

    fn move_up(&mut self) {
        match self.state.focus {
            Focus::Category => self.state.select_category_prev(),
            Focus::Task => self.state.select_task_prev(),
            Focus::Mode => self.state.select_mode_prev(),
            Focus::Variables => self.state.field_selection.select_prev(),
            Focus::Result => {
                self.state.result_scroll = self.state.result_scroll.saturating_sub(1);
            }
        }
    }

    fn move_down(&mut self) {
        match self.state.focus {
            Focus::Category => self.state.select_category_next(),
            Focus::Task => self.state.select_task_next(),
            Focus::Mode => self.state.select_mode_next(),
            Focus::Variables => {
                let max = self.state.form.len();
                self.state.field_selection.select_next(max);
            }
            Focus::Result => {
                self.state.result_scroll = self.state.result_scroll.saturating_add(1);
            }
        }
    }

    fn toggle_doctor(&mut self) {
        self.state.current_view = match self.state.current_view {
            View::Browse => {
                self.state.pending_action = Some(PendingAction::RunDiagnostics);
                View::Doctor
            }
            View::Doctor => View::Browse,
        };
    }

    /// Handle key while editing a text field
    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.state.commit_edit(),
            KeyCode::Esc => self.state.cancel_edit(),
            code => {
                if let InteractionMode::EditField { buffer, .. } = &mut self.state.interaction_mode {
                    match code {
                        KeyCode::Backspace => {
                            buffer.pop();
                        }
                        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            buffer.clear();
                        }
                        KeyCode::Char(c) => buffer.push(c),
                        _ => {}
                    }
                }
            }
        }
    }

    /// Handle key in help overlay
    fn handle_help_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::F(1)) {
            self.state.interaction_mode = InteractionMode::Normal;
        }
    }
}
