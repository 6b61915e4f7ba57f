//! TUI application state
//!
//! Pure data structures for the TUI. No rendering logic here.
//!
//! Selections are stored as indexes and resolved against the current catalog
//! on every render pass, so a reloaded catalog only needs its indexes clamped.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::catalog::{Catalog, Variable};
use crate::compose::{ComposeError, Mode, compose_task};
use crate::diagnostic::DiagnosticReport;
use crate::form::{Control, Form};
use crate::selection::{Resolution, resolve};

/// Which screen is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Category/task browser with the variable form
    #[default]
    Browse,
    /// Working-directory and catalog diagnostics
    Doctor,
}

impl View {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Browse => "Browse",
            Self::Doctor => "Doctor",
        }
    }
}

/// Panel receiving navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Category,
    Task,
    Mode,
    Variables,
    Result,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Focus::Category,
        Focus::Task,
        Focus::Mode,
        Focus::Variables,
        Focus::Result,
    ];

    fn position(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Interaction mode (modal)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Editing the text field at `index`
    EditField { index: usize, buffer: String },
    /// Help overlay
    Help,
}

/// Work the runner performs after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    /// Copy the composed prompt to the clipboard
    CopyResult,
    /// Drop the cached catalog and read it again
    Reload,
    /// Run diagnostics for the Doctor view
    RunDiagnostics,
}

/// Result of the latest catalog lookup
#[derive(Debug, Clone)]
pub enum CatalogStatus {
    /// Not looked up yet
    Pending,
    Loaded(Arc<Catalog>),
    /// Catalog file does not exist
    Missing,
    /// File exists but could not be loaded
    Failed { detail: String },
}

/// Transient footer message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Cursor within a list
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub selected_index: usize,
}

impl SelectionState {
    pub fn select_next(&mut self, max_items: usize) {
        if max_items > 0 && self.selected_index < max_items - 1 {
            self.selected_index += 1;
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self, max_items: usize) {
        if max_items > 0 {
            self.selected_index = max_items - 1;
        }
    }

    /// Ensure selection is within bounds
    pub fn clamp(&mut self, max_items: usize) {
        if max_items == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= max_items {
            self.selected_index = max_items - 1;
        }
    }
}

/// Main TUI application state
#[derive(Debug)]
pub struct AppState {
    /// Catalog file shown in the header and used for lookups
    pub catalog_path: PathBuf,
    /// Latest catalog lookup
    pub catalog: CatalogStatus,
    /// Current view
    pub current_view: View,
    /// Focused panel
    pub focus: Focus,
    /// Current interaction mode
    pub interaction_mode: InteractionMode,
    pub category_selection: SelectionState,
    pub task_selection: SelectionState,
    /// Selected output mode
    pub mode: Mode,
    /// Selected form field
    pub field_selection: SelectionState,
    /// Controls for the selected task
    pub form: Form,
    /// Category/task the form was built for
    form_key: Option<(String, String)>,
    /// Variables the form was built from
    form_variables: Vec<Variable>,
    /// Vertical scroll of the result panel
    pub result_scroll: u16,
    /// Latest diagnostics (Doctor view)
    pub diagnostic: Option<DiagnosticReport>,
    pub status: Option<StatusMessage>,
    pub pending_action: Option<PendingAction>,
    /// Should the app quit
    pub should_quit: bool,
}

impl AppState {
    pub fn new(catalog_path: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            catalog: CatalogStatus::Pending,
            current_view: View::default(),
            focus: Focus::default(),
            interaction_mode: InteractionMode::default(),
            category_selection: SelectionState::default(),
            task_selection: SelectionState::default(),
            mode,
            field_selection: SelectionState::default(),
            form: Form::default(),
            form_key: None,
            form_variables: Vec::new(),
            result_scroll: 0,
            diagnostic: None,
            status: None,
            pending_action: None,
            should_quit: false,
        }
    }

    /// Install a catalog lookup result
    ///
    /// A lookup returning the already-installed catalog is a no-op, so widget
    /// values survive render passes.
    pub fn set_catalog(&mut self, status: CatalogStatus) {
        if let (CatalogStatus::Loaded(current), CatalogStatus::Loaded(next)) = (&self.catalog, &status)
            && Arc::ptr_eq(current, next)
        {
            return;
        }

        debug!("AppState::set_catalog: catalog changed");
        self.catalog = status;
        self.clamp_selections();
        self.sync_form();
    }

    /// The loaded catalog, if any
    pub fn catalog(&self) -> Option<&Catalog> {
        match &self.catalog {
            CatalogStatus::Loaded(catalog) => Some(catalog),
            _ => None,
        }
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.catalog().map(Catalog::category_names).unwrap_or_default()
    }

    pub fn task_names(&self) -> Vec<&str> {
        match (self.catalog(), self.selected_category()) {
            (Some(catalog), Some(category)) => catalog.task_names(category),
            _ => Vec::new(),
        }
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.category_names().get(self.category_selection.selected_index).copied()
    }

    pub fn selected_task(&self) -> Option<&str> {
        self.task_names().get(self.task_selection.selected_index).copied()
    }

    /// Resolve the current selection against the catalog
    pub fn resolution(&self) -> Resolution<'_> {
        match self.catalog() {
            Some(catalog) => resolve(catalog, self.selected_category(), self.selected_task()),
            None => Resolution::NoSelection,
        }
    }

    /// Compose the prompt for the selected task, if one is selected
    pub fn composed(&self) -> Option<Result<String, ComposeError>> {
        self.resolution()
            .task()
            .map(|task| compose_task(task, &self.form.snapshot(), self.mode))
    }

    pub fn select_category_next(&mut self) {
        let max = self.category_names().len();
        self.category_selection.select_next(max);
        self.on_category_changed();
    }

    pub fn select_category_prev(&mut self) {
        self.category_selection.select_prev();
        self.on_category_changed();
    }

    pub fn select_task_next(&mut self) {
        let max = self.task_names().len();
        self.task_selection.select_next(max);
        self.sync_form();
    }

    pub fn select_task_prev(&mut self) {
        self.task_selection.select_prev();
        self.sync_form();
    }

    pub fn select_mode_next(&mut self) {
        let index = (self.mode.index() + 1).min(Mode::ALL.len() - 1);
        self.mode = Mode::ALL[index];
    }

    pub fn select_mode_prev(&mut self) {
        self.mode = Mode::ALL[self.mode.index().saturating_sub(1)];
    }

    /// Start editing the selected field if it is a text field
    pub fn begin_edit(&mut self) {
        let index = self.field_selection.selected_index;
        if let Some(field) = self.form.fields().get(index)
            && let Control::Text { value } = &field.control
        {
            self.interaction_mode = InteractionMode::EditField {
                index,
                buffer: value.clone(),
            };
        }
    }

    /// Write the edit buffer back to its field and leave edit mode
    pub fn commit_edit(&mut self) {
        if let InteractionMode::EditField { index, buffer } = std::mem::take(&mut self.interaction_mode)
            && let Some(field) = self.form.field_mut(index)
        {
            field.set_text(buffer);
        }
    }

    pub fn cancel_edit(&mut self) {
        self.interaction_mode = InteractionMode::Normal;
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    fn on_category_changed(&mut self) {
        self.task_selection.select_first();
        self.sync_form();
    }

    fn clamp_selections(&mut self) {
        let categories = self.category_names().len();
        self.category_selection.clamp(categories);
        let tasks = self.task_names().len();
        self.task_selection.clamp(tasks);
    }

    /// Rebuild the form when the selected task or its declared variables changed
    fn sync_form(&mut self) {
        let key = match (self.selected_category(), self.selected_task()) {
            (Some(category), Some(task)) => Some((category.to_string(), task.to_string())),
            _ => None,
        };
        let unchanged = key == self.form_key
            && self.resolution().task().map(|task| task.variables.as_slice()).unwrap_or_default()
                == self.form_variables.as_slice();
        if !unchanged {
            self.rebuild_form(key);
        }
    }

    fn rebuild_form(&mut self, key: Option<(String, String)>) {
        debug!(?key, "AppState::rebuild_form: called");
        let variables = self.resolution().task().map(|task| task.variables.clone()).unwrap_or_default();
        self.form = self.resolution().task().map(Form::from_task).unwrap_or_default();
        self.form_variables = variables;
        self.form_key = key;
        self.field_selection.select_first();
        self.result_scroll = 0;
        if matches!(self.interaction_mode, InteractionMode::EditField { .. }) {
            self.interaction_mode = InteractionMode::Normal;
        }
    }
}
