//! Prompt Copilot - offline prompt-template browser
//!
//! Loads a catalog of categorized prompt templates from a JSON file, lets the
//! user pick a category and task, fill in the task's variables, and produces
//! the final prompt text with an optional output-mode prefix.
//!
//! # Pipeline
//!
//! ```text
//! my_prompts.json -> catalog -> selection -> form -> compose -> prompt text
//! ```
//!
//! # Modules
//!
//! - [`catalog`] - Catalog model, JSON loader and mtime-keyed cache
//! - [`selection`] - Category/task resolution
//! - [`form`] - Variable controls and the user input snapshot
//! - [`template`] - `{name}` placeholder parser
//! - [`compose`] - Output modes and prompt composition
//! - [`diagnostic`] - Working-directory and catalog file checks
//! - [`tui`] - Terminal browser
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod catalog;
pub mod cli;
pub mod compose;
pub mod config;
pub mod diagnostic;
pub mod form;
pub mod selection;
pub mod template;
pub mod tui;

pub use catalog::{Catalog, CatalogCache, CatalogError, Category, Task, VarSpec, Variable, load_catalog, parse_catalog};
pub use compose::{ComposeError, Mode, compose, compose_task, format_inputs};
pub use config::Config;
pub use diagnostic::{DiagnosticReport, DiagnosticStatus, diagnose};
pub use form::{Control, Form, FormError, FormField, InputSnapshot, InputValue};
pub use selection::{Resolution, resolve};
pub use template::{Template, TemplateError};

/// Catalog file looked up in the working directory by default
pub const DEFAULT_CATALOG_FILENAME: &str = "my_prompts.json";

/// Optional top-level key wrapping the category mapping
pub const ROLES_KEY: &str = "roles";

/// Variable-name suffix marking a multi-choice variable
pub const MULTI_SUFFIX: &str = "__multi";

/// Separator used when joining multi-choice selections
pub const MULTI_SEPARATOR: &str = "、";
