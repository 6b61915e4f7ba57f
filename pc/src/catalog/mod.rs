//! Prompt catalog
//!
//! The catalog is a JSON document mapping category names to tasks:
//!
//! ```json
//! {"roles": {"Writer": {"Summarize": {"template": "Summarize: {text}", "vars": {"text": "hello"}}}}}
//! ```
//!
//! The `roles` wrapper is optional. Loading goes through [`CatalogCache`] in
//! the browser so repeated render passes reuse the parsed document.

mod cache;
mod error;
mod loader;
mod model;

pub use cache::CatalogCache;
pub use error::CatalogError;
pub use loader::{category_root, load_catalog, parse_catalog};
pub use model::{Catalog, Category, Task, VarSpec, Variable, display_value};
