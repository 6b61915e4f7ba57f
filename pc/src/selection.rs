//! Selection Resolver
//!
//! Turns the user's category/task choice into task data. Nothing here is an
//! error: an empty catalog or a category without tasks simply resolves to a
//! state with nothing further to render.

use tracing::debug;

use crate::catalog::{Catalog, Task};

impl Catalog {
    /// Category names in document order
    pub fn category_names(&self) -> Vec<&str> {
        self.categories().map(|(name, _)| name).collect()
    }

    /// Task names of `category` in document order, empty if the category is unknown
    pub fn task_names(&self, category: &str) -> Vec<&str> {
        self.category(category)
            .map(|c| c.tasks().map(|(name, _)| name).collect())
            .unwrap_or_default()
    }

    /// Look up a task record
    pub fn task(&self, category: &str, task: &str) -> Option<&Task> {
        self.category(category).and_then(|c| c.task(task))
    }
}

/// Where the user is in the category -> task flow
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    /// No category chosen (or the chosen one does not exist)
    NoSelection,
    /// Category chosen, no valid task yet
    CategorySelected { category: &'a str },
    /// Both chosen; the form can be built from `task`
    TaskSelected {
        category: &'a str,
        name: &'a str,
        task: &'a Task,
    },
}

impl<'a> Resolution<'a> {
    /// The resolved task, if any
    pub fn task(&self) -> Option<&'a Task> {
        match self {
            Self::TaskSelected { task, .. } => Some(task),
            _ => None,
        }
    }
}

/// Resolve an optional category/task pair against the catalog
pub fn resolve<'a>(catalog: &'a Catalog, category: Option<&str>, task: Option<&str>) -> Resolution<'a> {
    debug!(?category, ?task, "resolve: called");
    let Some((category, tasks)) = category.and_then(|c| catalog.categories().find(|(name, _)| *name == c)) else {
        return Resolution::NoSelection;
    };

    match task.and_then(|t| tasks.tasks().find(|(name, _)| *name == t)) {
        Some((name, task)) => Resolution::TaskSelected { category, name, task },
        None => Resolution::CategorySelected { category },
    }
}
