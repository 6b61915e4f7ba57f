//! Catalog data model
//!
//! Categories and tasks keep the insertion order of the JSON document. Each
//! variable's default is classified once, at load time, into a [`VarSpec`].

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::MULTI_SUFFIX;

/// Full category -> task hierarchy
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    categories: IndexMap<String, Category>,
}

impl Catalog {
    /// Build a catalog from an ordered category mapping
    pub fn new(categories: IndexMap<String, Category>) -> Self {
        Self { categories }
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Look up a category by name
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.get(name)
    }

    /// Iterate categories in document order
    pub fn categories(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.categories.iter().map(|(name, category)| (name.as_str(), category))
    }
}

/// Named group of tasks
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Category {
    tasks: IndexMap<String, Task>,
}

impl Category {
    pub fn new(tasks: IndexMap<String, Task>) -> Self {
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// Iterate tasks in document order
    pub fn tasks(&self) -> impl Iterator<Item = (&str, &Task)> {
        self.tasks.iter().map(|(name, task)| (name.as_str(), task))
    }
}

/// A named template definition
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawTask")]
pub struct Task {
    /// Free-form help text shown above the form
    pub description: Option<String>,
    /// Template with `{name}` placeholders. Absence surfaces at compose time.
    pub template: Option<String>,
    /// Declared variables in document order
    pub variables: Vec<Variable>,
}

/// On-disk task shape before variable classification
#[derive(Deserialize)]
struct RawTask {
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    vars: Option<IndexMap<String, Value>>,
}

impl From<RawTask> for Task {
    fn from(raw: RawTask) -> Self {
        let description = match raw.description {
            None | Some(Value::Null) => None,
            Some(value) => Some(display_value(&value)),
        };
        let variables = raw
            .vars
            .unwrap_or_default()
            .into_iter()
            .map(|(name, default)| Variable::new(name, default))
            .collect();

        Self {
            description,
            template: raw.template,
            variables,
        }
    }
}

/// A declared task variable
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Key as written in `vars`, suffix included. Templates reference this name.
    pub name: String,
    /// Name shown to the user
    pub label: String,
    pub spec: VarSpec,
}

impl Variable {
    /// Classify a variable from its declared default
    pub fn new(name: impl Into<String>, default: Value) -> Self {
        let name = name.into();
        let spec = VarSpec::classify(&name, default);
        let label = match spec {
            VarSpec::MultiChoice(_) => name.strip_suffix(MULTI_SUFFIX).unwrap_or(&name).to_string(),
            _ => name.clone(),
        };
        Self { name, label, spec }
    }

    /// True when the variable collects several values
    pub fn is_multi(&self) -> bool {
        matches!(self.spec, VarSpec::MultiChoice(_))
    }
}

/// Shape of a variable's default, which decides its input control
#[derive(Debug, Clone, PartialEq)]
pub enum VarSpec {
    /// Free-text field pre-filled with the stringified default
    Scalar(String),
    /// Single choice over the listed options
    Choice(Vec<Value>),
    /// Any subset of the listed options; the first one starts selected
    MultiChoice(Vec<Value>),
}

impl VarSpec {
    pub fn classify(name: &str, default: Value) -> Self {
        match default {
            Value::Array(options) if name.ends_with(MULTI_SUFFIX) => Self::MultiChoice(options),
            Value::Array(options) => Self::Choice(options),
            other => Self::Scalar(display_value(&other)),
        }
    }

    /// Short name of the control kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "text",
            Self::Choice(_) => "choice",
            Self::MultiChoice(_) => "multi",
        }
    }
}

/// Stringify a JSON value the way catalog authors expect to see it
///
/// Strings are verbatim, booleans are `True`/`False`, null is `None`, and
/// containers use the bracketed list/dict notation.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => repr_value(other),
    }
}

fn repr_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => repr_str(s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(repr_value).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", repr_str(k), repr_value(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

fn repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_scalar() {
        assert_eq!(VarSpec::classify("count", json!("30")), VarSpec::Scalar("30".to_string()));
        assert_eq!(VarSpec::classify("count", json!(30)), VarSpec::Scalar("30".to_string()));
        assert_eq!(VarSpec::classify("flag", json!(true)), VarSpec::Scalar("True".to_string()));
    }

    #[test]
    fn test_classify_lists() {
        assert_eq!(
            VarSpec::classify("tone", json!(["formal", "casual"])),
            VarSpec::Choice(vec![json!("formal"), json!("casual")])
        );
        assert_eq!(
            VarSpec::classify("tags__multi", json!(["A", "B"])),
            VarSpec::MultiChoice(vec![json!("A"), json!("B")])
        );
    }

    #[test]
    fn test_multi_suffix_without_list_is_scalar() {
        let var = Variable::new("tags__multi", json!("A"));
        assert_eq!(var.spec, VarSpec::Scalar("A".to_string()));
        assert_eq!(var.label, "tags__multi");
        assert!(!var.is_multi());
    }

    #[test]
    fn test_multi_label_strips_suffix() {
        let var = Variable::new("tags__multi", json!(["A"]));
        assert_eq!(var.name, "tags__multi");
        assert_eq!(var.label, "tags");
        assert!(var.is_multi());
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("plain")), "plain");
        assert_eq!(display_value(&json!(null)), "None");
        assert_eq!(display_value(&json!(1.5)), "1.5");
        assert_eq!(display_value(&json!(["a", 1, false])), "['a', 1, False]");
        assert_eq!(display_value(&json!({"k": "v"})), "{'k': 'v'}");
        assert_eq!(display_value(&json!(["it's"])), "[\"it's\"]");
    }

    #[test]
    fn test_display_value_escapes_control_characters() {
        assert_eq!(display_value(&json!(["a\r\nb"])), "['a\\r\\nb']");
        assert_eq!(display_value(&json!(["\u{1b}[0m", "\u{7f}"])), "['\\x1b[0m', '\\x7f']");
        // Top-level strings stay verbatim
        assert_eq!(display_value(&json!("a\rb")), "a\rb");
    }

    #[test]
    fn test_task_from_json() {
        let task: Task = serde_json::from_value(json!({
            "description": "Summarize text",
            "template": "Summarize: {text}",
            "vars": {"text": "hello", "style": ["short", "long"]}
        }))
        .unwrap();

        assert_eq!(task.description.as_deref(), Some("Summarize text"));
        assert_eq!(task.template.as_deref(), Some("Summarize: {text}"));
        let names: Vec<&str> = task.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["text", "style"]);
    }

    #[test]
    fn test_task_optional_fields() {
        let task: Task = serde_json::from_value(json!({"vars": null})).unwrap();
        assert!(task.description.is_none());
        assert!(task.template.is_none());
        assert!(task.variables.is_empty());
    }
}
