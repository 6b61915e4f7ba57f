//! Form Renderer
//!
//! Builds one input control per task variable and collects what the user has
//! entered. The control kind comes straight from the variable's [`VarSpec`].

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::catalog::{Task, VarSpec, Variable, display_value};

/// Number of display columns variables are spread across
pub const FORM_COLUMNS: usize = 2;

/// Errors from applying scripted values to a form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Task has no variable named '{0}'")]
    UnknownVariable(String),

    #[error("'{value}' is not an option for '{name}' (options: {options})")]
    NotAnOption { name: String, value: String, options: String },
}

/// Current value of one variable
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    /// Free-text content
    Text(String),
    /// One element of the declared option list
    Choice(Value),
    /// Chosen subset of the declared option list, in declaration order
    Multi(Vec<Value>),
}

/// Variable name -> current value, in declaration order
pub type InputSnapshot = IndexMap<String, InputValue>;

/// Input control state
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Text {
        value: String,
    },
    Choice {
        options: Vec<Value>,
        selected: usize,
    },
    MultiChoice {
        options: Vec<Value>,
        chosen: Vec<bool>,
        /// Option under the cursor
        cursor: usize,
    },
}

impl Control {
    fn from_spec(spec: &VarSpec) -> Self {
        match spec {
            VarSpec::Scalar(default) => Self::Text { value: default.clone() },
            VarSpec::Choice(options) => Self::Choice {
                options: options.clone(),
                selected: 0,
            },
            VarSpec::MultiChoice(options) => {
                let mut chosen = vec![false; options.len()];
                if let Some(first) = chosen.first_mut() {
                    *first = true;
                }
                Self::MultiChoice {
                    options: options.clone(),
                    chosen,
                    cursor: 0,
                }
            }
        }
    }
}

/// One rendered variable
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    /// Key used in the snapshot and the template
    pub name: String,
    /// Name shown to the user
    pub label: String,
    /// Display column (0 or 1)
    pub column: usize,
    pub control: Control,
}

impl FormField {
    fn new(index: usize, variable: &Variable) -> Self {
        Self {
            name: variable.name.clone(),
            label: variable.label.clone(),
            column: index % FORM_COLUMNS,
            control: Control::from_spec(&variable.spec),
        }
    }

    /// Current value of this field
    pub fn value(&self) -> InputValue {
        match &self.control {
            Control::Text { value } => InputValue::Text(value.clone()),
            Control::Choice { options, selected } => {
                InputValue::Choice(options.get(*selected).cloned().unwrap_or(Value::Null))
            }
            Control::MultiChoice { options, chosen, .. } => InputValue::Multi(
                options
                    .iter()
                    .zip(chosen)
                    .filter(|(_, on)| **on)
                    .map(|(option, _)| option.clone())
                    .collect(),
            ),
        }
    }

    /// Replace the text of a text field; no-op for other controls
    pub fn set_text(&mut self, text: impl Into<String>) {
        if let Control::Text { value } = &mut self.control {
            *value = text.into();
        }
    }

    /// Move to the next option (choice) or move the cursor right (multi)
    pub fn select_next(&mut self) {
        match &mut self.control {
            Control::Choice { options, selected } if !options.is_empty() => {
                *selected = (*selected + 1) % options.len();
            }
            Control::MultiChoice { options, cursor, .. } if !options.is_empty() => {
                *cursor = (*cursor + 1) % options.len();
            }
            _ => {}
        }
    }

    /// Move to the previous option (choice) or move the cursor left (multi)
    pub fn select_prev(&mut self) {
        match &mut self.control {
            Control::Choice { options, selected } if !options.is_empty() => {
                *selected = (*selected + options.len() - 1) % options.len();
            }
            Control::MultiChoice { options, cursor, .. } if !options.is_empty() => {
                *cursor = (*cursor + options.len() - 1) % options.len();
            }
            _ => {}
        }
    }

    /// Toggle the option under the cursor of a multi-choice field
    pub fn toggle(&mut self) {
        if let Control::MultiChoice { chosen, cursor, .. } = &mut self.control
            && let Some(on) = chosen.get_mut(*cursor)
        {
            *on = !*on;
        }
    }

    /// Set the field from a command-line string
    ///
    /// Choice values must match the stringified form of an option. A multi
    /// value matching one option whole selects that option; otherwise it is
    /// split on commas and each part must match an option. With `append`, a
    /// multi value adds to the current selection instead of replacing it.
    pub fn apply_override(&mut self, raw: &str, append: bool) -> Result<(), FormError> {
        debug!(name = %self.name, %raw, append, "FormField::apply_override: called");
        let name = self.name.clone();
        match &mut self.control {
            Control::Text { value } => {
                *value = raw.to_string();
            }
            Control::Choice { options, selected } => {
                *selected = position_of(options, raw).ok_or_else(|| not_an_option(&name, raw, options))?;
            }
            Control::MultiChoice { options, chosen, .. } => {
                let mut next = if append { chosen.clone() } else { vec![false; options.len()] };
                if let Some(index) = position_of(options, raw) {
                    next[index] = true;
                } else {
                    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                        let index = position_of(options, part).ok_or_else(|| not_an_option(&name, part, options))?;
                        next[index] = true;
                    }
                }
                *chosen = next;
            }
        }
        Ok(())
    }
}

fn position_of(options: &[Value], raw: &str) -> Option<usize> {
    options.iter().position(|option| display_value(option) == raw)
}

fn not_an_option(name: &str, value: &str, options: &[Value]) -> FormError {
    FormError::NotAnOption {
        name: name.to_string(),
        value: value.to_string(),
        options: options.iter().map(display_value).collect::<Vec<_>>().join(", "),
    }
}

/// Input controls for one task
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Form {
    fields: Vec<FormField>,
}

impl Form {
    /// Build the form for a task, one field per declared variable
    pub fn from_task(task: &Task) -> Self {
        debug!(variables = task.variables.len(), "Form::from_task: called");
        Self {
            fields: task
                .variables
                .iter()
                .enumerate()
                .map(|(index, variable)| FormField::new(index, variable))
                .collect(),
        }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut FormField> {
        self.fields.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields of one display column, with their form index
    pub fn column(&self, column: usize) -> impl Iterator<Item = (usize, &FormField)> {
        self.fields
            .iter()
            .enumerate()
            .filter(move |(_, field)| field.column == column)
    }

    /// Apply a `name=value` style override to the named field
    pub fn apply_override(&mut self, name: &str, raw: &str) -> Result<(), FormError> {
        self.field_named(name)?.apply_override(raw, false)
    }

    /// Apply overrides in order
    ///
    /// Repeating a multi-choice name adds to its selection, so options that
    /// contain commas can still be chosen one per assignment.
    pub fn apply_overrides(&mut self, assignments: &[(String, String)]) -> Result<(), FormError> {
        let mut seen: Vec<&str> = Vec::new();
        for (name, raw) in assignments {
            let append = seen.contains(&name.as_str());
            self.field_named(name)?.apply_override(raw, append)?;
            seen.push(name);
        }
        Ok(())
    }

    fn field_named(&mut self, name: &str) -> Result<&mut FormField, FormError> {
        self.fields
            .iter_mut()
            .find(|field| field.name == name)
            .ok_or_else(|| FormError::UnknownVariable(name.to_string()))
    }

    /// What the user currently has entered, keyed by variable name
    pub fn snapshot(&self) -> InputSnapshot {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::parse_catalog;
    use proptest::prelude::*;
    use serde_json::json;

    fn task(vars: Value) -> Task {
        serde_json::from_value(json!({"template": "", "vars": vars})).unwrap()
    }

    #[test]
    fn test_scalar_default() {
        let form = Form::from_task(&task(json!({"count": "30"})));
        assert_eq!(form.snapshot()["count"], InputValue::Text("30".to_string()));
    }

    #[test]
    fn test_numeric_scalar_default_is_stringified() {
        let form = Form::from_task(&task(json!({"count": 30})));
        assert_eq!(form.snapshot()["count"], InputValue::Text("30".to_string()));
    }

    #[test]
    fn test_choice_defaults_to_first() {
        let form = Form::from_task(&task(json!({"tone": ["formal", "casual"]})));
        assert_eq!(form.snapshot()["tone"], InputValue::Choice(json!("formal")));
    }

    #[test]
    fn test_multi_initial_selection_is_first_only() {
        let form = Form::from_task(&task(json!({"tags__multi": ["A", "B", "C"]})));
        let field = &form.fields()[0];
        assert_eq!(field.label, "tags");
        assert_eq!(form.snapshot()["tags__multi"], InputValue::Multi(vec![json!("A")]));
    }

    #[test]
    fn test_multi_toggle() {
        let mut form = Form::from_task(&task(json!({"tags__multi": ["A", "B", "C"]})));
        let field = form.field_mut(0).unwrap();
        field.select_next();
        field.select_next();
        field.toggle();
        assert_eq!(field.value(), InputValue::Multi(vec![json!("A"), json!("C")]));

        field.select_next(); // wraps to A
        field.toggle();
        assert_eq!(field.value(), InputValue::Multi(vec![json!("C")]));
    }

    #[test]
    fn test_choice_cycles() {
        let mut form = Form::from_task(&task(json!({"tone": ["a", "b", "c"]})));
        let field = form.field_mut(0).unwrap();
        field.select_prev();
        assert_eq!(field.value(), InputValue::Choice(json!("c")));
        field.select_next();
        assert_eq!(field.value(), InputValue::Choice(json!("a")));
        field.select_next();
        assert_eq!(field.value(), InputValue::Choice(json!("b")));
    }

    #[test]
    fn test_empty_option_lists() {
        let form = Form::from_task(&task(json!({"tone": [], "tags__multi": []})));
        let snapshot = form.snapshot();
        assert_eq!(snapshot["tone"], InputValue::Choice(Value::Null));
        assert_eq!(snapshot["tags__multi"], InputValue::Multi(vec![]));
    }

    #[test]
    fn test_columns_alternate() {
        let form = Form::from_task(&task(json!({"a": "1", "b": "2", "c": "3"})));
        let left: Vec<&str> = form.column(0).map(|(_, f)| f.name.as_str()).collect();
        let right: Vec<&str> = form.column(1).map(|(_, f)| f.name.as_str()).collect();
        assert_eq!(left, vec!["a", "c"]);
        assert_eq!(right, vec!["b"]);
    }

    #[test]
    fn test_set_text() {
        let mut form = Form::from_task(&task(json!({"text": "hello", "tone": ["a"]})));
        form.field_mut(0).unwrap().set_text("bye");
        form.field_mut(1).unwrap().set_text("ignored");
        let snapshot = form.snapshot();
        assert_eq!(snapshot["text"], InputValue::Text("bye".to_string()));
        assert_eq!(snapshot["tone"], InputValue::Choice(json!("a")));
    }

    #[test]
    fn test_apply_override() {
        let mut form = Form::from_task(&task(json!({
            "text": "hello",
            "tone": ["formal", "casual"],
            "tags__multi": ["A", "B", "C"],
            "level": [1, 2]
        })));

        form.apply_override("text", "bye").unwrap();
        form.apply_override("tone", "casual").unwrap();
        form.apply_override("tags__multi", "A, C").unwrap();
        form.apply_override("level", "2").unwrap();

        let snapshot = form.snapshot();
        assert_eq!(snapshot["text"], InputValue::Text("bye".to_string()));
        assert_eq!(snapshot["tone"], InputValue::Choice(json!("casual")));
        assert_eq!(snapshot["tags__multi"], InputValue::Multi(vec![json!("A"), json!("C")]));
        assert_eq!(snapshot["level"], InputValue::Choice(json!(2)));
    }

    #[test]
    fn test_repeated_overrides_append_multi() {
        let mut form = Form::from_task(&task(json!({
            "tone": ["formal", "casual"],
            "styles__multi": ["short, punchy", "long", "plain"]
        })));
        let assignments = vec![
            ("styles__multi".to_string(), "short, punchy".to_string()),
            ("tone".to_string(), "formal".to_string()),
            ("styles__multi".to_string(), "plain".to_string()),
            ("tone".to_string(), "casual".to_string()),
        ];
        form.apply_overrides(&assignments).unwrap();

        let snapshot = form.snapshot();
        assert_eq!(
            snapshot["styles__multi"],
            InputValue::Multi(vec![json!("short, punchy"), json!("plain")])
        );
        assert_eq!(snapshot["tone"], InputValue::Choice(json!("casual")));
    }

    #[test]
    fn test_apply_override_errors() {
        let mut form = Form::from_task(&task(json!({"tone": ["formal", "casual"]})));
        assert_eq!(
            form.apply_override("missing", "x"),
            Err(FormError::UnknownVariable("missing".to_string()))
        );
        let err = form.apply_override("tone", "angry").unwrap_err();
        assert!(matches!(err, FormError::NotAnOption { ref value, .. } if value == "angry"));
        assert!(err.to_string().contains("formal, casual"));
    }

    #[test]
    fn test_snapshot_keys_match_sample_catalog() {
        let catalog = parse_catalog(
            r#"{"Writer": {"Post": {"template": "{topic} {tone} {tags__multi}",
                "vars": {"topic": "cats", "tone": ["warm"], "tags__multi": ["x", "y"]}}}}"#,
        )
        .unwrap();
        let form = Form::from_task(catalog.task("Writer", "Post").unwrap());
        let snapshot = form.snapshot();
        let keys: Vec<&String> = snapshot.keys().collect();
        assert_eq!(keys, vec!["topic", "tone", "tags__multi"]);
    }

    fn var_default() -> impl Strategy<Value = Value> {
        prop_oneof![
            "[a-z]{0,8}".prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            prop::collection::vec("[a-z]{1,4}".prop_map(Value::from), 0..4).prop_map(Value::Array),
        ]
    }

    proptest! {
        #[test]
        fn prop_one_field_per_variable(
            vars in prop::collection::btree_map("[a-z]{1,6}(__multi)?", var_default(), 0..8)
        ) {
            let map: serde_json::Map<String, Value> = vars.clone().into_iter().collect();
            let form = Form::from_task(&task(Value::Object(map)));

            let fields: Vec<&str> = form.fields().iter().map(|f| f.name.as_str()).collect();
            let declared: Vec<&str> = vars.keys().map(String::as_str).collect();
            prop_assert_eq!(fields, declared);

            for (index, field) in form.fields().iter().enumerate() {
                prop_assert_eq!(field.column, index % FORM_COLUMNS);
            }
        }
    }
}
