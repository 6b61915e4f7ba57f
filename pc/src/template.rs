//! Named-placeholder templates
//!
//! Syntax: `{name}` is replaced by the value of `name`; `{{` and `}}` produce
//! literal braces. Positional fields and field modifiers (`.attr`, `[idx]`,
//! `!conv`, `:spec`) are rejected.

use std::collections::HashMap;
use std::hash::BuildHasher;

use thiserror::Error;
use tracing::debug;

/// Errors produced while parsing or rendering a template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Template references unknown variable '{name}'")]
    MissingVariable { name: String },

    #[error("Malformed template at position {position}: {reason}")]
    MalformedTemplate { position: usize, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse template text
    ///
    /// Positions in errors are character indexes of the offending brace.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        debug!(text_len = text.len(), "Template::parse: called");
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.chars().enumerate().peekable();

        while let Some((position, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|&(_, next)| next) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|&(_, next)| next) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(TemplateError::MalformedTemplate {
                        position,
                        reason: "single '}' encountered",
                    });
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => {
                                return Err(TemplateError::MalformedTemplate {
                                    position,
                                    reason: "nested '{' in field",
                                });
                            }
                            c => name.push(c),
                        }
                    }

                    if !closed {
                        return Err(TemplateError::MalformedTemplate {
                            position,
                            reason: "unclosed '{'",
                        });
                    }
                    validate_field_name(&name, position)?;

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(name));
                }
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Placeholder names in order of appearance (duplicates kept)
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute every placeholder from `values`
    ///
    /// All placeholders are checked before any output is produced.
    pub fn render<S: BuildHasher>(&self, values: &HashMap<String, String, S>) -> Result<String, TemplateError> {
        if let Some(name) = self.placeholders().find(|name| !values.contains_key(*name)) {
            debug!(%name, "Template::render: missing variable");
            return Err(TemplateError::MissingVariable { name: name.to_string() });
        }

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => out.push_str(&values[name.as_str()]),
            }
        }
        Ok(out)
    }
}

fn validate_field_name(name: &str, position: usize) -> Result<(), TemplateError> {
    if name.is_empty() {
        return Err(TemplateError::MalformedTemplate {
            position,
            reason: "empty field name",
        });
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        return Err(TemplateError::MalformedTemplate {
            position,
            reason: "positional fields are not supported",
        });
    }
    if name.contains(['.', '[', ']', '!', ':']) {
        return Err(TemplateError::MalformedTemplate {
            position,
            reason: "field modifiers are not supported",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_render_simple() {
        let template = Template::parse("Summarize: {text}").unwrap();
        assert_eq!(template.render(&values(&[("text", "hello")])).unwrap(), "Summarize: hello");
    }

    #[test]
    fn test_repeated_and_unused() {
        let template = Template::parse("{a}-{a}").unwrap();
        let out = template.render(&values(&[("a", "x"), ("unused", "y")])).unwrap();
        assert_eq!(out, "x-x");
    }

    #[test]
    fn test_escaped_braces() {
        let template = Template::parse("{{literal}} {name} }}").unwrap();
        assert_eq!(template.render(&values(&[("name", "v")])).unwrap(), "{literal} v }");
        assert_eq!(template.placeholders().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_missing_variable() {
        let template = Template::parse("Hi {missing_var}").unwrap();
        let err = template.render(&values(&[("text", "hello")])).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingVariable {
                name: "missing_var".to_string()
            }
        );
    }

    #[test]
    fn test_unclosed_brace_position() {
        let err = Template::parse("abc {name").unwrap_err();
        assert_eq!(
            err,
            TemplateError::MalformedTemplate {
                position: 4,
                reason: "unclosed '{'"
            }
        );
    }

    #[test]
    fn test_single_close_brace() {
        let err = Template::parse("a } b").unwrap_err();
        assert!(matches!(err, TemplateError::MalformedTemplate { position: 2, .. }));
    }

    #[test]
    fn test_position_counts_characters() {
        // Multi-byte characters count as one position each
        let err = Template::parse("摘要：{").unwrap_err();
        assert!(matches!(err, TemplateError::MalformedTemplate { position: 3, .. }));
    }

    #[test]
    fn test_rejected_field_forms() {
        for text in ["{}", "{0}", "{a.b}", "{a[0]}", "{a!r}", "{a:>10}", "{a{b}}"] {
            let result = Template::parse(text);
            assert!(
                matches!(result, Err(TemplateError::MalformedTemplate { .. })),
                "expected malformed for {text}"
            );
        }
    }

    #[test]
    fn test_unicode_names_and_values() {
        let template = Template::parse("主題：{主題}").unwrap();
        assert_eq!(template.render(&values(&[("主題", "貓")])).unwrap(), "主題：貓");
    }
}
