//! Prompt Composer
//!
//! `prompt = mode prefix + template with placeholders substituted`

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::{Task, display_value};
use crate::form::{InputSnapshot, InputValue};
use crate::template::{Template, TemplateError};
use crate::{MULTI_SEPARATOR, MULTI_SUFFIX};

/// Output mode, selecting the prefix prepended to every prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// No prefix
    #[default]
    Auto,
    /// Ask the model to acknowledge without acting yet
    SilentAck,
    /// Restrict output to plain text
    TextOnly,
    /// Restrict output to code blocks
    CodeOnly,
    /// Translate into Traditional Chinese (Taiwan)
    Translate,
}

impl Mode {
    /// All modes in display order
    pub const ALL: [Mode; 5] = [
        Mode::Auto,
        Mode::SilentAck,
        Mode::TextOnly,
        Mode::CodeOnly,
        Mode::Translate,
    ];

    /// Label shown in the mode selector
    pub fn label(&self) -> &'static str {
        match self {
            Self::Auto => "🚀 智能預設 (Auto)",
            Self::SilentAck => "🤫 靜默接收 (Silent Ack)",
            Self::TextOnly => "📝 純文字模式 (Text Only)",
            Self::CodeOnly => "🐍 純代碼模式 (Code Only)",
            Self::Translate => "🌍 翻譯成繁中 (Translate)",
        }
    }

    /// Text prepended to the composed prompt
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Auto => "",
            Self::SilentAck => {
                "【系統提示】：請接收以下輸入內容，但【先不要執行】任何任務。簡單回覆『🆗 收到』即可。\n\n----------------\n\n"
            }
            Self::TextOnly => {
                "【系統提示】：輸出結果必須嚴格限制為「純文字」。禁止生成圖片或程式碼。\n\n----------------\n\n"
            }
            Self::CodeOnly => "【系統提示】：針對用戶的問題，【只輸出程式碼區塊】。不要有任何解釋。\n\n----------------\n\n",
            Self::Translate => "【系統提示】：請將以下內容翻譯成自然、通順的「台灣繁體中文」。\n\n----------------\n\n",
        }
    }

    /// Position in [`Mode::ALL`]
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|m| m == self).unwrap_or(0)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Errors from composing a task's prompt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("Task has no template")]
    MissingTemplate,

    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Convert a snapshot into template arguments
///
/// Multi values of `__multi` variables are joined with `、`; every other value
/// is stringified as-is.
pub fn format_inputs(snapshot: &InputSnapshot) -> HashMap<String, String> {
    snapshot
        .iter()
        .map(|(name, value)| {
            let text = match value {
                InputValue::Text(text) => text.clone(),
                InputValue::Multi(values) if name.ends_with(MULTI_SUFFIX) => values
                    .iter()
                    .map(display_value)
                    .collect::<Vec<_>>()
                    .join(MULTI_SEPARATOR),
                InputValue::Multi(values) => display_value(&serde_json::Value::Array(values.clone())),
                InputValue::Choice(value) => display_value(value),
            };
            (name.clone(), text)
        })
        .collect()
}

/// Compose `prefix` + `template` filled from `snapshot`
pub fn compose(template: &str, snapshot: &InputSnapshot, prefix: &str) -> Result<String, TemplateError> {
    debug!(template_len = template.len(), vars = snapshot.len(), "compose: called");
    let parsed = Template::parse(template)?;
    let body = parsed.render(&format_inputs(snapshot))?;
    Ok(format!("{}{}", prefix, body))
}

/// Compose the prompt for `task` under `mode`
pub fn compose_task(task: &Task, snapshot: &InputSnapshot, mode: Mode) -> Result<String, ComposeError> {
    let template = task.template.as_deref().ok_or(ComposeError::MissingTemplate)?;
    let prompt = compose(template, snapshot, mode.prefix())?;
    info!("Composed prompt ({} chars, mode: {:?})", prompt.chars().count(), mode);
    Ok(prompt)
}
