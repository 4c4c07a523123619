//! Input parsing for Claude Code hook JSON format
//!
//! Parses the JSON document Claude Code sends to hooks on stdin and turns
//! it into something the matcher understands.

use serde::Deserialize;
use std::path::Path;

use crate::engine::FileEvent;

/// Main input structure from Claude Code hooks
#[derive(Debug, Deserialize)]
pub struct HookInput {
    /// Hook event name (e.g., "UserPromptSubmit", "PreToolUse")
    #[serde(default)]
    pub hook_event_name: Option<String>,

    /// Optional session identifier
    #[serde(default)]
    pub session_id: Option<String>,

    /// Working directory of the host
    #[serde(default)]
    pub cwd: Option<String>,

    /// Prompt text (UserPromptSubmit)
    #[serde(default)]
    pub prompt: Option<String>,

    /// Name of the tool being invoked (PreToolUse)
    #[serde(default)]
    pub tool_name: Option<String>,

    /// Tool-specific input parameters (PreToolUse)
    #[serde(default)]
    pub tool_input: Option<ToolInput>,
}

/// One replacement in a MultiEdit call
#[derive(Debug, Clone, Deserialize)]
pub struct EditOp {
    #[serde(default)]
    pub old_string: String,
    pub new_string: String,
}

/// Tool-specific input variants
#[derive(Debug, Clone)]
pub enum ToolInput {
    /// File write (create or overwrite)
    Write { file_path: String, content: String },

    /// Single replacement edit
    Edit {
        file_path: String,
        old_string: String,
        new_string: String,
    },

    /// Several replacements in one file
    MultiEdit { file_path: String, edits: Vec<EditOp> },

    /// File read
    Read { file_path: String },

    /// Anything else - not matched
    Unknown { raw: serde_json::Value },
}

impl<'de> Deserialize<'de> for ToolInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;

        let Some(obj) = value.as_object() else {
            return Ok(ToolInput::Unknown { raw: value });
        };
        let Some(file_path) = obj.get("file_path").and_then(|v| v.as_str()) else {
            return Ok(ToolInput::Unknown { raw: value });
        };
        let file_path = file_path.to_string();

        // MultiEdit has an edits array
        if let Some(edits) = obj.get("edits") {
            let edits: Vec<EditOp> =
                serde_json::from_value(edits.clone()).map_err(serde::de::Error::custom)?;
            return Ok(ToolInput::MultiEdit { file_path, edits });
        }

        // Edit has old_string and new_string
        if let (Some(old_string), Some(new_string)) = (
            obj.get("old_string").and_then(|v| v.as_str()),
            obj.get("new_string").and_then(|v| v.as_str()),
        ) {
            return Ok(ToolInput::Edit {
                file_path,
                old_string: old_string.to_string(),
                new_string: new_string.to_string(),
            });
        }

        // Write has content
        if let Some(content) = obj.get("content").and_then(|v| v.as_str()) {
            return Ok(ToolInput::Write {
                file_path,
                content: content.to_string(),
            });
        }

        Ok(ToolInput::Read { file_path })
    }
}

/// What the hook is being asked about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    Prompt(String),
    File(FileEvent),
    Other,
}

impl HookInput {
    /// Parse input from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Classify the input relative to `project_dir`
    pub fn event(&self, project_dir: &Path) -> HookEvent {
        if let Some(prompt) = &self.prompt {
            return HookEvent::Prompt(prompt.clone());
        }
        match self.file_event(project_dir) {
            Some(event) => HookEvent::File(event),
            None => HookEvent::Other,
        }
    }

    /// Build a file event for Write, Edit and MultiEdit calls
    ///
    /// Paths inside `project_dir` become project-relative so rule globs can
    /// be written relative to the project root.
    pub fn file_event(&self, project_dir: &Path) -> Option<FileEvent> {
        let (file_path, content, is_write) = match self.tool_input.as_ref()? {
            ToolInput::Write { file_path, content } => (file_path, content.clone(), true),
            ToolInput::Edit {
                file_path,
                new_string,
                ..
            } => (file_path, new_string.clone(), false),
            ToolInput::MultiEdit { file_path, edits } => {
                let joined = edits
                    .iter()
                    .map(|e| e.new_string.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                (file_path, joined, false)
            }
            ToolInput::Read { .. } | ToolInput::Unknown { .. } => return None,
        };

        let absolute = resolve(project_dir, file_path);
        let is_create = is_write && !absolute.exists();

        Some(FileEvent {
            path: relative_path(project_dir, file_path),
            content: Some(content),
            is_create,
        })
    }

    /// Session id, or the shared default when the host sent none
    pub fn session_id(&self) -> &str {
        self.session_id
            .as_deref()
            .unwrap_or(crate::session::DEFAULT_SESSION_ID)
    }

    /// Get a summary of the input for logging
    pub fn summary(&self) -> String {
        if let Some(prompt) = &self.prompt {
            return format!("Prompt: {}", truncate(prompt, 100));
        }
        match &self.tool_input {
            Some(ToolInput::Write { file_path, .. }) => format!("Write: {}", file_path),
            Some(ToolInput::Edit { file_path, .. }) => format!("Edit: {}", file_path),
            Some(ToolInput::MultiEdit { file_path, edits }) => {
                format!("MultiEdit: {} ({} edits)", file_path, edits.len())
            }
            Some(ToolInput::Read { file_path }) => format!("Read: {}", file_path),
            Some(ToolInput::Unknown { .. }) | None => format!(
                "Unknown: {}",
                self.tool_name.as_deref().unwrap_or("no tool")
            ),
        }
    }
}

fn resolve(project_dir: &Path, file_path: &str) -> std::path::PathBuf {
    let path = Path::new(file_path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_dir.join(path)
    }
}

/// `file_path` relative to `project_dir` when it lies inside it
fn relative_path(project_dir: &Path, file_path: &str) -> String {
    Path::new(file_path)
        .strip_prefix(project_dir)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .map(|rel| rel.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
