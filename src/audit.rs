//! JSONL audit logging for skill-rules
//!
//! Records every hook decision to a JSONL file for later analysis.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::input::HookInput;
use crate::output::Decision;

/// Log level for audit entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Blocked,
    Warned,
    Suggested,
    NoMatch,
    Disabled,
}

/// Kind of event that was evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Prompt,
    File,
    Other,
}

/// An audit log entry
#[derive(Debug, Serialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,

    pub level: LogLevel,

    pub event: EventKind,

    /// Rules behind the decision, highest priority first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<String>,

    pub input_summary: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl AuditEntry {
    /// Create a new audit entry from input and decision
    pub fn new(input: &HookInput, event: EventKind, decision: &Decision, disabled: bool) -> Self {
        let (level, message) = if disabled {
            (LogLevel::Disabled, Some("SKILL_RULES_DISABLED".to_string()))
        } else {
            match decision {
                Decision::Allow => (LogLevel::NoMatch, None),
                Decision::Suggest { .. } => (LogLevel::Suggested, None),
                Decision::Warn { reason, .. } => (LogLevel::Warned, Some(reason.clone())),
                Decision::Deny { reason, .. } => (LogLevel::Blocked, Some(reason.clone())),
            }
        };

        Self {
            timestamp: Utc::now(),
            level,
            event,
            rules: decision.rules().to_vec(),
            input_summary: input.summary(),
            message,
            session_id: input.session_id.clone(),
        }
    }
}

/// Audit logger
#[derive(Default)]
pub struct AuditLogger {
    writer: Option<BufWriter<File>>,
}

impl AuditLogger {
    /// Create a new audit logger; `None` or an unopenable path disables it
    pub fn new(path: Option<&Path>) -> Self {
        let writer = path.and_then(|p| {
            if let Some(parent) = p.parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            OpenOptions::new()
                .create(true)
                .append(true)
                .open(p)
                .ok()
                .map(BufWriter::new)
        });

        Self { writer }
    }

    /// Log an audit entry
    pub fn log(&mut self, entry: &AuditEntry) -> Result<(), std::io::Error> {
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(entry)?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Log a decision
    pub fn log_decision(
        &mut self,
        input: &HookInput,
        event: EventKind,
        decision: &Decision,
        disabled: bool,
    ) -> Result<(), std::io::Error> {
        let entry = AuditEntry::new(input, event, decision, disabled);
        self.log(&entry)
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }
}
