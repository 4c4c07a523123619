//! Rule matching engine for skill-rules
//!
//! Decides which rules apply to a user prompt or a file event. Matching is
//! pure: it reads the rule set, the session context and the environment,
//! and returns every match. Recording used rules is up to the caller.

pub mod common;
pub mod file;
pub mod prompt;

pub use common::{EnvSource, ProcessEnv};
pub use file::match_file_event;
pub use prompt::match_prompt;

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::error::RuleSetError;
use crate::rules::{Enforcement, Priority, Rule, RuleKind, RuleSet};
use crate::session::SessionState;

/// Why a rule matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "trigger", content = "value", rename_all = "snake_case")]
pub enum MatchReason {
    /// A prompt contained this keyword
    Keyword(String),

    /// A prompt matched this intent pattern
    IntentPattern(String),

    /// A file path matched this glob
    PathPattern(String),
}

/// A rule that applies to an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub rule: String,
    pub kind: RuleKind,
    pub enforcement: Enforcement,
    pub priority: Priority,
    pub reason: MatchReason,

    /// The rule skips itself once recorded in the session
    pub session_tracked: bool,

    /// Rendered block message (block rules on file events only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Match {
    pub(crate) fn new(rule: &Rule, reason: MatchReason, message: Option<String>) -> Self {
        Self {
            rule: rule.name.clone(),
            kind: rule.kind,
            enforcement: rule.enforcement(),
            priority: rule.priority,
            reason,
            session_tracked: rule.skip.session_skill_used,
            message,
            description: rule.description.clone(),
        }
    }

    pub fn is_block(&self) -> bool {
        self.enforcement == Enforcement::Block
    }
}

/// A file-system event to match against file triggers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: String,

    /// Content being written, if known
    pub content: Option<String>,

    /// The event creates a new file
    pub is_create: bool,
}

impl FileEvent {
    pub fn new(path: impl Into<String>, content: Option<String>, is_create: bool) -> Self {
        Self {
            path: path.into(),
            content,
            is_create,
        }
    }
}

/// Matcher over a shared, read-only rule set
///
/// Cloning is cheap; clones share the same rule set and can serve
/// different sessions on different threads.
#[derive(Debug, Clone, Default)]
pub struct RuleMatcher {
    rules: Arc<RuleSet>,
}

impl RuleMatcher {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    pub fn from_shared(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn shared(&self) -> Arc<RuleSet> {
        Arc::clone(&self.rules)
    }

    /// Replace the rule set from JSON text
    ///
    /// On error the current rule set stays active.
    pub fn reload_from_str(&mut self, json: &str) -> Result<(), RuleSetError> {
        let rules = RuleSet::from_json(json)?;
        self.rules = Arc::new(rules);
        Ok(())
    }

    /// Replace the rule set from a file
    ///
    /// On error the current rule set stays active.
    pub fn reload_from_file(&mut self, path: &Path) -> Result<(), RuleSetError> {
        let rules = RuleSet::from_file(path)?;
        self.rules = Arc::new(rules);
        Ok(())
    }

    /// Match a user prompt, reading overrides from the process environment
    pub fn match_prompt(&self, text: &str, session: &SessionState) -> Vec<Match> {
        match_prompt(text, &self.rules, session, &ProcessEnv)
    }

    pub fn match_prompt_with_env(
        &self,
        text: &str,
        session: &SessionState,
        env: &impl EnvSource,
    ) -> Vec<Match> {
        match_prompt(text, &self.rules, session, env)
    }

    /// Match a file event, reading overrides from the process environment
    pub fn match_file_event(&self, event: &FileEvent, session: &SessionState) -> Vec<Match> {
        match_file_event(event, &self.rules, session, &ProcessEnv)
    }

    pub fn match_file_event_with_env(
        &self,
        event: &FileEvent,
        session: &SessionState,
        env: &impl EnvSource,
    ) -> Vec<Match> {
        match_file_event(event, &self.rules, session, env)
    }
}
