//! Rule definitions for skill-rules
//!
//! A [`RuleSet`] is the validated, compiled form of a `skill-rules.json`
//! document. It is built once by [`loader`] and never mutated afterwards.

pub mod loader;
pub mod schema;

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What a rule is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Blocks or flags an action until it is addressed
    Guardrail,

    /// Points at relevant reference material
    Domain,
}

/// Action requested when a rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Enforcement {
    Block,
    Suggest,
    Warn,
}

/// Ordering hint among multiple matches
///
/// Variants are declared lowest first so the derived `Ord` puts
/// `Critical` on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Placeholder substituted with the event path in block messages
pub const FILE_PATH_PLACEHOLDER: &str = "{file_path}";

/// A non-empty block message template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTemplate(String);

impl BlockTemplate {
    pub(crate) fn new(template: String) -> Self {
        Self(template)
    }

    /// Substitute `{file_path}` with `path`
    ///
    /// Single pass: a path that itself contains the placeholder text is
    /// inserted literally.
    pub fn render(&self, path: &str) -> String {
        self.0.replace(FILE_PATH_PLACEHOLDER, path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Resolved action of a rule
///
/// A block rule always carries its message template.
#[derive(Debug, Clone)]
pub enum Action {
    Block(BlockTemplate),
    Suggest,
    Warn,
}

impl Action {
    pub fn enforcement(&self) -> Enforcement {
        match self {
            Action::Block(_) => Enforcement::Block,
            Action::Suggest => Enforcement::Suggest,
            Action::Warn => Enforcement::Warn,
        }
    }
}

/// Compiled prompt triggers
#[derive(Debug, Clone)]
pub struct PromptTriggers {
    /// Keywords as written, paired with their lowercase form
    pub keywords: Vec<(String, String)>,

    /// Case-insensitive intent patterns
    pub intent_patterns: Vec<Regex>,
}

/// Compiled file triggers
#[derive(Debug, Clone)]
pub struct FileTriggers {
    pub path_patterns: Vec<Pattern>,
    pub path_exclusions: Vec<Pattern>,

    /// `None` when the document has no (or an empty) `contentPatterns`
    pub content_patterns: Option<Vec<Regex>>,

    pub create_only: bool,
}

/// Conditions that suppress an otherwise matching rule
#[derive(Debug, Clone, Default)]
pub struct SkipConditions {
    /// Skip once the rule has been used in the current session
    pub session_skill_used: bool,

    /// Skip when file content contains any of these markers
    pub file_markers: Vec<String>,

    /// Skip while this environment variable is set and non-empty
    pub env_override: Option<String>,
}

/// A validated rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub kind: RuleKind,
    pub priority: Priority,
    pub action: Action,
    pub description: Option<String>,
    pub prompt_triggers: Option<PromptTriggers>,
    pub file_triggers: Option<FileTriggers>,
    pub skip: SkipConditions,
}

impl Rule {
    pub fn enforcement(&self) -> Enforcement {
        self.action.enforcement()
    }
}

/// The loaded rule set, keyed and iterated by rule name
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    version: String,
    rules: BTreeMap<String, Rule>,
}

impl RuleSet {
    /// An empty rule set that matches nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(version: String, rules: BTreeMap<String, Rule>) -> Self {
        Self { version, rules }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Rules in ascending name order
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
