//! Raw serde view of a `skill-rules.json` document
//!
//! These types mirror the JSON one-to-one. Nothing here is validated
//! beyond what serde checks; see [`crate::rules::loader`] for the
//! compiled form.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

use super::{Enforcement, Priority, RuleKind};

/// Top-level rule set document
#[derive(Debug, Deserialize)]
pub struct RuleSetDocument {
    /// Schema version, e.g. "1.0"
    pub version: String,

    /// Rules keyed by name, in document order
    pub skills: SkillEntries,
}

/// Rule entries in document order
///
/// Kept as a list rather than a map so duplicate names survive parsing
/// and can be reported instead of silently overwritten.
#[derive(Debug, Default)]
pub struct SkillEntries(pub Vec<(String, serde_json::Value)>);

impl<'de> Deserialize<'de> for SkillEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = SkillEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of rule names to rule definitions")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, value)) = map.next_entry::<String, serde_json::Value>()? {
                    entries.push((name, value));
                }
                Ok(SkillEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// A single rule as written in the document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,

    pub enforcement: Enforcement,

    pub priority: Priority,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub prompt_triggers: Option<RawPromptTriggers>,

    #[serde(default)]
    pub file_triggers: Option<RawFileTriggers>,

    #[serde(default)]
    pub block_message: Option<String>,

    #[serde(default)]
    pub skip_conditions: Option<RawSkipConditions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPromptTriggers {
    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub intent_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFileTriggers {
    pub path_patterns: Vec<String>,

    #[serde(default)]
    pub path_exclusions: Vec<String>,

    #[serde(default)]
    pub content_patterns: Option<Vec<String>>,

    #[serde(default)]
    pub create_only: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSkipConditions {
    #[serde(default)]
    pub session_skill_used: bool,

    #[serde(default)]
    pub file_markers: Vec<String>,

    #[serde(default)]
    pub env_override: Option<String>,
}
