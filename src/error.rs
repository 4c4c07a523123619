//! Error types for rule set loading
//!
//! Every validation failure names the offending rule and field so the
//! author of `skill-rules.json` can find it without guessing.

/// Failure to load or validate a rule set document
#[derive(Debug, thiserror::Error)]
pub enum RuleSetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid rule set document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported rule set version {0:?} (expected 1.x)")]
    UnsupportedVersion(String),

    #[error("duplicate rule name: {0}")]
    DuplicateRule(String),

    /// The rule's JSON did not fit the schema (missing field, bad enum value)
    #[error("rule `{rule}`: {source}")]
    MalformedRule {
        rule: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rule `{rule}`, field `{field}`: {reason}")]
    InvalidField {
        rule: String,
        field: &'static str,
        reason: String,
    },
}

impl RuleSetError {
    pub(crate) fn invalid(rule: &str, field: &'static str, reason: impl Into<String>) -> Self {
        RuleSetError::InvalidField {
            rule: rule.to_string(),
            field,
            reason: reason.into(),
        }
    }

    /// Name of the rule that failed validation, if the error is rule-specific
    pub fn rule(&self) -> Option<&str> {
        match self {
            RuleSetError::DuplicateRule(rule) => Some(rule),
            RuleSetError::MalformedRule { rule, .. } => Some(rule),
            RuleSetError::InvalidField { rule, .. } => Some(rule),
            _ => None,
        }
    }

    /// Field that failed validation, if known
    pub fn field(&self) -> Option<&str> {
        match self {
            RuleSetError::InvalidField { field, .. } => Some(field),
            _ => None,
        }
    }
}
