//! Rule set loading and validation
//!
//! Turns a raw document into a [`RuleSet`]. All regex and glob compilation
//! happens here so matching never has to deal with a bad pattern.

use glob::Pattern;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use std::path::Path;

use super::schema::{RawFileTriggers, RawPromptTriggers, RawRule, RawSkipConditions, RuleSetDocument};
use super::{Action, BlockTemplate, Enforcement, FileTriggers, PromptTriggers, Rule, RuleSet, SkipConditions};
use crate::error::RuleSetError;

/// Upper bound on compiled program size for a single pattern
const REGEX_SIZE_LIMIT: usize = 1 << 20;

impl RuleSet {
    /// Parse and validate a rule set from JSON text
    pub fn from_json(json: &str) -> Result<Self, RuleSetError> {
        let doc: RuleSetDocument = serde_json::from_str(json)?;
        Self::from_document(doc)
    }

    /// Load and validate a rule set from a file
    pub fn from_file(path: &Path) -> Result<Self, RuleSetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validate a parsed document
    pub fn from_document(doc: RuleSetDocument) -> Result<Self, RuleSetError> {
        check_version(&doc.version)?;

        let mut rules = BTreeMap::new();
        for (name, value) in doc.skills.0 {
            if rules.contains_key(&name) {
                return Err(RuleSetError::DuplicateRule(name));
            }

            let raw: RawRule =
                serde_json::from_value(value).map_err(|source| RuleSetError::MalformedRule {
                    rule: name.clone(),
                    source,
                })?;

            let rule = compile_rule(&name, raw)?;
            rules.insert(name, rule);
        }

        Ok(RuleSet::from_parts(doc.version, rules))
    }
}

fn check_version(version: &str) -> Result<(), RuleSetError> {
    let major = version.split('.').next().unwrap_or_default();
    if major.trim() == "1" {
        Ok(())
    } else {
        Err(RuleSetError::UnsupportedVersion(version.to_string()))
    }
}

/// Compile one raw rule
fn compile_rule(name: &str, raw: RawRule) -> Result<Rule, RuleSetError> {
    let action = match raw.enforcement {
        Enforcement::Block => {
            let message = raw
                .block_message
                .filter(|m| !m.trim().is_empty())
                .ok_or_else(|| {
                    RuleSetError::invalid(name, "blockMessage", "required when enforcement is block")
                })?;
            Action::Block(BlockTemplate::new(message))
        }
        Enforcement::Suggest => Action::Suggest,
        Enforcement::Warn => Action::Warn,
    };

    let prompt_triggers = raw
        .prompt_triggers
        .map(|t| compile_prompt_triggers(name, t))
        .transpose()?;

    let file_triggers = raw
        .file_triggers
        .map(|t| compile_file_triggers(name, t))
        .transpose()?;

    let skip = compile_skip_conditions(name, raw.skip_conditions.unwrap_or_default())?;

    Ok(Rule {
        name: name.to_string(),
        kind: raw.kind,
        priority: raw.priority,
        action,
        description: raw.description,
        prompt_triggers,
        file_triggers,
        skip,
    })
}

fn compile_prompt_triggers(
    name: &str,
    raw: RawPromptTriggers,
) -> Result<PromptTriggers, RuleSetError> {
    let mut keywords = Vec::with_capacity(raw.keywords.len());
    for keyword in raw.keywords {
        if keyword.trim().is_empty() {
            return Err(RuleSetError::invalid(
                name,
                "promptTriggers.keywords",
                "keywords must not be empty",
            ));
        }
        let lower = keyword.to_lowercase();
        keywords.push((keyword, lower));
    }

    let intent_patterns = raw
        .intent_patterns
        .iter()
        .map(|p| compile_regex(name, "promptTriggers.intentPatterns", p, true))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PromptTriggers {
        keywords,
        intent_patterns,
    })
}

fn compile_file_triggers(name: &str, raw: RawFileTriggers) -> Result<FileTriggers, RuleSetError> {
    if raw.path_patterns.is_empty() {
        return Err(RuleSetError::invalid(
            name,
            "fileTriggers.pathPatterns",
            "at least one path pattern is required",
        ));
    }

    let path_patterns = raw
        .path_patterns
        .iter()
        .map(|p| compile_glob(name, "fileTriggers.pathPatterns", p))
        .collect::<Result<Vec<_>, _>>()?;

    let path_exclusions = raw
        .path_exclusions
        .iter()
        .map(|p| compile_glob(name, "fileTriggers.pathExclusions", p))
        .collect::<Result<Vec<_>, _>>()?;

    let content_patterns = match raw.content_patterns {
        Some(patterns) if !patterns.is_empty() => Some(
            patterns
                .iter()
                .map(|p| compile_regex(name, "fileTriggers.contentPatterns", p, false))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        _ => None,
    };

    Ok(FileTriggers {
        path_patterns,
        path_exclusions,
        content_patterns,
        create_only: raw.create_only,
    })
}

fn compile_skip_conditions(
    name: &str,
    raw: RawSkipConditions,
) -> Result<SkipConditions, RuleSetError> {
    if raw.file_markers.iter().any(|m| m.is_empty()) {
        return Err(RuleSetError::invalid(
            name,
            "skipConditions.fileMarkers",
            "markers must not be empty",
        ));
    }

    let env_override = match raw.env_override {
        Some(var) if var.trim().is_empty() => {
            return Err(RuleSetError::invalid(
                name,
                "skipConditions.envOverride",
                "variable name must not be empty",
            ));
        }
        other => other,
    };

    Ok(SkipConditions {
        session_skill_used: raw.session_skill_used,
        file_markers: raw.file_markers,
        env_override,
    })
}

fn compile_regex(
    name: &str,
    field: &'static str,
    pattern: &str,
    case_insensitive: bool,
) -> Result<Regex, RuleSetError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| RuleSetError::invalid(name, field, format!("invalid regex {:?}: {}", pattern, e)))
}

fn compile_glob(name: &str, field: &'static str, pattern: &str) -> Result<Pattern, RuleSetError> {
    Pattern::new(&pattern.replace('\\', "/"))
        .map_err(|e| RuleSetError::invalid(name, field, format!("invalid glob {:?}: {}", pattern, e)))
}
