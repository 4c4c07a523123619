//! Shared pieces of prompt and file matching
//!
//! Skip conditions and result ordering are the same for both kinds of
//! events.

use std::collections::HashMap;
use std::env;

use super::Match;
use crate::rules::Rule;
use crate::session::SessionState;

/// Read-only view of environment variables
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;

    /// True when `key` is set to a non-empty value
    fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Session and environment skips shared by every event kind
pub fn skipped_by_context(rule: &Rule, session: &SessionState, env: &impl EnvSource) -> bool {
    if rule.skip.session_skill_used && session.has_used(&rule.name) {
        return true;
    }

    if let Some(var) = &rule.skip.env_override {
        if env.is_set(var) {
            return true;
        }
    }

    false
}

/// True when `content` carries one of the rule's skip markers
pub fn has_file_marker(rule: &Rule, content: Option<&str>) -> bool {
    match content {
        Some(content) => rule
            .skip
            .file_markers
            .iter()
            .any(|marker| content.contains(marker.as_str())),
        None => false,
    }
}

/// Sort by priority (critical first), then by rule name
pub fn sort_matches(matches: &mut [Match]) {
    matches.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.rule.cmp(&b.rule))
    });
}
