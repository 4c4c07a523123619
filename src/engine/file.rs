//! File event matching
//!
//! Checks a Write/Edit event against each rule's path globs, exclusions,
//! content patterns and create-only flag.

use glob::{MatchOptions, Pattern};

use super::common::{has_file_marker, skipped_by_context, sort_matches, EnvSource};
use super::{FileEvent, Match, MatchReason};
use crate::rules::{Action, FileTriggers, RuleSet};
use crate::session::SessionState;

/// `*` stays inside one path component; `**` crosses directories
const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Rules whose file triggers fire for `event`, highest priority first
///
/// Block matches carry the rendered block message.
pub fn match_file_event(
    event: &FileEvent,
    rules: &RuleSet,
    session: &SessionState,
    env: &impl EnvSource,
) -> Vec<Match> {
    let path = normalize_path(&event.path);
    let content = event.content.as_deref();

    let mut matches: Vec<Match> = rules
        .iter()
        .filter(|rule| !skipped_by_context(rule, session, env))
        .filter(|rule| !has_file_marker(rule, content))
        .filter_map(|rule| {
            let triggers = rule.file_triggers.as_ref()?;
            let glob = matching_glob(triggers, &path, content, event.is_create)?;
            let message = match &rule.action {
                Action::Block(template) => Some(template.render(&event.path)),
                Action::Suggest | Action::Warn => None,
            };
            Some(Match::new(rule, MatchReason::PathPattern(glob.to_string()), message))
        })
        .collect();

    sort_matches(&mut matches);
    matches
}

/// The include glob that fired, if every file condition holds
fn matching_glob<'a>(
    triggers: &'a FileTriggers,
    path: &str,
    content: Option<&str>,
    is_create: bool,
) -> Option<&'a Pattern> {
    if triggers.create_only && !is_create {
        return None;
    }

    let glob = triggers
        .path_patterns
        .iter()
        .find(|p| p.matches_with(path, GLOB_OPTIONS))?;

    if triggers
        .path_exclusions
        .iter()
        .any(|p| p.matches_with(path, GLOB_OPTIONS))
    {
        return None;
    }

    if let Some(patterns) = &triggers.content_patterns {
        let content = content?;
        if !patterns.iter().any(|re| re.is_match(content)) {
            return None;
        }
    }

    Some(glob)
}

/// Use forward slashes so Windows-style paths match the same globs
fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
