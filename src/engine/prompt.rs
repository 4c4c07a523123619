//! Prompt matching
//!
//! Checks free-form user text against each rule's keywords and intent
//! patterns.

use super::common::{skipped_by_context, sort_matches, EnvSource};
use super::{Match, MatchReason};
use crate::rules::{PromptTriggers, RuleSet};
use crate::session::SessionState;

/// Rules whose prompt triggers fire for `text`, highest priority first
pub fn match_prompt(
    text: &str,
    rules: &RuleSet,
    session: &SessionState,
    env: &impl EnvSource,
) -> Vec<Match> {
    let lowered = text.to_lowercase();

    let mut matches: Vec<Match> = rules
        .iter()
        .filter(|rule| !skipped_by_context(rule, session, env))
        .filter_map(|rule| {
            let triggers = rule.prompt_triggers.as_ref()?;
            let reason = prompt_reason(triggers, text, &lowered)?;
            Some(Match::new(rule, reason, None))
        })
        .collect();

    sort_matches(&mut matches);
    matches
}

/// First trigger that fires: keywords are checked before intent patterns
fn prompt_reason(triggers: &PromptTriggers, text: &str, lowered: &str) -> Option<MatchReason> {
    if let Some((keyword, _)) = triggers
        .keywords
        .iter()
        .find(|(_, lower)| lowered.contains(lower.as_str()))
    {
        return Some(MatchReason::Keyword(keyword.clone()));
    }

    triggers
        .intent_patterns
        .iter()
        .find(|re| re.is_match(text))
        .map(|re| MatchReason::IntentPattern(re.as_str().to_string()))
}
