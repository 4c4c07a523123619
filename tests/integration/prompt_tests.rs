//! Integration tests for prompt matching

use std::collections::HashMap;
use std::env;

use skill_rules::{MatchReason, Priority, RuleMatcher, RuleSet, SessionState};

const FIXTURE: &str = include_str!("../fixtures/skill-rules.json");

fn matcher() -> RuleMatcher {
    RuleMatcher::new(RuleSet::from_json(FIXTURE).unwrap())
}

fn no_env() -> HashMap<String, String> {
    HashMap::new()
}

fn matched(text: &str) -> Vec<String> {
    matcher()
        .match_prompt_with_env(text, &SessionState::new("s"), &no_env())
        .into_iter()
        .map(|m| m.rule)
        .collect()
}

// ============================================================================
// Keywords and intents
// ============================================================================

#[test]
fn test_layout_keyword() {
    let rules = RuleSet::from_json(
        r#"{"version": "1.0", "skills": {"demo": {
            "type": "domain", "enforcement": "suggest", "priority": "medium",
            "promptTriggers": {"keywords": ["layout"]}
        }}}"#,
    )
    .unwrap();
    let matcher = RuleMatcher::new(rules);
    let session = SessionState::new("s");

    let hits = matcher.match_prompt_with_env("How does the layout system work?", &session, &no_env());
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].rule, "demo");

    let misses = matcher.match_prompt_with_env("How does the grid work?", &session, &no_env());
    assert!(misses.is_empty());
}

#[test]
fn test_multi_word_keyword() {
    assert_eq!(matched("Improve the Error Handling here"), vec!["error-tracking"]);
}

#[test]
fn test_intent_pattern() {
    assert_eq!(
        matched("Please implement a new endpoint for invoices"),
        vec!["backend-dev-guidelines"]
    );
    assert_eq!(
        matched("Can you drop the legacy users table?"),
        vec!["database-verification"]
    );
}

#[test]
fn test_unrelated_prompt() {
    assert!(matched("What time is it?").is_empty());
}

#[test]
fn test_only_triggered_rules_returned() {
    let rules = RuleSet::from_json(FIXTURE).unwrap();
    let matcher = RuleMatcher::new(rules.clone());
    let texts = [
        "fix the react component layout",
        "add a column to orders",
        "route handler in the backend",
        "sentry is noisy",
        "nothing relevant at all",
        "SCHEMA question",
    ];

    for text in texts {
        let lowered = text.to_lowercase();
        for m in matcher.match_prompt_with_env(text, &SessionState::new("s"), &no_env()) {
            let triggers = rules.get(&m.rule).unwrap().prompt_triggers.as_ref().unwrap();
            let keyword_hit = triggers
                .keywords
                .iter()
                .any(|(_, lower)| lowered.contains(lower.as_str()));
            let intent_hit = triggers.intent_patterns.iter().any(|re| re.is_match(text));
            assert!(keyword_hit || intent_hit, "{} matched {:?} without a trigger", m.rule, text);

            match &m.reason {
                MatchReason::Keyword(k) => assert!(lowered.contains(&k.to_lowercase())),
                MatchReason::IntentPattern(_) => assert!(intent_hit),
                MatchReason::PathPattern(_) => panic!("prompt match reported a path pattern"),
            }
        }
    }
}

// ============================================================================
// Ordering and determinism
// ============================================================================

#[test]
fn test_priority_then_name_ordering() {
    let text = "backend migration for the react component with sentry";
    assert_eq!(
        matched(text),
        vec![
            "database-verification",
            "backend-dev-guidelines",
            "frontend-dev-guidelines",
            "error-tracking",
        ]
    );

    let priorities: Vec<Priority> = matcher()
        .match_prompt_with_env(text, &SessionState::new("s"), &no_env())
        .iter()
        .map(|m| m.priority)
        .collect();
    assert!(priorities.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_idempotent() {
    let matcher = matcher();
    let session = SessionState::new("s");
    let text = "backend layout migration";

    let first = matcher.match_prompt_with_env(text, &session, &no_env());
    let second = matcher.match_prompt_with_env(text, &session, &no_env());
    assert_eq!(first, second);
}

// ============================================================================
// Skip conditions
// ============================================================================

#[test]
fn test_session_skip_is_per_session() {
    let matcher = matcher();
    let mut s1 = SessionState::new("s1");
    let s2 = SessionState::new("s2");

    let first = matcher.match_prompt_with_env("schema change", &s1, &no_env());
    assert_eq!(first[0].rule, "database-verification");
    s1.record_matches(&first);

    assert!(matcher
        .match_prompt_with_env("schema change", &s1, &no_env())
        .is_empty());
    assert_eq!(
        matcher.match_prompt_with_env("schema change", &s2, &no_env())[0].rule,
        "database-verification"
    );
}

#[test]
fn test_untracked_rule_not_skipped_by_session() {
    let matcher = matcher();
    let mut session = SessionState::new("s");
    session.record("frontend-dev-guidelines");

    let hits = matcher.match_prompt_with_env("layout", &session, &no_env());
    assert_eq!(hits[0].rule, "frontend-dev-guidelines");
}

#[test]
fn test_env_override_map() {
    let mut env = no_env();
    env.insert("SKIP_DB_VERIFICATION_IT".to_string(), "1".to_string());
    assert!(matcher()
        .match_prompt_with_env("schema change", &SessionState::new("s"), &env)
        .is_empty());
}

#[test]
fn test_env_override_process() {
    let matcher = matcher();
    let session = SessionState::new("s");

    env::set_var("SKIP_DB_VERIFICATION_IT", "1");
    let skipped = matcher.match_prompt("schema change", &session);
    env::remove_var("SKIP_DB_VERIFICATION_IT");

    assert!(skipped.is_empty());
    assert_eq!(matcher.match_prompt("schema change", &session).len(), 1);
}

// ============================================================================
// Shared rule set across sessions
// ============================================================================

#[test]
fn test_rule_set_shared_across_threads() {
    let matcher = matcher();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let matcher = matcher.clone();
            std::thread::spawn(move || {
                let mut session = SessionState::new(format!("thread-{}", i));
                let first = matcher.match_prompt_with_env("schema", &session, &no_env());
                session.record_matches(&first);
                let second = matcher.match_prompt_with_env("schema", &session, &no_env());
                (first.len(), second.len())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), (1, 0));
    }
}
