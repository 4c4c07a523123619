//! Integration tests for file event matching

use std::collections::HashMap;

use skill_rules::{Enforcement, FileEvent, Match, RuleMatcher, RuleSet, SessionState};

const FIXTURE: &str = include_str!("../fixtures/skill-rules.json");

fn no_env() -> HashMap<String, String> {
    HashMap::new()
}

fn matcher() -> RuleMatcher {
    RuleMatcher::new(RuleSet::from_json(FIXTURE).unwrap())
}

fn check(path: &str, content: &str, is_create: bool) -> Vec<Match> {
    let event = FileEvent::new(path, Some(content.to_string()), is_create);
    matcher().match_file_event_with_env(&event, &SessionState::new("s"), &no_env())
}

fn names(matches: &[Match]) -> Vec<&str> {
    matches.iter().map(|m| m.rule.as_str()).collect()
}

// ============================================================================
// Guardrails - BLOCKED
// ============================================================================

#[test]
fn test_database_verification_example() {
    let rules = RuleSet::from_json(
        r#"{"version": "1.0", "skills": {"database-verification": {
            "type": "guardrail", "enforcement": "block", "priority": "critical",
            "fileTriggers": {"pathPatterns": ["**/*.sql"]},
            "blockMessage": "Review {file_path} for schema safety"
        }}}"#,
    )
    .unwrap();
    let matcher = RuleMatcher::new(rules);
    let event = FileEvent::new("migrations/001.sql", Some(String::new()), true);

    let matches = matcher.match_file_event_with_env(&event, &SessionState::new("s"), &no_env());
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].rule, "database-verification");
    assert_eq!(
        matches[0].message.as_deref(),
        Some("Review migrations/001.sql for schema safety")
    );
}

#[test]
fn test_sql_blocked_at_any_depth() {
    for path in ["schema.sql", "db/migrations/2024/003_users.sql"] {
        let matches = check(path, "ALTER TABLE users;", false);
        assert_eq!(names(&matches), vec!["database-verification"], "{}", path);
        assert_eq!(matches[0].enforcement, Enforcement::Block);
        assert_eq!(
            matches[0].message.as_deref(),
            Some(format!("Review {} for schema safety", path).as_str())
        );
    }
}

#[test]
fn test_literal_path_pattern() {
    assert_eq!(
        names(&check("prisma/schema.prisma", "model User {}", false)),
        vec!["database-verification"]
    );
}

#[test]
fn test_seed_sql_excluded() {
    assert!(check("db/seed/users.sql", "INSERT INTO users;", false).is_empty());
}

#[test]
fn test_marker_skips_guardrail() {
    let content = "-- @skip-validation\nALTER TABLE users ADD COLUMN age int;";
    assert!(check("db/001.sql", content, false).is_empty());
}

#[test]
fn test_guardrail_blocks_once_per_session() {
    let matcher = matcher();
    let mut session = SessionState::new("s1");
    let event = FileEvent::new("db/001.sql", Some(String::new()), false);

    let first = matcher.match_file_event_with_env(&event, &session, &no_env());
    assert_eq!(first.len(), 1);
    session.record_matches(&first);

    assert!(matcher
        .match_file_event_with_env(&event, &session, &no_env())
        .is_empty());
    assert_eq!(
        matcher
            .match_file_event_with_env(&event, &SessionState::new("s2"), &no_env())
            .len(),
        1
    );
}

#[test]
fn test_env_override_skips_guardrail() {
    let mut env = HashMap::new();
    env.insert("SKIP_DB_VERIFICATION_IT".to_string(), "true".to_string());
    let event = FileEvent::new("db/001.sql", Some(String::new()), false);

    assert!(matcher()
        .match_file_event_with_env(&event, &SessionState::new("s"), &env)
        .is_empty());
}

// ============================================================================
// Domain rules - SUGGESTED / WARNED
// ============================================================================

#[test]
fn test_backend_file_suggested() {
    let matches = check("backend/src/services/user.ts", "export class UserService {}", false);
    assert_eq!(names(&matches), vec!["backend-dev-guidelines"]);
    assert!(matches[0].message.is_none());
}

#[test]
fn test_backend_test_file_excluded() {
    assert!(check("backend/src/services/user.test.ts", "it('works')", false).is_empty());
}

#[test]
fn test_content_pattern_adds_warning() {
    let matches = check(
        "backend/src/services/user.ts",
        "try { run() } catch (e) { Sentry.captureException(e) }",
        false,
    );
    assert_eq!(names(&matches), vec!["backend-dev-guidelines", "error-tracking"]);
    assert_eq!(matches[1].enforcement, Enforcement::Warn);
}

#[test]
fn test_content_pattern_needs_content() {
    let event = FileEvent::new("backend/src/services/user.ts", None, false);
    let matches = matcher().match_file_event_with_env(&event, &SessionState::new("s"), &no_env());
    assert_eq!(names(&matches), vec!["backend-dev-guidelines"]);
}

#[test]
fn test_create_only_rule() {
    let created = check("backend/src/routes/orders.ts", "", true);
    assert_eq!(names(&created), vec!["backend-dev-guidelines", "route-scaffolding"]);

    let edited = check("backend/src/routes/orders.ts", "", false);
    assert_eq!(names(&edited), vec!["backend-dev-guidelines"]);
}

#[test]
fn test_frontend_component() {
    assert_eq!(
        names(&check("frontend/src/components/Button.tsx", "", false)),
        vec!["frontend-dev-guidelines"]
    );
    assert!(check("frontend/README.md", "", false).is_empty());
}

#[test]
fn test_guardrail_and_domain_both_returned() {
    let rules = RuleSet::from_json(
        r#"{"version": "1.0", "skills": {
            "guard": {
                "type": "guardrail", "enforcement": "block", "priority": "high",
                "fileTriggers": {"pathPatterns": ["src/**/*.rs"]},
                "blockMessage": "Stop: {file_path}"
            },
            "docs": {
                "type": "domain", "enforcement": "suggest", "priority": "high",
                "fileTriggers": {"pathPatterns": ["src/*.rs"]}
            }
        }}"#,
    )
    .unwrap();
    let event = FileEvent::new("src/lib.rs", None, false);
    let matches = RuleMatcher::new(rules).match_file_event_with_env(
        &event,
        &SessionState::new("s"),
        &no_env(),
    );

    assert_eq!(names(&matches), vec!["docs", "guard"]);
    assert_eq!(matches[1].message.as_deref(), Some("Stop: src/lib.rs"));
}
