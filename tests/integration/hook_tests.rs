//! Integration tests for end-to-end hook handling

use std::collections::HashMap;
use std::path::Path;

use skill_rules::audit::{AuditLogger, EventKind};
use skill_rules::hook::{self, HookOptions};
use skill_rules::{Decision, HookInput, MatchReason, RuleMatcher, RuleSet, SessionStore};
use tempfile::TempDir;

const FIXTURE: &str = include_str!("../fixtures/skill-rules.json");

fn no_env() -> HashMap<String, String> {
    HashMap::new()
}

fn matcher() -> RuleMatcher {
    RuleMatcher::new(RuleSet::from_json(FIXTURE).unwrap())
}

fn run(json: &str, sessions: &mut SessionStore, project: &Path) -> hook::HookOutcome {
    let input = HookInput::from_json(json).unwrap();
    hook::handle(
        &input,
        &matcher(),
        sessions,
        project,
        HookOptions::default(),
        &no_env(),
    )
}

fn write_json(project: &Path, rel: &str, session: &str) -> String {
    serde_json::json!({
        "hook_event_name": "PreToolUse",
        "session_id": session,
        "tool_name": "Write",
        "tool_input": {
            "file_path": project.join(rel).to_string_lossy(),
            "content": "CREATE TABLE users (id int);"
        }
    })
    .to_string()
}

#[test]
fn test_prompt_injects_reminder() {
    let json = r#"{"hook_event_name":"UserPromptSubmit","session_id":"p1","prompt":"Add a column to the orders table"}"#;
    let outcome = run(json, &mut SessionStore::in_memory(), Path::new("/project"));

    assert_eq!(outcome.event, EventKind::Prompt);
    assert!(matches!(outcome.decision, Decision::Suggest { .. }));

    let output = outcome.output.to_json();
    assert!(output.contains(r#""hookEventName":"UserPromptSubmit""#));
    assert!(output.contains("REQUIRED SKILLS"));
    assert!(output.contains("database-verification"));
}

#[test]
fn test_prompt_without_match_is_empty_output() {
    let json = r#"{"hook_event_name":"UserPromptSubmit","prompt":"hello there"}"#;
    let outcome = run(json, &mut SessionStore::in_memory(), Path::new("/project"));
    assert!(outcome.decision.is_allow());
    assert_eq!(outcome.output.to_json(), "{}");
}

#[test]
fn test_new_sql_file_denied_with_relative_path() {
    let project = TempDir::new().unwrap();
    let json = write_json(project.path(), "migrations/001.sql", "f1");
    let outcome = run(&json, &mut SessionStore::in_memory(), project.path());

    assert!(outcome.decision.is_deny());
    assert_eq!(
        outcome.matches[0].reason,
        MatchReason::PathPattern("**/*.sql".to_string())
    );

    let output = outcome.output.to_json();
    assert!(output.contains(r#""permissionDecision":"deny""#));
    assert!(output.contains("Review migrations/001.sql for schema safety"));
}

#[test]
fn test_guardrail_state_persists_between_invocations() {
    let project = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let json = write_json(project.path(), "db/002.sql", "f2");

    let first = run(&json, &mut SessionStore::persistent(state.path()), project.path());
    assert!(first.decision.is_deny());

    // A new process for the next tool call in the same session
    let second = run(&json, &mut SessionStore::persistent(state.path()), project.path());
    assert!(second.decision.is_allow());

    let other_session = write_json(project.path(), "db/002.sql", "f3");
    let third = run(&other_session, &mut SessionStore::persistent(state.path()), project.path());
    assert!(third.decision.is_deny());
}

#[test]
fn test_prompt_mention_does_not_use_up_guardrail() {
    let project = TempDir::new().unwrap();
    let mut sessions = SessionStore::in_memory();

    let prompt = r#"{"hook_event_name":"UserPromptSubmit","session_id":"g1","prompt":"write a migration"}"#;
    let suggested = run(prompt, &mut sessions, project.path());
    assert_eq!(suggested.decision.rules(), ["database-verification".to_string()]);
    assert!(!sessions.session("g1").has_used("database-verification"));

    let write = write_json(project.path(), "migrations/001.sql", "g1");
    let blocked = run(&write, &mut sessions, project.path());
    assert!(blocked.decision.is_deny());
    assert!(sessions.session("g1").has_used("database-verification"));

    let again = run(&write, &mut sessions, project.path());
    assert!(again.decision.is_allow());
}

#[test]
fn test_prompt_reminder_includes_description() {
    let json = r#"{"hook_event_name":"UserPromptSubmit","session_id":"d1","prompt":"schema change"}"#;
    let outcome = run(json, &mut SessionStore::in_memory(), Path::new("/project"));

    let Decision::Suggest { context, .. } = &outcome.decision else {
        panic!("expected a suggestion, got {:?}", outcome.decision);
    };
    assert!(context.contains(
        "  -> database-verification (guardrail): Verify column names and migrations before touching the schema\n"
    ));
}

#[test]
fn test_read_tool_ignored() {
    let json = r#"{"hook_event_name":"PreToolUse","tool_name":"Read","tool_input":{"file_path":"db/001.sql"}}"#;
    let outcome = run(json, &mut SessionStore::in_memory(), Path::new("/project"));
    assert_eq!(outcome.event, EventKind::Other);
    assert!(outcome.matches.is_empty());
    assert_eq!(outcome.output.to_json(), "{}");
}

#[test]
fn test_audit_records_block() {
    let project = TempDir::new().unwrap();
    let audit = TempDir::new().unwrap();
    let audit_path = audit.path().join("audit.jsonl");

    let json = write_json(project.path(), "db/003.sql", "a1");
    let input = HookInput::from_json(&json).unwrap();
    let outcome = hook::handle(
        &input,
        &matcher(),
        &mut SessionStore::in_memory(),
        project.path(),
        HookOptions::default(),
        &no_env(),
    );

    let mut logger = AuditLogger::new(Some(audit_path.as_path()));
    logger
        .log_decision(&input, outcome.event, &outcome.decision, false)
        .unwrap();

    let log = std::fs::read_to_string(&audit_path).unwrap();
    let entry: serde_json::Value = serde_json::from_str(log.lines().next().unwrap()).unwrap();
    assert_eq!(entry["level"], "BLOCKED");
    assert_eq!(entry["event"], "file");
    assert_eq!(entry["rules"][0], "database-verification");
    assert_eq!(entry["session_id"], "a1");
}
