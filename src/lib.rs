//! skill-rules - Skill activation and guardrail rules for Claude Code hooks
//!
//! This library decides which skills apply to a user prompt or a file
//! edit, driven by a `skill-rules.json` rule set.
//!
//! # Features
//!
//! - **Load-time validation**: regexes, globs and required fields are checked
//!   once, with errors naming the rule and field
//! - **Prompt matching**: case-insensitive keywords and intent regexes
//! - **File matching**: path globs, exclusions, content regexes, create-only rules
//! - **Skip conditions**: once per session, in-file markers, environment overrides
//! - **Guardrails**: block rules render their message with the file path
//! - **Audit logging**: JSONL log of all decisions
//!
//! # Example
//!
//! ```
//! use skill_rules::{FileEvent, RuleMatcher, RuleSet, SessionState};
//!
//! let rules = RuleSet::from_json(r#"{
//!     "version": "1.0",
//!     "skills": {
//!         "database-verification": {
//!             "type": "guardrail",
//!             "enforcement": "block",
//!             "priority": "critical",
//!             "fileTriggers": {"pathPatterns": ["**/*.sql"]},
//!             "blockMessage": "Review {file_path} for schema safety"
//!         }
//!     }
//! }"#).unwrap();
//!
//! let matcher = RuleMatcher::new(rules);
//! let session = SessionState::new("session-1");
//! let event = FileEvent::new("migrations/001.sql", Some(String::new()), true);
//!
//! let matches = matcher.match_file_event(&event, &session);
//! assert_eq!(matches.len(), 1);
//! assert_eq!(
//!     matches[0].message.as_deref(),
//!     Some("Review migrations/001.sql for schema safety")
//! );
//! ```

pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod hook;
pub mod input;
pub mod output;
pub mod rules;
pub mod session;

// Re-exports for convenience
pub use config::Config;
pub use engine::{FileEvent, Match, MatchReason, RuleMatcher};
pub use error::RuleSetError;
pub use input::HookInput;
pub use output::{Decision, HookOutput};
pub use rules::{Enforcement, Priority, RuleKind, RuleSet};
pub use session::{SessionState, SessionStore};
