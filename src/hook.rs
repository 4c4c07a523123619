//! Hook request handling
//!
//! Routes one hook input to the matcher, records session-tracked matches
//! and builds the response.

use std::path::Path;

use crate::audit::EventKind;
use crate::engine::{EnvSource, Match, RuleMatcher};
use crate::input::{HookEvent, HookInput};
use crate::output::{Decision, HookOutput};
use crate::session::SessionStore;

/// Match nothing (still audited)
pub const DISABLED_VAR: &str = "SKILL_RULES_DISABLED";

/// Downgrade blocks to warnings
pub const WARN_ONLY_VAR: &str = "SKILL_RULES_WARN_ONLY";

/// Runtime switches for one hook invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct HookOptions {
    pub disabled: bool,
    pub warn_only: bool,
}

impl HookOptions {
    pub fn from_env(env: &impl EnvSource) -> Self {
        Self {
            disabled: env.is_set(DISABLED_VAR),
            warn_only: env.is_set(WARN_ONLY_VAR),
        }
    }
}

/// Result of handling one hook input
#[derive(Debug)]
pub struct HookOutcome {
    pub event: EventKind,
    pub matches: Vec<Match>,
    pub decision: Decision,
    pub output: HookOutput,
}

/// Handle one hook input
///
/// Matches the event, records session-tracked matches in `sessions` (and
/// saves them), then combines the matches into a decision. Prompt events
/// never record block rules, so mentioning a guardrail in a prompt does
/// not use up its block.
pub fn handle(
    input: &HookInput,
    matcher: &RuleMatcher,
    sessions: &mut SessionStore,
    project_dir: &Path,
    options: HookOptions,
    env: &impl EnvSource,
) -> HookOutcome {
    let event = input.event(project_dir);
    let kind = match &event {
        HookEvent::Prompt(_) => EventKind::Prompt,
        HookEvent::File(_) => EventKind::File,
        HookEvent::Other => EventKind::Other,
    };

    if options.disabled {
        return HookOutcome {
            event: kind,
            matches: Vec::new(),
            decision: Decision::Allow,
            output: HookOutput::allow(),
        };
    }

    let session_id = input.session_id();
    let session = sessions.session(session_id);

    let matches = match &event {
        HookEvent::Prompt(text) => matcher.match_prompt_with_env(text, session, env),
        HookEvent::File(file) => matcher.match_file_event_with_env(file, session, env),
        HookEvent::Other => Vec::new(),
    };

    // A block rule only counts as used once a file event enforces it
    let is_file = kind == EventKind::File;
    let enforced = matches.iter().filter(|m| is_file || !m.is_block());
    if session.record_matches(enforced) > 0 {
        if let Err(e) = sessions.save(session_id) {
            eprintln!("Warning: Failed to save session state: {}", e);
        }
    }

    let mut decision = match &event {
        HookEvent::Prompt(_) => Decision::from_prompt_matches(&matches),
        HookEvent::File(_) => Decision::from_file_matches(&matches),
        HookEvent::Other => Decision::Allow,
    };
    if options.warn_only {
        decision = decision.into_warn_only();
    }

    let output = match kind {
        EventKind::Prompt => HookOutput::for_prompt(&decision),
        EventKind::File | EventKind::Other => HookOutput::for_tool(&decision),
    };

    HookOutcome {
        event: kind,
        matches,
        decision,
        output,
    }
}
