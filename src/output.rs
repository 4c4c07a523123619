//! Output formatting for Claude Code hook responses
//!
//! Turns a match list into a [`Decision`] and a decision into the JSON the
//! host expects on stdout.

use serde::Serialize;

use crate::engine::Match;
use crate::rules::{Enforcement, Priority, RuleKind};

/// Main output structure for Claude Code hooks
#[derive(Debug, Serialize)]
pub struct HookOutput {
    #[serde(rename = "hookSpecificOutput", skip_serializing_if = "Option::is_none")]
    pub hook_specific_output: Option<HookSpecificOutput>,

    /// Optional message shown to the user
    #[serde(rename = "systemMessage", skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
}

/// Event-specific part of the hook output
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: String,

    /// "deny" when a guardrail blocks the tool call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_decision: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_decision_reason: Option<String>,

    /// Text injected into the model's context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
}

/// Combined outcome of all matches for one event
///
/// The matcher reports every match; this is where precedence is decided:
/// block beats warn beats suggest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Nothing matched
    Allow,

    /// Point the model at relevant skills
    Suggest { rules: Vec<String>, context: String },

    /// Allow, but tell the user
    Warn { rules: Vec<String>, reason: String },

    /// Block the tool call
    Deny { rules: Vec<String>, reason: String },
}

impl Decision {
    /// Decision for a prompt: a reminder listing every matched skill
    pub fn from_prompt_matches(matches: &[Match]) -> Self {
        if matches.is_empty() {
            return Decision::Allow;
        }
        Decision::Suggest {
            rules: rule_names(matches.iter()),
            context: format_reminder(matches),
        }
    }

    /// Decision for a file event
    pub fn from_file_matches(matches: &[Match]) -> Self {
        let blocks: Vec<&Match> = matches.iter().filter(|m| m.is_block()).collect();
        if !blocks.is_empty() {
            let reason = blocks
                .iter()
                .map(|m| m.message.clone().unwrap_or_else(|| m.rule.clone()))
                .collect::<Vec<_>>()
                .join("\n\n");
            return Decision::Deny {
                rules: rule_names(blocks.into_iter()),
                reason,
            };
        }

        let warns: Vec<&Match> = matches
            .iter()
            .filter(|m| m.enforcement == Enforcement::Warn)
            .collect();
        if !warns.is_empty() {
            let reason = format!(
                "Check these skills before continuing: {}",
                rule_names(warns.iter().copied()).join(", ")
            );
            return Decision::Warn {
                rules: rule_names(warns.into_iter()),
                reason,
            };
        }

        if matches.is_empty() {
            return Decision::Allow;
        }
        Decision::Suggest {
            rules: rule_names(matches.iter()),
            context: format!(
                "Relevant skills for this file: {}",
                rule_names(matches.iter()).join(", ")
            ),
        }
    }

    /// Downgrade a deny to a warning (dry-run / warn-only mode)
    pub fn into_warn_only(self) -> Self {
        match self {
            Decision::Deny { rules, reason } => Decision::Warn { rules, reason },
            other => other,
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, Decision::Deny { .. })
    }

    /// Rules behind this decision
    pub fn rules(&self) -> &[String] {
        match self {
            Decision::Allow => &[],
            Decision::Suggest { rules, .. } => rules,
            Decision::Warn { rules, .. } => rules,
            Decision::Deny { rules, .. } => rules,
        }
    }
}

fn rule_names<'a>(matches: impl Iterator<Item = &'a Match>) -> Vec<String> {
    matches.map(|m| m.rule.clone()).collect()
}

/// Group heading for each priority in prompt reminders
fn priority_heading(priority: Priority) -> &'static str {
    match priority {
        Priority::Critical => "REQUIRED SKILLS",
        Priority::High => "RECOMMENDED SKILLS",
        Priority::Medium => "SUGGESTED SKILLS",
        Priority::Low => "OPTIONAL SKILLS",
    }
}

/// Render the prompt reminder, one section per priority
///
/// `matches` must already be sorted by priority.
pub fn format_reminder(matches: &[Match]) -> String {
    let mut out = String::from("SKILL ACTIVATION CHECK\n");
    let mut current: Option<Priority> = None;

    for m in matches {
        if current != Some(m.priority) {
            out.push('\n');
            out.push_str(priority_heading(m.priority));
            out.push_str(":\n");
            current = Some(m.priority);
        }
        out.push_str("  -> ");
        out.push_str(&m.rule);
        if m.kind == RuleKind::Guardrail {
            out.push_str(" (guardrail)");
        }
        if let Some(description) = &m.description {
            out.push_str(": ");
            out.push_str(description);
        }
        out.push('\n');
    }

    out.push_str("\nLoad the listed skills before responding.");
    out
}

impl HookOutput {
    /// Create an allow response (empty output = allow)
    pub fn allow() -> Self {
        HookOutput {
            hook_specific_output: None,
            system_message: None,
        }
    }

    /// Deny a tool call with a reason
    pub fn deny(reason: &str) -> Self {
        HookOutput {
            hook_specific_output: Some(HookSpecificOutput {
                hook_event_name: "PreToolUse".to_string(),
                permission_decision: Some("deny".to_string()),
                permission_decision_reason: Some(reason.to_string()),
                additional_context: None,
            }),
            system_message: Some(format!("[skill-rules] Blocked: {}", reason)),
        }
    }

    /// Allow, but show a warning
    pub fn warn(message: &str) -> Self {
        HookOutput {
            hook_specific_output: None,
            system_message: Some(format!("[skill-rules] Warning: {}", message)),
        }
    }

    /// Inject context for the model on prompt submission
    pub fn prompt_context(context: &str) -> Self {
        HookOutput {
            hook_specific_output: Some(HookSpecificOutput {
                hook_event_name: "UserPromptSubmit".to_string(),
                permission_decision: None,
                permission_decision_reason: None,
                additional_context: Some(context.to_string()),
            }),
            system_message: None,
        }
    }

    /// Create output from a prompt decision
    pub fn for_prompt(decision: &Decision) -> Self {
        match decision {
            Decision::Allow => HookOutput::allow(),
            Decision::Suggest { context, .. } => HookOutput::prompt_context(context),
            Decision::Warn { reason, .. } => HookOutput::warn(reason),
            Decision::Deny { reason, .. } => HookOutput::warn(reason),
        }
    }

    /// Create output from a file event decision
    pub fn for_tool(decision: &Decision) -> Self {
        match decision {
            Decision::Allow => HookOutput::allow(),
            Decision::Suggest { context, .. } => HookOutput {
                hook_specific_output: None,
                system_message: Some(format!("[skill-rules] {}", context)),
            },
            Decision::Warn { reason, .. } => HookOutput::warn(reason),
            Decision::Deny { reason, .. } => HookOutput::deny(reason),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
