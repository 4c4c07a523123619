//! skill-rules - Skill activation and guardrail rules for Claude Code hooks
//!
//! Reads one hook JSON document from stdin, matches it against the rule
//! set and writes the hook response to stdout.
//!
//! # Usage
//!
//! ```bash
//! # As a UserPromptSubmit hook
//! echo '{"hook_event_name":"UserPromptSubmit","prompt":"fix the layout"}' | skill-rules
//!
//! # Check a rule set without running a hook
//! skill-rules --validate --rules .claude/skills/skill-rules.json
//! ```

use std::env;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use skill_rules::{
    audit::AuditLogger,
    config::Config,
    engine::{ProcessEnv, RuleMatcher},
    hook::{self, HookOptions},
    input::HookInput,
    output::HookOutput,
    rules::RuleSet,
    session::SessionStore,
};

/// Print version information
fn print_version() {
    println!("skill-rules {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message
fn print_help() {
    println!(
        r#"skill-rules - Skill activation and guardrail rules for Claude Code hooks

USAGE:
    skill-rules [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -v, --version           Print version information
    -c, --config PATH       Path to config file
    -r, --rules PATH        Path to skill-rules.json (overrides config)
    -d, --dry-run           Downgrade blocks to warnings
        --validate          Validate the rule set and exit

ENVIRONMENT:
    SKILL_RULES_DISABLED=1   Match nothing (still logs)
    SKILL_RULES_WARN_ONLY=1  Warn but don't block
    CLAUDE_PROJECT_DIR       Project root for relative paths

USAGE AS HOOK:
    Configure in .claude/settings.json:
    {{
      "hooks": {{
        "UserPromptSubmit": [{{
          "hooks": [{{"type": "command", "command": "skill-rules"}}]
        }}],
        "PreToolUse": [{{
          "matcher": "Edit|MultiEdit|Write",
          "hooks": [{{"type": "command", "command": "skill-rules"}}]
        }}]
      }}
    }}
"#
    );
}

/// Parse command line arguments
struct Args {
    help: bool,
    version: bool,
    dry_run: bool,
    validate: bool,
    config_path: Option<String>,
    rules_path: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut result = Args {
            help: false,
            version: false,
            dry_run: false,
            validate: false,
            config_path: None,
            rules_path: None,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-h" | "--help" => result.help = true,
                "-v" | "--version" => result.version = true,
                "-d" | "--dry-run" => result.dry_run = true,
                "--validate" => result.validate = true,
                "-c" | "--config" => {
                    if i + 1 < args.len() {
                        i += 1;
                        result.config_path = Some(args[i].clone());
                    }
                }
                "-r" | "--rules" => {
                    if i + 1 < args.len() {
                        i += 1;
                        result.rules_path = Some(args[i].clone());
                    }
                }
                arg if arg.starts_with("--config=") => {
                    result.config_path = Some(arg.trim_start_matches("--config=").to_string());
                }
                arg if arg.starts_with("--rules=") => {
                    result.rules_path = Some(arg.trim_start_matches("--rules=").to_string());
                }
                _ => {}
            }
            i += 1;
        }

        result
    }
}

/// Project root: CLAUDE_PROJECT_DIR, then the host's cwd, then ours
fn project_dir(input: Option<&HookInput>) -> PathBuf {
    if let Some(dir) = env::var_os("CLAUDE_PROJECT_DIR").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    if let Some(cwd) = input.and_then(|i| i.cwd.as_deref()) {
        return PathBuf::from(cwd);
    }
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn write_output(output: &HookOutput) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let _ = writeln!(handle, "{}", output.to_json());
    let _ = handle.flush();
}

fn validate(path: &Path) -> ExitCode {
    match RuleSet::from_file(path) {
        Ok(rules) => {
            println!(
                "{}: {} rules OK (version {})",
                path.display(),
                rules.len(),
                rules.version()
            );
            for rule in rules.iter() {
                println!(
                    "  {:<32} {:<9} {:?}/{:?}",
                    rule.name,
                    rule.priority,
                    rule.kind,
                    rule.enforcement()
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}: {}", path.display(), e);
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    if args.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    let config = match args.config_path {
        Some(ref path) => Config::load_from(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config from {}: {}", path, e);
            Config::default()
        }),
        None => Config::load(),
    };

    if args.validate {
        let path = match args.rules_path {
            Some(ref path) => PathBuf::from(path),
            None => config.rules_path(&project_dir(None)),
        };
        return validate(&path);
    }

    // Read JSON from stdin
    let mut input_json = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input_json) {
        eprintln!("Warning: Failed to read hook input: {}", e);
    }

    // No input = nothing to match
    if input_json.trim().is_empty() {
        write_output(&HookOutput::allow());
        return ExitCode::SUCCESS;
    }

    // Advisory hook: fail open on unparseable input
    let input = match HookInput::from_json(&input_json) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Warning: Failed to parse hook input (allowing): {}", e);
            write_output(&HookOutput::allow());
            return ExitCode::SUCCESS;
        }
    };

    let project_dir = project_dir(Some(&input));
    let rules_path = match args.rules_path {
        Some(ref path) => PathBuf::from(path),
        None => config.rules_path(&project_dir),
    };

    // Surface load failures to the user instead of silently matching nothing
    let matcher = match RuleSet::from_file(&rules_path) {
        Ok(rules) => RuleMatcher::new(rules),
        Err(e) => {
            let message = format!("Failed to load {}: {}", rules_path.display(), e);
            eprintln!("Error: {}", message);
            write_output(&HookOutput::warn(&message));
            return ExitCode::SUCCESS;
        }
    };

    let mut sessions = match config.state_dir() {
        Some(dir) => SessionStore::persistent(dir),
        None => SessionStore::in_memory(),
    };

    let mut options = HookOptions::from_env(&ProcessEnv);
    if args.dry_run {
        options.warn_only = true;
    }

    let outcome = hook::handle(
        &input,
        &matcher,
        &mut sessions,
        &project_dir,
        options,
        &ProcessEnv,
    );

    let mut logger = AuditLogger::new(config.audit_path().as_deref());
    if let Err(e) = logger.log_decision(&input, outcome.event, &outcome.decision, options.disabled) {
        eprintln!("Warning: Failed to write audit log: {}", e);
    }

    write_output(&outcome.output);
    ExitCode::SUCCESS
}
