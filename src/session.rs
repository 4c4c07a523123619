//! Per-session state: which session-tracked rules have already fired
//!
//! The used set only grows. A session is discarded as a whole with
//! [`SessionStore::end`].

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::engine::Match;

/// Characters not allowed in session state file names
static UNSAFE_ID_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]").expect("static regex"));

/// Session id used when the host does not send one
pub const DEFAULT_SESSION_ID: &str = "default";

/// Rule names used during one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    session_id: String,
    used_skills: BTreeSet<String>,
}

impl SessionState {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            used_skills: BTreeSet::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Record a rule as used. Returns true if it was not recorded before.
    pub fn record(&mut self, rule: impl Into<String>) -> bool {
        self.used_skills.insert(rule.into())
    }

    pub fn has_used(&self, rule: &str) -> bool {
        self.used_skills.contains(rule)
    }

    /// Record every session-tracked rule among `matches`
    pub fn record_matches<'a>(&mut self, matches: impl IntoIterator<Item = &'a Match>) -> usize {
        matches
            .into_iter()
            .filter(|m| m.session_tracked)
            .filter(|m| self.record(m.rule.clone()))
            .count()
    }

    pub fn used(&self) -> impl Iterator<Item = &str> {
        self.used_skills.iter().map(String::as_str)
    }
}

/// On-disk form of a session
#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    #[serde(flatten)]
    state: SessionState,
    updated_at: DateTime<Utc>,
}

/// Session states keyed by session id, optionally persisted per session
///
/// Each hook invocation is a fresh process, so persistence is what makes
/// "already used this session" work across prompts.
#[derive(Debug, Default)]
pub struct SessionStore {
    dir: Option<PathBuf>,
    sessions: HashMap<String, SessionState>,
}

impl SessionStore {
    /// A store that keeps sessions in memory only
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A store that persists each session as a JSON file under `dir`
    pub fn persistent(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            sessions: HashMap::new(),
        }
    }

    /// Get the state for `session_id`, loading it from disk on first access
    pub fn session(&mut self, session_id: &str) -> &mut SessionState {
        let dir = self.dir.as_deref();
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                dir.and_then(|dir| load_state(dir, session_id))
                    .unwrap_or_else(|| SessionState::new(session_id))
            })
    }

    /// Write a session to disk. No-op for in-memory stores.
    pub fn save(&self, session_id: &str) -> Result<(), std::io::Error> {
        let (Some(path), Some(state)) = (self.path_for(session_id), self.sessions.get(session_id))
        else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = SessionFile {
            state: state.clone(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(path, json)
    }

    /// Discard a session in memory and on disk
    pub fn end(&mut self, session_id: &str) -> Result<(), std::io::Error> {
        self.sessions.remove(session_id);
        match self.path_for(session_id) {
            Some(path) if path.exists() => std::fs::remove_file(path),
            _ => Ok(()),
        }
    }

    fn path_for(&self, session_id: &str) -> Option<PathBuf> {
        self.dir
            .as_deref()
            .map(|dir| state_file_path(dir, session_id))
    }
}

/// Read a persisted session; a corrupt file is ignored with a warning
fn load_state(dir: &Path, session_id: &str) -> Option<SessionState> {
    let path = state_file_path(dir, session_id);
    let content = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str::<SessionFile>(&content) {
        Ok(file) => Some(file.state),
        Err(e) => {
            eprintln!(
                "Warning: Ignoring unreadable session state {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

/// Path of the state file for a session
pub fn state_file_path(dir: &Path, session_id: &str) -> PathBuf {
    let safe = UNSAFE_ID_CHARS.replace_all(session_id, "_");
    dir.join(format!("skills-used-{}.json", safe))
}
