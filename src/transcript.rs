//! Conversation transcript: the persisted turn history for a chat session
//!
//! The transcript is an explicit in-memory value mutated by pure
//! operations; file I/O lives in [`TranscriptStore`] so the turn logic can
//! be tested without touching a file system. The on-disk form is a single
//! JSON record `{system_prompt, history}` rewritten in full on every save.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Who spoke a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label used when flattening the transcript into a prompt
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One turn of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Ordered turn history plus the system prompt fixed at creation.
///
/// History is never pruned or rotated; unbounded growth is an accepted
/// limitation of this deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub system_prompt: String,
    pub history: Vec<Turn>,
}

impl Transcript {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            history: Vec::new(),
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.history.push(Turn {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.history.push(Turn {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    /// Flatten the whole conversation into one prompt string: the system
    /// prompt followed by every turn as `\nUser: …` / `\nAssistant: …` in
    /// chronological order. Deterministic for a fixed transcript.
    pub fn flatten(&self) -> String {
        let mut prompt = self.system_prompt.clone();
        for turn in &self.history {
            prompt.push('\n');
            prompt.push_str(turn.role.label());
            prompt.push_str(": ");
            prompt.push_str(&turn.content);
        }
        prompt
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// File-backed store for a [`Transcript`]
///
/// Every save rewrites the file in full; there is no append-only log and
/// no atomic-rename step. The store assumes a single client process.
pub struct TranscriptStore {
    path: PathBuf,
}

impl TranscriptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the transcript, creating and persisting a fresh one with the
    /// given system prompt if the file does not exist yet.
    pub fn load_or_init(&self, system_prompt: &str) -> Result<Transcript> {
        if self.path.exists() {
            self.load()
        } else {
            let transcript = Transcript::new(system_prompt);
            self.save(&transcript)?;
            Ok(transcript)
        }
    }

    pub fn load(&self) -> Result<Transcript> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, transcript: &Transcript) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(transcript)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
