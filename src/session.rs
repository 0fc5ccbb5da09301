//! Conversation session: one persisted transcript plus the relay client
//!
//! A turn is load -> pure transform -> save at each boundary: the user
//! entry is persisted before the network call, the assistant entry only
//! after a successful reply. A failed turn therefore leaves the transcript
//! with the user entry and nothing else.

use tracing::debug;

use crate::client::RelayClient;
use crate::error::Result;
use crate::transcript::{Transcript, TranscriptStore};

pub struct Session {
    store: TranscriptStore,
    client: RelayClient,
    /// Fixed at transcript creation; reloaded transcripts keep their own
    system_prompt: String,
}

impl Session {
    pub fn new(store: TranscriptStore, client: RelayClient, system_prompt: String) -> Self {
        Self {
            store,
            client,
            system_prompt,
        }
    }

    /// Run one conversation turn. At most one request is in flight per
    /// invocation; the caller blocks until the reply arrives or fails.
    pub async fn turn(&self, user_text: &str) -> Result<String> {
        let mut transcript = self.store.load_or_init(&self.system_prompt)?;

        transcript.push_user(user_text);
        self.store.save(&transcript)?;

        let prompt = transcript.flatten();
        debug!(prompt_chars = prompt.len(), turns = transcript.len(), "sending turn");

        let reply = self.client.ask(&prompt, &transcript.system_prompt).await?;

        transcript.push_assistant(&reply);
        self.store.save(&transcript)?;

        Ok(reply)
    }

    /// Reset to an empty history under the fixed system prompt
    pub fn reset(&self) -> Result<()> {
        self.store.save(&Transcript::new(&self.system_prompt))
    }

    /// Number of persisted turns, for the REPL status line
    pub fn turn_count(&self) -> Result<usize> {
        Ok(self.store.load_or_init(&self.system_prompt)?.len())
    }
}
