//! Shared-secret provisioning
//!
//! The HMAC key is a single-line text file, identical on client and
//! relay, provisioned out-of-band. The client prompts once interactively
//! and caches the entered value; the relay only ever reads the file.

use std::io::IsTerminal;
use std::path::Path;

use crate::error::{CellmateError, Result};

/// Read the secret if the file exists. Used by the relay: a missing file
/// means the unauthenticated minimal variant.
pub fn load(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let secret = content.trim().to_string();
    if secret.is_empty() {
        return Err(CellmateError::Config(format!(
            "secret file {} is empty",
            path.display()
        )));
    }
    Ok(Some(secret))
}

/// Read the secret, prompting interactively and writing the file when it
/// does not exist yet. Used by the conversation client, which always signs.
pub fn load_or_prompt(path: &Path) -> Result<String> {
    if let Some(secret) = load(path)? {
        return Ok(secret);
    }

    if !std::io::stdin().is_terminal() {
        return Err(CellmateError::Config(format!(
            "secret file {} missing and no terminal to prompt on",
            path.display()
        )));
    }

    let secret: String = dialoguer::Password::new()
        .with_prompt("Shared secret")
        .interact()
        .map_err(|e| CellmateError::Config(format!("failed to read secret: {e}")))?;
    let secret = secret.trim().to_string();
    if secret.is_empty() {
        return Err(CellmateError::Config("shared secret cannot be empty".into()));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format!("{secret}\n"))?;
    Ok(secret)
}
