//! Request signing and verification
//!
//! Outbound turns carry an HMAC-SHA256 signature over the canonical JSON
//! encoding of the payload concatenated with a decimal Unix timestamp,
//! keyed by the shared secret. Client and relay link this same module, so
//! the canonical encoding (fixed struct field order via serde_json) is
//! stable on both ends.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{CellmateError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the decimal Unix timestamp the signature was computed at
pub const TIMESTAMP_HEADER: &str = "x-auth-timestamp";
/// Header carrying the hex-encoded HMAC-SHA256 signature
pub const SIGNATURE_HEADER: &str = "x-auth-signature";

/// The fields covered by the signature, in canonical order.
///
/// Absent optional fields are signed as empty strings; the relay rebuilds
/// this struct from the request body before verifying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedPayload {
    pub model: String,
    pub prompt: String,
    pub system_prompt: String,
}

/// Current Unix-epoch seconds as the decimal string that goes on the wire
pub fn unix_timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

/// Compute the hex-encoded signature for a payload at the given timestamp.
///
/// Signatures are time-variant: the timestamp is part of the MAC input, so
/// the same payload signed at two different times yields two different
/// signatures.
pub fn sign(payload: &SignedPayload, secret: &str, timestamp: &str) -> Result<String> {
    let canonical = serde_json::to_string(payload)?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| CellmateError::Config("invalid HMAC key".into()))?;
    mac.update(canonical.as_bytes());
    mac.update(timestamp.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a received signature against the received payload and timestamp.
///
/// Fails closed: missing or malformed input, a timestamp outside the skew
/// window, and a MAC mismatch all reject. The MAC comparison is constant
/// time (`Mac::verify_slice`).
pub fn verify(
    payload: &SignedPayload,
    secret: &str,
    timestamp: &str,
    signature: &str,
    max_skew_secs: i64,
    now_secs: i64,
) -> Result<()> {
    let ts: i64 = timestamp
        .parse()
        .map_err(|_| CellmateError::Auth("malformed timestamp".into()))?;
    if (now_secs - ts).abs() > max_skew_secs {
        return Err(CellmateError::Auth("timestamp outside skew window".into()));
    }

    let expected =
        hex::decode(signature).map_err(|_| CellmateError::Auth("malformed signature".into()))?;

    let canonical = serde_json::to_string(payload)?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| CellmateError::Config("invalid HMAC key".into()))?;
    mac.update(canonical.as_bytes());
    mac.update(timestamp.as_bytes());
    mac.verify_slice(&expected)
        .map_err(|_| CellmateError::Auth("signature mismatch".into()))
}
