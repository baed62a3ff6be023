//! Anti-forgery `state` parameter
//!
//! The relay issues a random nonce at login, keeps it in a short-lived
//! cookie and sends the same value to the provider as `state`. The provider
//! echoes it back on the callback; a request whose echoed value does not
//! match the stored one did not originate from this browser's login and is
//! rejected before any token exchange happens.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;

use crate::constants::STATE_LENGTH;
use crate::error::{Error, Result};

/// 12 random bytes encode to exactly `STATE_LENGTH` base64url characters.
const STATE_BYTES: usize = STATE_LENGTH / 4 * 3;

/// Generate a cryptographically random state nonce.
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Check the state echoed by the provider against the stored nonce.
///
/// Fails closed: a missing value on either side, an empty stored nonce or
/// any difference is a mismatch.
pub fn verify_state(returned: Option<&str>, stored: Option<&str>) -> Result<()> {
    let returned = returned.ok_or(Error::StateMismatch("missing returned state"))?;
    let stored = match stored {
        Some(s) if !s.is_empty() => s,
        _ => return Err(Error::StateMismatch("no stored state")),
    };

    if constant_time_eq(returned.as_bytes(), stored.as_bytes()) {
        Ok(())
    } else {
        Err(Error::StateMismatch("returned state differs from stored state"))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
