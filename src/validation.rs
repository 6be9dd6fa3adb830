use crate::error::{Error, Result};
use crate::types::Fingerprint;

const FINGERPRINT_LEN: usize = 40;

/// Returns true if `candidate` is exactly 40 hexadecimal digits.
///
/// Case is ignored. No `0x` prefix or whitespace is tolerated.
pub fn is_valid_fingerprint(candidate: &str) -> bool {
    candidate.len() == FINGERPRINT_LEN && candidate.chars().all(|c| c.is_ascii_hexdigit())
}

/// Validates a fingerprint before passing it to a subprocess or a URL.
///
/// Returns the normalized fingerprint (uppercase) on success.
pub fn validate_fingerprint(candidate: &str) -> Result<Fingerprint> {
    if candidate.is_empty() {
        return Err(Error::InvalidFingerprint {
            fingerprint: candidate.to_string(),
            reason: "fingerprint cannot be empty".to_string(),
        });
    }

    if !candidate.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidFingerprint {
            fingerprint: candidate.to_string(),
            reason: "fingerprint must contain only hexadecimal characters".to_string(),
        });
    }

    if candidate.len() != FINGERPRINT_LEN {
        return Err(Error::InvalidFingerprint {
            fingerprint: candidate.to_string(),
            reason: format!(
                "fingerprint must be {} hex characters (got {})",
                FINGERPRINT_LEN,
                candidate.len()
            ),
        });
    }

    Ok(Fingerprint::new_unchecked(candidate.to_uppercase()))
}
