// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Time-based request signature.
//!
//! Every request to the cloud carries an `Authtimestamp` header with the
//! current Unix time in seconds and an `Authsignature` header derived from it:
//!
//! ```text
//! signature = PREFIX + hex(sha512(SALT + timestamp)) + SUFFIX
//! ```

use chrono::Utc;
use sha2::{Digest, Sha512};

const SIGNATURE_PREFIX: &str = "al8e4s";
const SIGNATURE_SALT: &str = "LS885ZYDA95JVFQKUIUUUV7PQNODZRDZIS4ERREDS0EED8BCWSS";
const SIGNATURE_SUFFIX: &str = "ui893ed";

/// A request signature together with the timestamp it was computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Unix seconds, as sent in the `Authtimestamp` header.
    pub timestamp: String,
    /// Value sent in the `Authsignature` header.
    pub signature: String,
}

/// Computes the signature for the current wall-clock time.
#[must_use]
pub fn signature_now() -> Signature {
    signature_at(Utc::now().timestamp())
}

/// Computes the signature for the given Unix timestamp (seconds).
///
/// # Examples
///
/// ```
/// use alphaess_cloud::protocol::signature_at;
///
/// let sig = signature_at(1_700_000_000);
/// assert_eq!(sig.timestamp, "1700000000");
/// assert!(sig.signature.starts_with("al8e4s"));
/// assert!(sig.signature.ends_with("ui893ed"));
/// assert_ne!(sig, signature_at(1_700_000_001));
/// ```
#[must_use]
pub fn signature_at(unix_seconds: i64) -> Signature {
    let timestamp = unix_seconds.to_string();

    let mut hasher = Sha512::new();
    hasher.update(SIGNATURE_SALT.as_bytes());
    hasher.update(timestamp.as_bytes());
    let digest = hasher.finalize();

    Signature {
        signature: format!("{SIGNATURE_PREFIX}{digest:x}{SIGNATURE_SUFFIX}"),
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_deterministic() {
        assert_eq!(signature_at(1_650_000_000), signature_at(1_650_000_000));
    }

    #[test]
    fn signature_changes_with_timestamp() {
        let a = signature_at(1_650_000_000);
        let b = signature_at(1_650_000_001);
        assert_ne!(a.timestamp, b.timestamp);
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn signature_layout() {
        let sig = signature_at(0);
        assert_eq!(sig.timestamp, "0");
        // prefix + 128 hex chars + suffix
        assert_eq!(
            sig.signature.len(),
            SIGNATURE_PREFIX.len() + 128 + SIGNATURE_SUFFIX.len()
        );
        let digest = &sig.signature[SIGNATURE_PREFIX.len()..sig.signature.len() - SIGNATURE_SUFFIX.len()];
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn signature_matches_manual_digest() {
        let mut hasher = Sha512::new();
        hasher.update(format!("{SIGNATURE_SALT}42").as_bytes());
        let expected = format!("al8e4s{:x}ui893ed", hasher.finalize());
        assert_eq!(signature_at(42).signature, expected);
    }

    #[test]
    fn signature_now_uses_current_time() {
        let before = Utc::now().timestamp();
        let sig = signature_now();
        let after = Utc::now().timestamp();
        let ts: i64 = sig.timestamp.parse().unwrap();
        assert!(ts >= before && ts <= after);
    }
}
