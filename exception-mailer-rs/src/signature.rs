//! Notification signatures
//!
//! A signature is a 128-bit digest of a notification's static body, used as
//! the dedup key. Two failures with the same static body (location, message,
//! query, trace) hash identically no matter what request context they carry.
//! Collisions are accepted as a theoretical risk; dedup is best-effort, not
//! a security control.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::MailerError;

/// 128-bit dedup key over a notification's static body.
///
/// Round-trips through serde as a 32-char lowercase hex string so it can
/// key the persisted suppression map directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature([u8; 16]);

impl Signature {
    /// Computes the signature of a static body.
    pub fn of(static_body: &str) -> Self {
        let digest = Sha256::digest(static_body.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Signature(bytes)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for Signature {
    type Err = MailerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(MailerError::MalformedSignature(format!(
                "expected 32 hex chars, got {}",
                s.len()
            )));
        }

        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|e| MailerError::MalformedSignature(e.to_string()))?;
        }
        Ok(Signature(bytes))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_bodies_hash_identically() {
        let a = Signature::of("Dear admin,\n\nsomething broke");
        let b = Signature::of("Dear admin,\n\nsomething broke");
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_bodies_hash_differently() {
        let a = Signature::of("failure in pool.rs at line 31");
        let b = Signature::of("failure in pool.rs at line 32");
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_parse_round_trip() {
        let sig = Signature::of("round trip");
        let text = sig.to_string();
        assert_eq!(text.len(), 32);
        assert_eq!(text.parse::<Signature>().unwrap(), sig);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("tooshort".parse::<Signature>().is_err());
        assert!("zz".repeat(16).parse::<Signature>().is_err());
    }
}
