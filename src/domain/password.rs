//! Password value object - Domain layer password handling.
//!
//! DDD: Encapsulates password hashing as a domain value object.
//! SOLID (SRP): Single responsibility - password operations only.
//!
//! Stored passwords are the standard base64 encoding of the SHA-256 digest of
//! the UTF-8 plaintext. The digest is unsalted, so equal plaintexts always
//! produce equal hashes and login can match on the stored column directly.

use base64ct::{Base64, Encoding};
use sha2::{Digest, Sha256};

/// Password value object holding the stored (hashed) representation.
///
/// DDD: Value object - immutable, compared by value.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output (security)
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a plaintext password.
    pub fn hash(plain_text: &str) -> Self {
        let digest = Sha256::digest(plain_text.as_bytes());
        Self {
            hash: Base64::encode_string(&digest),
        }
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }
}
