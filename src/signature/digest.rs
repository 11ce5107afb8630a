//! HMAC digest over canonical strings.

use std::fmt;

use ring::hmac;
use serde::Deserialize;

/// Keyed hash used for signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// HMAC-SHA1, the algorithm existing tokens are signed with.
    #[default]
    Sha1,
    /// HMAC-SHA256.
    Sha256,
}

impl DigestAlgorithm {
    fn hmac(self) -> hmac::Algorithm {
        match self {
            Self::Sha1 => hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
            Self::Sha256 => hmac::HMAC_SHA256,
        }
    }

    /// Length of the hex-encoded digest.
    pub fn hex_len(self) -> usize {
        match self {
            Self::Sha1 => 40,
            Self::Sha256 => 64,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes and checks hex digests with one secret.
#[derive(Clone)]
pub struct DigestEngine {
    key: hmac::Key,
    algorithm: DigestAlgorithm,
}

impl DigestEngine {
    /// The caller is responsible for rejecting an empty secret.
    pub fn new(algorithm: DigestAlgorithm, secret: &[u8]) -> Self {
        Self {
            key: hmac::Key::new(algorithm.hmac(), secret),
            algorithm,
        }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Lowercase hex digest of `message`.
    pub fn digest(&self, message: &str) -> String {
        let tag = hmac::sign(&self.key, message.as_bytes());
        hex::encode(tag.as_ref())
    }

    /// Check a provided hex digest against `message`.
    ///
    /// Only the exact lowercase form is accepted; the tag comparison itself
    /// is constant time.
    pub fn verify(&self, message: &str, provided: &str) -> bool {
        if provided.len() != self.algorithm.hex_len()
            || !provided.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        {
            return false;
        }
        let Ok(tag) = hex::decode(provided) else {
            return false;
        };
        hmac::verify(&self.key, message.as_bytes(), &tag).is_ok()
    }
}

impl fmt::Debug for DigestEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestEngine")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// One-shot hex digest.
pub fn hex_digest(algorithm: DigestAlgorithm, secret: &[u8], message: &str) -> String {
    DigestEngine::new(algorithm, secret).digest(message)
}
