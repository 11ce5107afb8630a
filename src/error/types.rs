//! Error types for payload signing and verification.

use thiserror::Error;

/// Main error type for the signing engine.
#[derive(Error, Debug)]
pub enum SigningError {
    /// Missing or unusable configuration (no secret key, bad settings file).
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The token did not pass verification.
    #[error("Request forgery: {kind}")]
    Forgery { kind: ForgeryKind },

    /// The payload could not be encoded.
    #[error("Encode error: {kind}")]
    Encode { kind: EncodeErrorKind },

    /// The canonical string could not be rebuilt into a structure.
    #[error("Decode error: {kind}")]
    Decode { kind: DecodeErrorKind },

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Ways a token can fail verification.
///
/// Every kind is a forgery from the caller's point of view; `RequestTooOld`
/// additionally means the digest matched but the timestamp is outside the
/// freshness window. A missing or non-integer timestamp counts as the epoch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForgeryKind {
    #[error("Signature forged or incorrect private key")]
    SignatureMismatch,

    #[error(
        "Timestamp is {age_seconds}s away from server time. The server clock may be \
         incorrect or this may be a replay attack"
    )]
    RequestTooOld { age_seconds: u64 },
}

/// Encoder error kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeErrorKind {
    #[error("Value has no key to be encoded under")]
    UnkeyedValue,

    /// `parent` is the escaped path of the enclosing mapping, empty at the top.
    #[error("Mapping key under '{parent}' is empty")]
    EmptyKey { parent: String },
}

/// Decoder error kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeErrorKind {
    #[error("Key '{path}' is used both as a mapping and as a sequence")]
    ShapeConflict { path: String },
}

impl SigningError {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for every verification failure, including stale timestamps.
    pub fn is_forgery(&self) -> bool {
        matches!(self, Self::Forgery { .. })
    }

    /// True only when the digest matched but the timestamp was out of window.
    pub fn is_too_old(&self) -> bool {
        matches!(
            self,
            Self::Forgery {
                kind: ForgeryKind::RequestTooOld { .. }
            }
        )
    }

    /// True when the call failed because the signer is not configured.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

impl From<EncodeErrorKind> for SigningError {
    fn from(kind: EncodeErrorKind) -> Self {
        Self::Encode { kind }
    }
}

impl From<DecodeErrorKind> for SigningError {
    fn from(kind: DecodeErrorKind) -> Self {
        Self::Decode { kind }
    }
}

/// Result type alias for signing operations.
pub type SigningResult<T> = Result<T, SigningError>;
