//! Sign and verify payload tokens.
//!
//! A token is `<hex digest>|<canonical string>`. Verification recomputes the
//! digest, then decodes the payload, then checks its `timestamp` against the
//! clock, in that order.

use tracing::{debug, warn};

use crate::codec;
use crate::config::SigningConfig;
use crate::error::{EncodeErrorKind, ForgeryKind, SigningError, SigningResult};
use crate::value::Value;

use super::clock::{Clock, SystemClock};
use super::digest::{DigestAlgorithm, DigestEngine};
use super::secret::SecretKey;

/// Reserved key holding the signing time.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Separates the digest from the canonical string.
pub const SEPARATOR: char = '|';

/// Maximum distance, in seconds, between a token's timestamp and now.
pub const DEFAULT_MAX_AGE_SECONDS: u64 = 3600;

/// Currency used by the legacy transaction helper when none is given.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Signs payloads and verifies tokens with one secret.
///
/// Immutable once built; share it freely across threads.
#[derive(Debug, Clone)]
pub struct Signer<C: Clock = SystemClock> {
    secret: SecretKey,
    algorithm: DigestAlgorithm,
    max_age: u64,
    pub(crate) default_currency: String,
    clock: C,
}

impl Signer<SystemClock> {
    /// Create a signer with the default algorithm, window and system clock.
    pub fn new(secret: impl Into<SecretKey>) -> Self {
        Self::unconfigured().with_secret(secret)
    }

    /// A signer without a secret. Every operation fails until one is set.
    pub fn unconfigured() -> Self {
        Self {
            secret: SecretKey::unset(),
            algorithm: DigestAlgorithm::default(),
            max_age: DEFAULT_MAX_AGE_SECONDS,
            default_currency: DEFAULT_CURRENCY.to_string(),
            clock: SystemClock,
        }
    }

    /// Build a signer from configuration, reading the key file if one is set.
    pub fn from_config(config: &SigningConfig) -> SigningResult<Self> {
        let secret = config.secret()?;
        Ok(Self::unconfigured()
            .with_secret(secret)
            .with_algorithm(config.algorithm)
            .with_max_age(config.max_age_seconds)
            .with_default_currency(config.default_currency.clone()))
    }
}

impl<C: Clock> Signer<C> {
    /// Replace the secret. An empty secret leaves the signer unconfigured.
    pub fn with_secret(mut self, secret: impl Into<SecretKey>) -> Self {
        self.secret = secret.into();
        self
    }

    /// Drop the secret; subsequent calls fail with a configuration error.
    pub fn without_secret(mut self) -> Self {
        self.secret = SecretKey::unset();
        self
    }

    /// Change the digest algorithm.
    pub fn with_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_max_age(mut self, seconds: u64) -> Self {
        self.max_age = seconds;
        self
    }

    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }

    /// Swap the time source.
    pub fn with_clock<T: Clock>(self, clock: T) -> Signer<T> {
        Signer {
            secret: self.secret,
            algorithm: self.algorithm,
            max_age: self.max_age,
            default_currency: self.default_currency,
            clock,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.secret.is_empty()
    }

    pub fn max_age(&self) -> u64 {
        self.max_age
    }

    fn engine(&self) -> SigningResult<DigestEngine> {
        Ok(DigestEngine::new(self.algorithm, self.secret.expose()?))
    }

    /// Sign a mapping, stamping it with the current time unless it already
    /// carries a `timestamp`.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error when no secret is set, and with an
    /// encode error when `data` is not a mapping.
    pub fn sign(&self, data: impl Into<Value>) -> SigningResult<String> {
        let engine = self.engine()?;

        let mut data = data.into();
        let map = data
            .as_mapping_mut()
            .ok_or(EncodeErrorKind::UnkeyedValue)?;
        map.entry(TIMESTAMP_KEY.to_string())
            .or_insert_with(|| Value::from(self.clock.now()));

        let canonical = codec::encode(&data)?;
        let digest = engine.digest(&canonical);

        debug!(
            algorithm = %engine.algorithm(),
            canonical_len = canonical.len(),
            "Signed payload"
        );

        Ok(format!("{}{}{}", digest, SEPARATOR, canonical))
    }

    /// Verify a token and return the data it carries.
    ///
    /// # Errors
    ///
    /// - configuration error when no secret is set;
    /// - [`ForgeryKind::SignatureMismatch`] when the digest does not match
    ///   (nothing is decoded in that case);
    /// - a decode error when the signed payload is structurally inconsistent;
    /// - [`ForgeryKind::RequestTooOld`] when the timestamp is out of window,
    ///   missing or not an integer.
    pub fn verify(&self, token: &str) -> SigningResult<Value> {
        let engine = self.engine()?;

        let (provided, canonical) = token.split_once(SEPARATOR).unwrap_or((token, ""));
        if !engine.verify(canonical, provided) {
            warn!(
                canonical_len = canonical.len(),
                "Signature forged or signed with a different private key"
            );
            return Err(SigningError::Forgery {
                kind: ForgeryKind::SignatureMismatch,
            });
        }

        let data = codec::decode(canonical)?;
        self.check_freshness(&data)?;

        debug!(canonical_len = canonical.len(), "Verified payload");
        Ok(data)
    }

    /// Reject timestamps more than `max_age` seconds in the past or future.
    ///
    /// A missing or non-integer timestamp is measured from the epoch and is
    /// always rejected, whatever the clock says.
    fn check_freshness(&self, data: &Value) -> SigningResult<()> {
        let raw = data.get(TIMESTAMP_KEY).and_then(Value::as_str);
        let Some(timestamp) = raw.and_then(|s| s.parse::<i64>().ok()) else {
            let age = self.clock.now().unsigned_abs();
            warn!(
                age_seconds = age,
                timestamp = ?raw,
                "Signed timestamp missing or not an integer"
            );
            return Err(SigningError::Forgery {
                kind: ForgeryKind::RequestTooOld { age_seconds: age },
            });
        };

        let age = self.clock.now().abs_diff(timestamp);
        if age > self.max_age {
            warn!(
                age_seconds = age,
                max_age_seconds = self.max_age,
                "Timestamp outside freshness window; server clock may be off or this may be a replay"
            );
            return Err(SigningError::Forgery {
                kind: ForgeryKind::RequestTooOld { age_seconds: age },
            });
        }

        Ok(())
    }
}
