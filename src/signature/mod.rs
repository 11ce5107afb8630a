//! Payload signature protocol.
//!
//! Handles secret key handling, HMAC digests, token signing and verification
//! with a freshness window, and the deprecated fixed-schema helpers.

mod clock;
mod digest;
mod legacy;
mod protocol;
mod secret;

pub use clock::{Clock, FixedClock, SystemClock};
pub use digest::{hex_digest, DigestAlgorithm, DigestEngine};
pub use protocol::{
    Signer, DEFAULT_CURRENCY, DEFAULT_MAX_AGE_SECONDS, SEPARATOR, TIMESTAMP_KEY,
};
pub use secret::SecretKey;
