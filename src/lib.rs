//! signed-params
//!
//! Signs nested parameter payloads so that a server can trust data that was
//! relayed through an untrusted client as one opaque string:
//!
//! ```text
//! <hex hmac>|account[account_code]=123&timestamp=1329942896
//! ```
//!
//! - [`codec`]: canonical query encoding and nested decoding
//! - [`signature`]: HMAC digests, signing, verification with a freshness window
//! - [`config`]: TOML settings

pub mod codec;
pub mod config;
pub mod error;
pub mod signature;
pub mod value;

pub use error::{ForgeryKind, SigningError, SigningResult};
pub use signature::{Clock, DigestAlgorithm, FixedClock, SecretKey, Signer, SystemClock};
pub use value::{Mapping, Value};
