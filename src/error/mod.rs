//! Error types for signed-params.
//!
//! Provides a unified error handling system using thiserror.

mod types;

pub use types::*;
