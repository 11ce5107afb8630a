//! Configuration module for signed-params.
//!
//! Handles loading and validating configuration from TOML files.

mod settings;

pub use settings::*;
