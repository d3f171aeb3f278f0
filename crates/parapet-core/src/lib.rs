//! Parapet Core Library
//!
//! Core types, decoding, errors, and configuration for the Parapet IAM
//! policy analyzer.

pub mod config;
pub mod decode;
pub mod error;
pub mod types;
pub mod utils;

pub use config::ParapetConfig;
pub use error::{Error, Result};

/// Parapet version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum accepted policy document size (1 MiB)
pub const MAX_POLICY_BYTES: usize = 1 << 20;

/// Policy language versions the analyzer accepts
pub const SUPPORTED_VERSIONS: [&str; 2] = ["2012-10-17", "2008-10-17"];
