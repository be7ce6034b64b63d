//! Common types and utilities for the NDN forwarding information base (FIB).
//!
//! This crate provides the pieces shared by the hash table, its build driver
//! and the command-line tooling: the error type, tuning configuration, port
//! masks, URL prefix decomposition and build metrics.

pub mod error;
pub mod metrics;
pub mod prefix;
pub mod settings;
pub mod types;

/// Reexport of common types
pub use error::Error;
pub use prefix::{Prefix, Prefixes};
pub use settings::FibConfig;
pub use types::{PortId, PortMask, PrefixKind};

pub type Result<T> = std::result::Result<T, Error>;
