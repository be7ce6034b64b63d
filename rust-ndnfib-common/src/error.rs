//! Error types for the NDN FIB implementation.

use thiserror::Error;

/// All possible errors that can occur while building or querying the FIB.
///
/// A prefix that cannot be placed because both of its candidate buckets are
/// full is not an error; see `InsertOutcome::BucketsFull` in the table crate.
#[derive(Error, Debug)]
pub enum Error {
    /// A key handed to the table violates the prefix preconditions.
    #[error("invalid prefix {prefix:?}: {reason}")]
    InvalidPrefix { prefix: String, reason: &'static str },

    /// Destination port out of range for the configured port count.
    #[error("invalid port {port}: must be below {max_ports}")]
    InvalidPort { port: u16, max_ports: u16 },

    /// Port mask that selects no port, or a port beyond `max_ports`.
    #[error("invalid port mask {0}")]
    InvalidPortMask(String),

    /// Tuning configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The record log cannot admit another record.
    #[error("log overflow inserting {prefix:?}: need {needed} bytes, capacity is {capacity}")]
    LogOverflow {
        prefix: String,
        needed: usize,
        capacity: usize,
    },

    /// A prefix was missing during the check pass.
    #[error("prefix {0} absent")]
    PrefixAbsent(String),

    /// The index or log breaks a structural invariant.
    #[error("corrupt table: {0}")]
    Corrupt(String),

    /// A corpus URL does not fit in `max_url_len` bytes.
    #[error("URL {url:?} is {len} bytes, limit is {max} bytes")]
    UrlTooLong { url: String, len: usize, max: usize },

    /// A corpus URL has more components than the statistics bound.
    #[error("URL {url:?} has {components} components, limit is {max}")]
    TooManyComponents {
        url: String,
        components: usize,
        max: usize,
    },

    /// A backing region could not be acquired or has the wrong shape.
    #[error("allocation error: {0}")]
    Allocation(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration source error
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// Builds an [`Error::InvalidPrefix`] rendering the key lossily.
    pub fn invalid_prefix(prefix: &[u8], reason: &'static str) -> Self {
        Error::InvalidPrefix {
            prefix: String::from_utf8_lossy(prefix).into_owned(),
            reason,
        }
    }
}
