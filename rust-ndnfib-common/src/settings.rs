//! Tuning configuration for the FIB hash table.
//!
//! Every constant the table and its driver depend on lives here. Values are
//! layered from built-in defaults, an optional configuration file and
//! `NDNFIB_*` environment variables.

use config::{Config, Environment, File};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;
use crate::types::PORT_LIMIT;
use crate::Result;

/// Bytes of record metadata preceding the key bytes in the log.
pub const RECORD_HEADER_LEN: usize = 3;

/// Width of one slot in bytes.
pub const SLOT_BYTES: usize = std::mem::size_of::<u64>();

/// Largest offset a slot can address.
pub const MAX_LOG_OFFSET: u64 = (1 << 48) - 1;

/// Tuning knobs of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FibConfig {
    /// Number of buckets in the index. Must be a power of two.
    pub num_buckets: usize,

    /// Slots per bucket.
    pub slots_per_bucket: usize,

    /// Maximum prefix length in bytes, trailing delimiter included.
    pub max_url_len: usize,

    /// Record log capacity in bytes.
    pub log_capacity: usize,

    /// Free bytes that must remain past a record before it is admitted.
    pub log_headroom: usize,

    /// Upper bound of the component histogram.
    pub max_components: usize,

    /// Number of addressable output ports.
    pub max_ports: u16,

    /// Seed for port assignment. Random when absent.
    pub seed: Option<u64>,

    /// Log build progress every this many URLs. Must be a power of two.
    pub progress_interval: usize,
}

impl Default for FibConfig {
    fn default() -> Self {
        Self {
            num_buckets: 1 << 20,
            slots_per_bucket: 8,
            max_url_len: 128,
            log_capacity: 256 * 1024 * 1024,
            log_headroom: 256,
            max_components: 16,
            max_ports: 16,
            seed: None,
            progress_interval: 512 * 1024,
        }
    }
}

impl FibConfig {
    /// Load configuration from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            debug!("Loading FIB configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        }
        let config: FibConfig = builder
            .add_source(Environment::with_prefix("NDNFIB"))
            .build()?
            .try_deserialize()?;
        config.validate()
    }

    /// Check the relationships between the tuning constants.
    pub fn validate(self) -> Result<Self> {
        if self.num_buckets == 0 || !self.num_buckets.is_power_of_two() {
            return Err(Error::InvalidConfig(format!(
                "num_buckets = {} is not a power of two",
                self.num_buckets
            )));
        }
        if self.slots_per_bucket == 0 {
            return Err(Error::InvalidConfig("slots_per_bucket must be positive".into()));
        }
        if self.max_url_len == 0 || self.max_url_len > u8::MAX as usize {
            return Err(Error::InvalidConfig(format!(
                "max_url_len = {} does not fit the one-byte record length",
                self.max_url_len
            )));
        }
        if self.log_headroom < RECORD_HEADER_LEN + self.max_url_len {
            return Err(Error::InvalidConfig(format!(
                "log_headroom = {} is smaller than one maximal record ({} bytes)",
                self.log_headroom,
                RECORD_HEADER_LEN + self.max_url_len
            )));
        }
        if self.log_capacity <= self.log_headroom {
            return Err(Error::InvalidConfig(format!(
                "log_capacity = {} leaves no room past the headroom",
                self.log_capacity
            )));
        }
        if self.log_capacity as u64 > MAX_LOG_OFFSET {
            return Err(Error::InvalidConfig(format!(
                "log_capacity = {} exceeds the 48-bit slot offset",
                self.log_capacity
            )));
        }
        if self.max_ports == 0 || self.max_ports > PORT_LIMIT {
            return Err(Error::InvalidConfig(format!(
                "max_ports = {} must be in 1..={}",
                self.max_ports, PORT_LIMIT
            )));
        }
        if self.progress_interval == 0 || !self.progress_interval.is_power_of_two() {
            return Err(Error::InvalidConfig(format!(
                "progress_interval = {} is not a power of two",
                self.progress_interval
            )));
        }
        Ok(self)
    }

    /// Bytes occupied by one bucket.
    pub fn bucket_bytes(&self) -> usize {
        self.slots_per_bucket * SLOT_BYTES
    }

    /// Alignment the index region must honour.
    pub fn index_align(&self) -> usize {
        self.bucket_bytes().next_power_of_two()
    }

    /// Size of the index region in bytes.
    pub fn index_bytes(&self) -> usize {
        self.num_buckets * self.bucket_bytes()
    }

    /// Total slot count.
    pub fn capacity(&self) -> usize {
        self.num_buckets * self.slots_per_bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn small() -> FibConfig {
        FibConfig {
            num_buckets: 16,
            log_capacity: 4096,
            ..FibConfig::default()
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = FibConfig::default().validate().unwrap();
        assert_eq!(config.bucket_bytes(), 64);
        assert_eq!(config.index_align(), 64);
        assert_eq!(config.capacity(), 8 << 20);
    }

    #[test]
    fn test_rejects_bad_bucket_count() {
        let config = FibConfig { num_buckets: 12, ..small() };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        let config = FibConfig { num_buckets: 0, ..small() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_headroom_must_cover_a_record() {
        let config = FibConfig { log_headroom: 130, ..small() };
        assert!(config.validate().is_err());
        let config = FibConfig { log_headroom: 131, ..small() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_port_limit() {
        assert!(FibConfig { max_ports: 255, ..small() }.validate().is_ok());
        assert!(FibConfig { max_ports: 256, ..small() }.validate().is_err());
        assert!(FibConfig { max_ports: 0, ..small() }.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "num_buckets = 64\nslots_per_bucket = 4\nseed = 7").unwrap();

        let config = FibConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.num_buckets, 64);
        assert_eq!(config.slots_per_bucket, 4);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_url_len, 128);
        assert_eq!(config.index_align(), 32);
    }
}
