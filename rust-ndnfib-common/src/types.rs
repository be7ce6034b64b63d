//! Common types shared between the hash table, its driver and the CLI.
//!
//! These types describe what a FIB record carries: whether a prefix is an
//! interior node of the name tree or a forwarded URL, and which output port a
//! forwarded URL leaves through.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Record byte stored for prefixes that carry no port.
pub const NO_PORT: u8 = 0xFF;

/// Upper bound on the number of ports a one-byte record field can name
/// without colliding with [`NO_PORT`].
pub const PORT_LIMIT: u16 = NO_PORT as u16;

/// Destination port identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PortId(pub u8);

impl PortId {
    /// The record byte for this port.
    pub fn as_byte(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port {}", self.0)
    }
}

/// What a prefix is on the name tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrefixKind {
    /// A proper ancestor of some forwarded URL. Has no port.
    Interior,
    /// A forwarded URL, leaving through the given port.
    Terminal(PortId),
}

impl PrefixKind {
    /// Whether this is a terminal prefix.
    pub fn is_terminal(self) -> bool {
        matches!(self, PrefixKind::Terminal(_))
    }

    /// The port of a terminal prefix.
    pub fn port(self) -> Option<PortId> {
        match self {
            PrefixKind::Interior => None,
            PrefixKind::Terminal(port) => Some(port),
        }
    }

    /// Encodes the `(is_terminal, dst_port)` record header bytes.
    pub fn to_header(self) -> (u8, u8) {
        match self {
            PrefixKind::Interior => (0, NO_PORT),
            PrefixKind::Terminal(port) => (1, port.as_byte()),
        }
    }

    /// Decodes the `(is_terminal, dst_port)` record header bytes.
    pub fn from_header(is_terminal: u8, dst_port: u8) -> Self {
        if is_terminal == 0 {
            PrefixKind::Interior
        } else {
            PrefixKind::Terminal(PortId(dst_port))
        }
    }
}

/// Bitmask of active output ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PortMask(pub u64);

impl PortMask {
    /// Number of active ports.
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Active ports in ascending order.
    pub fn active_ports(self) -> Vec<PortId> {
        (0..64u8)
            .filter(|bit| self.0 & (1u64 << bit) != 0)
            .map(PortId)
            .collect()
    }

    /// Rejects empty masks and masks naming ports at or above `max_ports`.
    pub fn validate(self, max_ports: u16) -> Result<Self, Error> {
        if self.0 == 0 {
            return Err(Error::InvalidPortMask(format!("{:#x} selects no port", self.0)));
        }
        let highest = 63 - self.0.leading_zeros() as u16;
        if highest >= max_ports {
            return Err(Error::InvalidPortMask(format!(
                "{:#x} names port {} but only {} ports are configured",
                self.0, highest, max_ports
            )));
        }
        Ok(self)
    }
}

impl FromStr for PortMask {
    type Err = Error;

    /// Parses `0x`-prefixed hex (the usual `-p PORTMASK` form) or decimal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => trimmed.parse::<u64>(),
        };
        parsed
            .map(PortMask)
            .map_err(|e| Error::InvalidPortMask(format!("{s:?}: {e}")))
    }
}

impl fmt::Display for PortMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
