//! The record log.
//!
//! Records are appended back to back into one byte region:
//!
//! | offset | width | field                                   |
//! |-------:|------:|-----------------------------------------|
//! | 0      | 1     | key length `L`                          |
//! | 1      | 1     | `is_terminal` (0 interior, 1 terminal)  |
//! | 2      | 1     | destination port, `0xFF` when none      |
//! | 3      | L     | key bytes, trailing `/` included        |
//!
//! The head starts at 1 so that offset zero stays free for the empty-slot
//! sentinel. Records never move and are never removed.

use rust_ndnfib_common::prefix::lossy;
use rust_ndnfib_common::settings::RECORD_HEADER_LEN;
use rust_ndnfib_common::{Error, PrefixKind, Result};

use crate::region::Region;

const LEN: usize = 0;
const IS_TERMINAL: usize = 1;
const DST_PORT: usize = 2;

/// First offset handed out by a fresh log.
pub const FIRST_OFFSET: usize = 1;

/// Bytes a record for a key of `key_len` bytes occupies.
#[inline]
pub fn footprint(key_len: usize) -> usize {
    RECORD_HEADER_LEN + key_len
}

/// A decoded view of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub offset: u64,
    pub kind: PrefixKind,
    pub key: &'a [u8],
}

impl<'a> Record<'a> {
    /// Decodes the record starting at `offset`.
    #[inline]
    pub fn decode(log: &'a [u8], offset: u64) -> Self {
        let at = offset as usize;
        let len = log[at + LEN] as usize;
        Self {
            offset,
            kind: PrefixKind::from_header(log[at + IS_TERMINAL], log[at + DST_PORT]),
            key: &log[at + RECORD_HEADER_LEN..at + RECORD_HEADER_LEN + len],
        }
    }

    /// Compares the stored key against `key`: length first, then bytes.
    #[inline]
    pub fn matches(log: &[u8], offset: u64, key: &[u8]) -> bool {
        let at = offset as usize;
        log[at + LEN] as usize == key.len()
            && &log[at + RECORD_HEADER_LEN..at + RECORD_HEADER_LEN + key.len()] == key
    }
}

/// Append-only record log over a [`Region`].
#[derive(Debug)]
pub struct RecordLog<R: Region> {
    region: R,
    head: usize,
    capacity: usize,
    headroom: usize,
}

impl<R: Region> RecordLog<R> {
    /// Wraps a zeroed region. Only the first `capacity` bytes are ever
    /// handed out, whatever the region's size.
    pub fn new(region: R, capacity: usize, headroom: usize) -> Self {
        debug_assert!(capacity <= region.len());
        Self {
            region,
            head: FIRST_OFFSET,
            capacity,
            headroom,
        }
    }

    /// Next offset to be handed out.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Declared capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raw log bytes.
    pub fn bytes(&self) -> &[u8] {
        self.region.as_bytes()
    }

    /// Appends a record and returns its offset.
    pub fn append(&mut self, key: &[u8], kind: PrefixKind) -> Result<u64> {
        let offset = self.head;
        let size = footprint(key.len());
        let needed = offset + size + self.headroom;
        if needed > self.capacity() {
            return Err(Error::LogOverflow {
                prefix: lossy(key).into_owned(),
                needed,
                capacity: self.capacity(),
            });
        }

        let (is_terminal, dst_port) = kind.to_header();
        let log = self.region.as_bytes_mut();
        log[offset + LEN] = key.len() as u8;
        log[offset + IS_TERMINAL] = is_terminal;
        log[offset + DST_PORT] = dst_port;
        log[offset + RECORD_HEADER_LEN..offset + size].copy_from_slice(key);

        self.head += size;
        Ok(offset as u64)
    }

    /// Decodes the record at `offset`.
    #[inline]
    pub fn get(&self, offset: u64) -> Record<'_> {
        Record::decode(self.bytes(), offset)
    }

    /// Promotes the record at `offset` to terminal. Returns false, leaving the
    /// record untouched, when it already is terminal.
    pub fn upgrade(&mut self, offset: u64, kind: PrefixKind) -> bool {
        let at = offset as usize;
        let log = self.region.as_bytes_mut();
        if log[at + IS_TERMINAL] != 0 {
            return false;
        }
        let (is_terminal, dst_port) = kind.to_header();
        // Port before flag: a reader that sees the flag sees the port.
        log[at + DST_PORT] = dst_port;
        log[at + IS_TERMINAL] = is_terminal;
        true
    }
}
