//! The FIB hash table.
//!
//! An index of `B` buckets of `S` slots each points into an append-only
//! record log. Every key has two candidate buckets (see [`crate::hash`]) and
//! lives in the first free slot found across them at insertion time. There
//! is no displacement and no deletion.

use log::{debug, info, trace};
use rust_ndnfib_common::metrics::FibMetrics;
use rust_ndnfib_common::prefix::{lossy, DELIMITER};
use rust_ndnfib_common::settings::SLOT_BYTES;
use rust_ndnfib_common::{Error, FibConfig, PrefixKind, Result};
use serde::Serialize;
use std::collections::HashSet;

use crate::hash::Candidates;
use crate::record::{footprint, Record, RecordLog, FIRST_OFFSET};
use crate::region::{HeapAllocator, HeapRegion, Region, RegionAllocator};
use crate::slot;

#[cfg(test)]
mod proptests;

/// Result of [`FibTable::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The key was already present. A terminal insert may have upgraded it.
    Present,
    /// A new record was appended at `offset` and placed in `bucket`.
    Inserted { offset: u64, bucket: usize },
    /// Both candidate buckets are full. Nothing was written.
    BucketsFull,
}

/// Occupancy snapshot of a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStats {
    pub buckets: usize,
    pub slots_per_bucket: usize,
    pub records: usize,
    pub terminal_records: usize,
    pub load_factor: f64,
    /// `bucket_fill[n]` is the number of buckets holding exactly `n` records.
    pub bucket_fill: Vec<u64>,
    pub index_bytes: usize,
    pub log_bytes_used: usize,
    pub log_capacity: usize,
}

/// The FIB hash table: a bucketed slot index over a record log.
pub struct FibTable<R: Region = HeapRegion> {
    config: FibConfig,
    bucket_mask: u64,
    index: R,
    log: RecordLog<R>,
    metrics: FibMetrics,
}

impl FibTable<HeapRegion> {
    /// Creates an empty table backed by heap memory.
    pub fn new(config: FibConfig) -> Result<Self> {
        Self::new_in(config, &HeapAllocator)
    }
}

impl<R: Region> FibTable<R> {
    /// Creates an empty table with regions from `allocator`.
    pub fn new_in<A>(config: FibConfig, allocator: &A) -> Result<Self>
    where
        A: RegionAllocator<Region = R>,
    {
        let config = config.validate()?;
        info!("Initializing FIB index of size = {} bytes", config.index_bytes());
        let index = allocator.allocate(config.index_bytes(), config.index_align())?;
        info!("Initializing FIB record log of size = {} bytes", config.log_capacity);
        let log = allocator.allocate(config.log_capacity, SLOT_BYTES)?;
        Self::with_regions(config, index, log)
    }

    /// Builds a table over caller-provided regions. The index must be zeroed;
    /// a log larger than `log_capacity` is only used up to `log_capacity`.
    pub fn with_regions(config: FibConfig, index: R, log: R) -> Result<Self> {
        let config = config.validate()?;
        if index.len() != config.index_bytes() {
            return Err(Error::Allocation(format!(
                "index region is {} bytes, expected {}",
                index.len(),
                config.index_bytes()
            )));
        }
        if index.as_bytes().as_ptr() as usize % config.index_align() != 0 {
            return Err(Error::Allocation(format!(
                "index region is not aligned to {} bytes",
                config.index_align()
            )));
        }
        if log.len() < config.log_capacity {
            return Err(Error::Allocation(format!(
                "log region is {} bytes, expected at least {}",
                log.len(),
                config.log_capacity
            )));
        }
        if index.as_bytes().iter().any(|&b| b != 0) {
            return Err(Error::Allocation("index region is not zeroed".into()));
        }

        let metrics = FibMetrics::new();
        metrics.log_bytes.set(FIRST_OFFSET as u64);
        Ok(Self {
            bucket_mask: (config.num_buckets - 1) as u64,
            log: RecordLog::new(log, config.log_capacity, config.log_headroom),
            index,
            config,
            metrics,
        })
    }

    pub fn config(&self) -> &FibConfig {
        &self.config
    }

    pub fn metrics(&self) -> &FibMetrics {
        &self.metrics
    }

    /// Next free log offset. Starts at 1.
    pub fn log_head(&self) -> usize {
        self.log.head()
    }

    /// Raw log bytes.
    pub fn log_bytes(&self) -> &[u8] {
        self.log.bytes()
    }

    /// Candidate buckets of a key under this table's bucket count.
    pub fn candidates(&self, key: &[u8]) -> Candidates {
        Candidates::of(key, self.bucket_mask)
    }

    /// The slots of bucket `bucket`.
    pub fn bucket(&self, bucket: usize) -> &[u64] {
        let s = self.config.slots_per_bucket;
        &self.slots()[bucket * s..(bucket + 1) * s]
    }

    fn slots(&self) -> &[u64] {
        let bytes = self.index.as_bytes();
        // SAFETY: with_regions checked that the region is aligned for u64 and
        // spans exactly num_buckets * slots_per_bucket words; any bit pattern
        // is a valid u64.
        unsafe { std::slice::from_raw_parts(bytes.as_ptr() as *const u64, bytes.len() / SLOT_BYTES) }
    }

    fn slots_mut(&mut self) -> &mut [u64] {
        let bytes = self.index.as_bytes_mut();
        // SAFETY: as in `slots`, with exclusivity from &mut self.
        unsafe {
            std::slice::from_raw_parts_mut(bytes.as_mut_ptr() as *mut u64, bytes.len() / SLOT_BYTES)
        }
    }

    fn check_key(&self, key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(Error::invalid_prefix(key, "empty key"));
        }
        if key.len() > self.config.max_url_len {
            return Err(Error::invalid_prefix(key, "longer than max_url_len"));
        }
        if key[key.len() - 1] != DELIMITER {
            return Err(Error::invalid_prefix(key, "missing trailing delimiter"));
        }
        Ok(())
    }

    fn check_kind(&self, kind: PrefixKind) -> Result<()> {
        if let Some(port) = kind.port() {
            if u16::from(port.0) >= self.config.max_ports {
                return Err(Error::InvalidPort {
                    port: port.0.into(),
                    max_ports: self.config.max_ports,
                });
            }
        }
        Ok(())
    }

    /// Scans both candidate buckets, first then second, each in slot order.
    #[inline]
    fn find(&self, key: &[u8], candidates: &Candidates) -> Option<u64> {
        let log = self.log.bytes();
        for bucket in candidates.buckets() {
            for &word in self.bucket(bucket) {
                if slot::is_empty(word) || slot::tag_of(word) != candidates.tag {
                    continue;
                }
                let offset = slot::offset_of(word);
                if Record::matches(log, offset, key) {
                    return Some(offset);
                }
            }
        }
        None
    }

    fn probe(&mut self, key: &[u8], kind: PrefixKind, candidates: &Candidates) -> bool {
        let Some(offset) = self.find(key, candidates) else {
            return false;
        };
        if kind.is_terminal() && self.log.upgrade(offset, kind) {
            trace!("Upgraded {} to terminal", lossy(key));
            self.metrics.upgrades.increment();
        }
        true
    }

    /// Whether `key` is present. A terminal `kind` promotes a matching
    /// interior record to terminal with the given port; a terminal record is
    /// never changed. Pass [`PrefixKind::Interior`] to only test presence.
    pub fn contains(&mut self, key: &[u8], kind: PrefixKind) -> Result<bool> {
        self.check_key(key)?;
        self.check_kind(kind)?;
        let candidates = self.candidates(key);
        Ok(self.probe(key, kind, &candidates))
    }

    /// Read-only lookup. Returns the stored kind of `key`.
    pub fn lookup(&self, key: &[u8]) -> Result<Option<PrefixKind>> {
        self.check_key(key)?;
        let candidates = self.candidates(key);
        Ok(self
            .find(key, &candidates)
            .map(|offset| self.log.get(offset).kind))
    }

    /// Inserts `key` with `kind`, or upgrades it when already present.
    ///
    /// Fails with [`Error::LogOverflow`] when the log cannot admit the record
    /// plus the configured headroom.
    pub fn insert(&mut self, key: &[u8], kind: PrefixKind) -> Result<InsertOutcome> {
        self.check_key(key)?;
        self.check_kind(kind)?;
        let candidates = self.candidates(key);

        if self.probe(key, kind, &candidates) {
            self.metrics.duplicates.increment();
            return Ok(InsertOutcome::Present);
        }

        let s = self.config.slots_per_bucket;
        for bucket in candidates.buckets() {
            let base = bucket * s;
            let Some(i) = self.slots()[base..base + s]
                .iter()
                .position(|&word| slot::is_empty(word))
            else {
                continue;
            };

            let offset = self.log.append(key, kind)?;
            self.slots_mut()[base + i] = slot::encode(candidates.tag, offset);
            self.metrics.records_inserted.increment();
            self.metrics.log_bytes.set(self.log.head() as u64);
            trace!("Inserted {} at offset {} in bucket {}", lossy(key), offset, bucket);
            return Ok(InsertOutcome::Inserted { offset, bucket });
        }

        debug!(
            "Buckets {} and {} full for {}",
            candidates.first,
            candidates.second,
            lossy(key)
        );
        self.metrics.insert_failures.increment();
        Ok(InsertOutcome::BucketsFull)
    }

    /// Live records in index order.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> + '_ {
        let log = self.log.bytes();
        self.slots()
            .iter()
            .filter(|&&word| !slot::is_empty(word))
            .map(move |&word| Record::decode(log, slot::offset_of(word)))
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.slots().iter().filter(|&&w| !slot::is_empty(w)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Walks every slot and checks the structural invariants: each live slot
    /// references a distinct in-bounds record whose key is well formed,
    /// hashes to this bucket and carries this tag; keys are unique; the log
    /// head accounts for exactly the live records. Returns the record count.
    pub fn verify(&self) -> Result<usize> {
        let log = self.log.bytes();
        let head = self.log.head() as u64;
        let mut offsets = HashSet::new();
        let mut keys = HashSet::new();
        let mut used = FIRST_OFFSET;

        for bucket in 0..self.config.num_buckets {
            for (i, &word) in self.bucket(bucket).iter().enumerate() {
                if slot::is_empty(word) {
                    continue;
                }
                let offset = slot::offset_of(word);
                if offset >= head {
                    return Err(Error::Corrupt(format!(
                        "bucket {bucket} slot {i} points at {offset}, past log head {head}"
                    )));
                }
                if !offsets.insert(offset) {
                    return Err(Error::Corrupt(format!("offset {offset} referenced twice")));
                }

                let record = Record::decode(log, offset);
                if record.key.is_empty() || record.key[record.key.len() - 1] != DELIMITER {
                    return Err(Error::Corrupt(format!("malformed key at offset {offset}")));
                }
                let candidates = self.candidates(record.key);
                if !candidates.contains(bucket) {
                    return Err(Error::Corrupt(format!(
                        "{} found in bucket {bucket}, candidates are {} and {}",
                        lossy(record.key),
                        candidates.first,
                        candidates.second
                    )));
                }
                if candidates.tag != slot::tag_of(word) {
                    return Err(Error::Corrupt(format!(
                        "{} stored under tag {:#x}",
                        lossy(record.key),
                        slot::tag_of(word)
                    )));
                }
                if !keys.insert(record.key) {
                    return Err(Error::Corrupt(format!("{} stored twice", lossy(record.key))));
                }
                used += footprint(record.key.len());
            }
        }

        if used != self.log.head() {
            return Err(Error::Corrupt(format!(
                "log head is {} but live records end at {}",
                self.log.head(),
                used
            )));
        }
        Ok(keys.len())
    }

    /// Occupancy snapshot.
    pub fn stats(&self) -> TableStats {
        let s = self.config.slots_per_bucket;
        let mut bucket_fill = vec![0u64; s + 1];
        let mut records = 0;
        for bucket in 0..self.config.num_buckets {
            let fill = self.bucket(bucket).iter().filter(|&&w| !slot::is_empty(w)).count();
            bucket_fill[fill] += 1;
            records += fill;
        }
        let terminal_records = self.records().filter(|r| r.kind.is_terminal()).count();

        TableStats {
            buckets: self.config.num_buckets,
            slots_per_bucket: s,
            records,
            terminal_records,
            load_factor: records as f64 / self.config.capacity() as f64,
            bucket_fill,
            index_bytes: self.config.index_bytes(),
            log_bytes_used: self.log.head(),
            log_capacity: self.log.capacity(),
        }
    }

    /// Ends the build phase. The frozen table only offers reads and can be
    /// shared across threads.
    pub fn freeze(self) -> FrozenFib<R> {
        FrozenFib { table: self }
    }
}

impl<R: Region> std::fmt::Debug for FibTable<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FibTable")
            .field("buckets", &self.config.num_buckets)
            .field("slots_per_bucket", &self.config.slots_per_bucket)
            .field("log_head", &self.log.head())
            .field("log_capacity", &self.log.capacity())
            .finish()
    }
}

/// A built table. Lookups never write, so any number of threads may read
/// it at once.
#[derive(Debug)]
pub struct FrozenFib<R: Region = HeapRegion> {
    table: FibTable<R>,
}

impl<R: Region> FrozenFib<R> {
    /// Read-only lookup of `key`.
    #[inline]
    pub fn lookup(&self, key: &[u8]) -> Result<Option<PrefixKind>> {
        self.table.lookup(key)
    }

    /// Whether `key` is present.
    #[inline]
    pub fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.lookup(key)?.is_some())
    }

    /// The underlying table, read only.
    pub fn table(&self) -> &FibTable<R> {
        &self.table
    }
}
