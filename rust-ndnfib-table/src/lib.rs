//! URL-prefix hash table for NDN forwarding.
//!
//! The table stores every `/`-terminated prefix of a set of NDN URLs in a
//! two-choice bucketed index over an append-only record log, and answers
//! exact-prefix lookups. Interior prefixes mark nodes of the name tree;
//! terminal prefixes are the forwarded URLs and carry a destination port.
//!
//! The table is built once by a single writer ([`driver::build`]) and then
//! frozen ([`FibTable::freeze`]) for concurrent readers.

pub mod corpus;
pub mod driver;
pub mod hash;
pub mod record;
pub mod region;
pub mod slot;
pub mod table;

pub use corpus::{count_urls, url_array, UrlArray, UrlCorpus};
pub use driver::{build, check, check_path, init, url_stats, BuildReport, CheckReport, ComponentStats};
pub use region::{AnonMmapAllocator, HeapAllocator, HeapRegion, MmapRegion, Region, RegionAllocator};
pub use table::{FibTable, FrozenFib, InsertOutcome, TableStats};
