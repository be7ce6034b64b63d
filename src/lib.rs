//! NDN forwarding information base built on a two-choice URL-prefix hash table.
//!
//! This crate re-exports the workspace members so that a single dependency
//! gives access to the configuration, the table and its build driver.

pub use rust_ndnfib_common as common;
pub use rust_ndnfib_table as table;

pub use rust_ndnfib_common::{Error, FibConfig, PortId, PortMask, PrefixKind, Prefixes, Result};
pub use rust_ndnfib_table::{
    build, check, check_path, count_urls, init, url_array, url_stats, FibTable, FrozenFib,
    HeapAllocator, InsertOutcome,
};
