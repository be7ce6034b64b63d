//! Subcommand implementations for the NDN FIB CLI

use anyhow::{Context, Result};
use rust_ndnfib_common::FibConfig;
use rust_ndnfib_table::{driver, AnonMmapAllocator, BuildReport, FibTable, RegionAllocator};
use std::path::Path;

use crate::utils::timed;
use crate::TableArgs;

pub mod benchmark;
pub mod build;
pub mod corpus;
pub mod lookup;

/// Load the table configuration, letting `--seed` override the file.
pub fn load_config(path: Option<&Path>, seed: Option<u64>) -> Result<FibConfig> {
    let mut config = FibConfig::load(path).context("Failed to load table configuration")?;
    if seed.is_some() {
        config.seed = seed;
    }
    Ok(config)
}

/// Allocator used for `--mmap`.
pub fn mmap_allocator() -> AnonMmapAllocator {
    AnonMmapAllocator { populate: true }
}

/// Build a table from the corpus named in `args`.
pub fn build_table<A: RegionAllocator>(
    config: FibConfig,
    args: &TableArgs,
    allocator: &A,
) -> Result<(FibTable<A::Region>, BuildReport)> {
    timed("FIB build", || driver::init(&args.urls, args.portmask, config, allocator))
        .with_context(|| format!("Failed to build FIB from {}", args.urls.display()))
}
