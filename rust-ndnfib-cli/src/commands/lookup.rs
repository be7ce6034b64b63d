//! Lookup command implementation for the NDN FIB CLI

use anyhow::Result;
use rust_ndnfib_common::prefix::DELIMITER;
use rust_ndnfib_common::{FibConfig, PrefixKind};
use rust_ndnfib_table::{HeapAllocator, RegionAllocator};
use std::path::Path;

use super::{build_table, load_config, mmap_allocator};
use crate::TableArgs;

/// Handle the lookup command
pub fn handle_command(config_path: Option<&Path>, args: TableArgs, prefixes: Vec<String>) -> Result<()> {
    let config = load_config(config_path, args.seed)?;
    if args.mmap {
        run(config, &args, &mmap_allocator(), &prefixes)
    } else {
        run(config, &args, &HeapAllocator, &prefixes)
    }
}

fn run<A: RegionAllocator>(
    config: FibConfig,
    args: &TableArgs,
    allocator: &A,
    prefixes: &[String],
) -> Result<()> {
    let (table, _) = build_table(config, args, allocator)?;
    let frozen = table.freeze();

    for prefix in prefixes {
        let mut key = prefix.as_bytes().to_vec();
        if key.last() != Some(&DELIMITER) {
            key.push(DELIMITER);
        }
        let shown = String::from_utf8_lossy(&key);
        match frozen.lookup(&key)? {
            Some(PrefixKind::Terminal(port)) => println!("{}: terminal, {}", shown, port),
            Some(PrefixKind::Interior) => println!("{}: interior", shown),
            None => println!("{}: absent", shown),
        }
    }
    Ok(())
}
