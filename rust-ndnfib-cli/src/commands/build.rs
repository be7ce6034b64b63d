//! Build command implementation for the NDN FIB CLI

use anyhow::{Context, Result};
use log::info;
use rust_ndnfib_common::FibConfig;
use rust_ndnfib_table::{check_path, HeapAllocator, RegionAllocator};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

use super::{build_table, load_config, mmap_allocator};
use crate::utils::{human_bytes, human_duration, log_usage, section};
use crate::TableArgs;

/// Handle the build command
pub fn handle_command(
    config_path: Option<&Path>,
    args: TableArgs,
    check: bool,
    verify: bool,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path, args.seed)?;
    if args.mmap {
        run(config, &args, &mmap_allocator(), check, verify, json)
    } else {
        run(config, &args, &HeapAllocator, check, verify, json)
    }
}

fn run<A: RegionAllocator>(
    config: FibConfig,
    args: &TableArgs,
    allocator: &A,
    check: bool,
    verify: bool,
    json: bool,
) -> Result<()> {
    let (table, report) = build_table(config, args, allocator)?;

    if verify {
        let records = table.verify().context("FIB structure check failed")?;
        info!("Verified {} records", records);
    }

    let checked = if check {
        Some(check_path(&table, &args.urls).context("FIB check pass failed")?)
    } else {
        None
    };

    let stats = table.stats();

    if json {
        let out = json!({
            "build": report,
            "check": checked,
            "table": stats,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    section("FIB build");
    println!("URLs:              {}", report.urls);
    println!("Prefixes offered:  {}", report.prefixes);
    println!("Records inserted:  {}", report.records_inserted);
    println!("Duplicates:        {}", report.duplicates);
    println!("Upgrades:          {}", report.upgrades);
    println!("Insert failures:   {}", report.insert_failures);
    println!("Build time:        {}", human_duration(Duration::from_millis(report.elapsed_ms)));

    section("Table");
    println!("Buckets:           {} x {} slots", stats.buckets, stats.slots_per_bucket);
    println!("Load factor:       {:.2}%", stats.load_factor * 100.0);
    println!("Index memory:      {}", human_bytes(stats.index_bytes));
    println!(
        "Log memory used:   {}",
        log_usage(stats.log_bytes_used, stats.log_capacity)
    );
    for (fill, buckets) in stats.bucket_fill.iter().enumerate() {
        println!("  {} buckets hold {} records", buckets, fill);
    }

    if let Some(checked) = checked {
        section("Check");
        println!("Checked {} URLs ({} prefixes): all present", checked.urls, checked.prefixes);
    }

    Ok(())
}
