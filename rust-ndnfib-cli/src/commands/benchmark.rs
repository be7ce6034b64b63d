//! Benchmarking command implementation for the NDN FIB CLI
//!
//! Builds the table once, freezes it and lets several readers hammer the
//! shared copy with every prefix of the corpus.

use anyhow::{Context, Result};
use futures::future::join_all;
use log::info;
use rust_ndnfib_common::metrics::FibMetrics;
use rust_ndnfib_common::{FibConfig, Prefixes};
use rust_ndnfib_table::{FrozenFib, HeapAllocator, Region, RegionAllocator, UrlCorpus};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use super::{build_table, load_config, mmap_allocator};
use crate::utils::{human_duration, section};
use crate::TableArgs;

/// Run the benchmark with the specified parameters
pub async fn run_benchmark(
    config_path: Option<&Path>,
    args: TableArgs,
    readers: usize,
    rounds: usize,
) -> Result<()> {
    let config = load_config(config_path, args.seed)?;
    info!(
        "Running benchmark: urls={}, readers={}, rounds={}",
        args.urls.display(),
        readers,
        rounds
    );

    if args.mmap {
        run(config, &args, &mmap_allocator(), readers, rounds).await
    } else {
        run(config, &args, &HeapAllocator, readers, rounds).await
    }
}

async fn run<A>(
    config: FibConfig,
    args: &TableArgs,
    allocator: &A,
    readers: usize,
    rounds: usize,
) -> Result<()>
where
    A: RegionAllocator,
    A::Region: 'static,
{
    let max_url_len = config.max_url_len;
    let (table, report) = build_table(config, args, allocator)?;
    let frozen = Arc::new(table.freeze());

    // Every key the build offered, hits by construction.
    let mut keys = Vec::new();
    for url in UrlCorpus::open(&args.urls, max_url_len)? {
        for prefix in Prefixes::new(&url?).iter() {
            keys.push(prefix.key().to_vec());
        }
    }
    let keys = Arc::new(keys);

    println!("Starting FIB benchmark");
    println!("======================");
    println!("Parameters:");
    println!("  URLs: {}", report.urls);
    println!("  Prefixes per round: {}", keys.len());
    println!("  Concurrent readers: {}", readers);
    println!("  Rounds per reader: {}", rounds);

    let metrics = Arc::new(FibMetrics::new());
    let start = Instant::now();

    let tasks: Vec<_> = (0..readers.max(1))
        .map(|_| {
            let frozen = Arc::clone(&frozen);
            let keys = Arc::clone(&keys);
            let metrics = Arc::clone(&metrics);
            tokio::task::spawn_blocking(move || read_rounds(&frozen, &keys, rounds, &metrics))
        })
        .collect();

    for result in join_all(tasks).await {
        result.context("Reader task panicked")??;
    }

    print_benchmark_results(&metrics, start.elapsed().as_secs_f64());
    Ok(())
}

fn read_rounds<R: Region>(
    frozen: &FrozenFib<R>,
    keys: &[Vec<u8>],
    rounds: usize,
    metrics: &FibMetrics,
) -> rust_ndnfib_common::Result<()> {
    let mut hits = 0u64;
    let mut misses = 0u64;
    for _ in 0..rounds {
        for key in keys {
            if frozen.contains(key)? {
                hits += 1;
            } else {
                misses += 1;
            }
        }
    }
    metrics.lookup_hits.add(hits);
    metrics.lookup_misses.add(misses);
    Ok(())
}

/// Print the benchmark results
fn print_benchmark_results(metrics: &FibMetrics, secs: f64) {
    let hits = metrics.lookup_hits.value();
    let misses = metrics.lookup_misses.value();
    let total = hits + misses;

    section("Benchmark Results");
    println!("Total lookups: {}", total);
    println!("Hits: {}", hits);
    println!("Misses: {}", misses);
    println!("Total Time: {}", human_duration(std::time::Duration::from_secs_f64(secs)));
    if secs > 0.0 {
        println!("Throughput: {:.2} Mlookups/second", total as f64 / secs / 1e6);
    }
}
