//! Build, check and statistics passes over a URL corpus.
//!
//! The build pass inserts every prefix of every URL: `/`-terminated interior
//! prefixes as [`PrefixKind::Interior`], the URL itself (with a trailing `/`
//! added when missing) as terminal with a port drawn from the active set.
//! The check pass replays the same decomposition and requires every prefix
//! to be present.

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_ndnfib_common::metrics::Histogram;
use rust_ndnfib_common::prefix::{lossy, num_components};
use rust_ndnfib_common::{Error, FibConfig, PortMask, PrefixKind, Prefixes, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::time::Instant;

use crate::corpus::UrlCorpus;
use crate::region::{Region, RegionAllocator};
use crate::table::{FibTable, InsertOutcome};


/// Outcome of a build pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub urls: u64,
    pub prefixes: u64,
    pub records_inserted: u64,
    pub duplicates: u64,
    pub upgrades: u64,
    pub insert_failures: u64,
    pub log_bytes_used: u64,
    pub elapsed_ms: u64,
}

/// Outcome of a successful check pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub urls: u64,
    pub prefixes: u64,
}

/// Inserts every prefix of every URL in `corpus`.
///
/// Buckets-full failures are logged and counted; every other error aborts
/// the build.
pub fn build<R, I>(table: &mut FibTable<R>, corpus: I, ports: PortMask) -> Result<BuildReport>
where
    R: Region,
    I: IntoIterator<Item = Result<Vec<u8>>>,
{
    let ports = ports.validate(table.config().max_ports)?.active_ports();
    let mut rng = match table.config().seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let progress_mask = table.config().progress_interval as u64 - 1;

    let start = Instant::now();
    let before = table.metrics().clone();
    let mut fails = 0u64;

    for url in corpus {
        let url = url?;
        let port = ports[rng.gen_range(0..ports.len())];
        let walk = Prefixes::new(&url);

        for prefix in walk.iter() {
            let kind = if prefix.is_terminal() {
                PrefixKind::Terminal(port)
            } else {
                PrefixKind::Interior
            };
            table.metrics().prefixes_offered.increment();
            if table.insert(prefix.key(), kind)? == InsertOutcome::BucketsFull {
                warn!("Unable to insert URL: {}", prefix);
                fails += 1;
            }
        }

        table.metrics().urls_read.increment();
        let urls = table.metrics().urls_read.value() - before.urls_read.value();
        if urls & progress_mask == 0 {
            info!("Total urls = {}. Fails = {}", urls, fails);
        }
    }

    let after = table.metrics();
    let report = BuildReport {
        urls: after.urls_read.value() - before.urls_read.value(),
        prefixes: after.prefixes_offered.value() - before.prefixes_offered.value(),
        records_inserted: after.records_inserted.value() - before.records_inserted.value(),
        duplicates: after.duplicates.value() - before.duplicates.value(),
        upgrades: after.upgrades.value() - before.upgrades.value(),
        insert_failures: fails,
        log_bytes_used: after.log_bytes.value(),
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    info!("Total urls = {}. Fails = {}.", report.urls, report.insert_failures);
    info!("Total log memory used = {} bytes", report.log_bytes_used);
    Ok(report)
}

/// Allocates a table from `allocator` and builds it from the corpus at
/// `path`.
pub fn init<A, P>(
    path: P,
    ports: PortMask,
    config: FibConfig,
    allocator: &A,
) -> Result<(FibTable<A::Region>, BuildReport)>
where
    A: RegionAllocator,
    P: AsRef<Path>,
{
    let mut table = FibTable::new_in(config, allocator)?;
    let corpus = UrlCorpus::open(path, table.config().max_url_len)?;
    let report = build(&mut table, corpus, ports)?;
    Ok((table, report))
}

/// Requires every prefix of every URL in `corpus` to be present. Never
/// modifies the table.
pub fn check<R, I>(table: &FibTable<R>, corpus: I) -> Result<CheckReport>
where
    R: Region,
    I: IntoIterator<Item = Result<Vec<u8>>>,
{
    let progress_mask = table.config().progress_interval as u64 - 1;
    let mut report = CheckReport::default();

    for url in corpus {
        let url = url?;
        for prefix in Prefixes::new(&url).iter() {
            if table.lookup(prefix.key())?.is_none() {
                error!("Prefix {} absent.", prefix);
                return Err(Error::PrefixAbsent(prefix.to_string()));
            }
            report.prefixes += 1;
        }

        report.urls += 1;
        if report.urls & progress_mask == 0 {
            info!("Checked {} URLs.", report.urls);
        }
    }
    info!("Checked {} URLs, {} prefixes.", report.urls, report.prefixes);
    Ok(report)
}

/// Runs [`check`] against the corpus at `path`.
pub fn check_path<R: Region, P: AsRef<Path>>(table: &FibTable<R>, path: P) -> Result<CheckReport> {
    let corpus = UrlCorpus::open(path, table.config().max_url_len)?;
    check(table, corpus)
}

/// Histogram of URL component counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentStats {
    /// `counts[k]` is the number of URLs with `k` components.
    pub counts: Vec<u64>,
}

impl ComponentStats {
    /// Tallies the component counts of `corpus`. A URL with more than
    /// `max_components` components is an error.
    pub fn collect<I>(corpus: I, max_components: usize) -> Result<Self>
    where
        I: IntoIterator<Item = Result<Vec<u8>>>,
    {
        let histogram = Histogram::exact(max_components as u64);
        for url in corpus {
            let url = url?;
            let components = num_components(&url);
            if !histogram.observe(components as u64) {
                return Err(Error::TooManyComponents {
                    url: lossy(&url).into_owned(),
                    components,
                    max: max_components,
                });
            }
        }
        Ok(Self {
            counts: histogram.counts().into_iter().map(|(_, n)| n).collect(),
        })
    }

    pub fn urls(&self) -> u64 {
        self.counts.iter().sum()
    }
}

impl fmt::Display for ComponentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "URL stats:")?;
        for (components, urls) in self.counts.iter().enumerate() {
            writeln!(f, "{} URLs have {} components", urls, components)?;
        }
        Ok(())
    }
}

/// Component statistics of the corpus at `path`.
pub fn url_stats<P: AsRef<Path>>(path: P, config: &FibConfig) -> Result<ComponentStats> {
    let corpus = UrlCorpus::open(path, config.max_url_len)?;
    ComponentStats::collect(corpus, config.max_components)
}
