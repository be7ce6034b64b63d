use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rust_ndnfib_common::PortMask;
use std::path::PathBuf;

mod commands;
mod utils;

/// NDN FIB Command Line Interface
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Sets the level of verbosity
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Table configuration file (TOML, JSON or YAML)
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute
    #[clap(subcommand)]
    command: Commands,
}

/// Options shared by every command that builds a table.
#[derive(Args, Debug, Clone)]
pub struct TableArgs {
    /// URL corpus file
    urls: PathBuf,

    /// Bitmask of active ports (hex with 0x prefix, or decimal)
    #[clap(short, long)]
    portmask: PortMask,

    /// Seed for port assignment
    #[clap(long)]
    seed: Option<u64>,

    /// Back the table with anonymous memory mappings instead of the heap
    #[clap(long)]
    mmap: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the FIB from a URL corpus
    Build {
        #[clap(flatten)]
        table: TableArgs,

        /// Re-query every prefix after the build
        #[clap(long)]
        check: bool,

        /// Walk the index and validate its structure
        #[clap(long)]
        verify: bool,

        /// Print the build report as JSON
        #[clap(long)]
        json: bool,
    },

    /// Count the URLs in a corpus
    Count {
        /// URL corpus file
        urls: PathBuf,
    },

    /// Print the component histogram of a corpus
    Stats {
        /// URL corpus file
        urls: PathBuf,

        /// Print as JSON
        #[clap(long)]
        json: bool,
    },

    /// Load a corpus into a fixed-slot URL array
    Array {
        /// URL corpus file
        urls: PathBuf,

        /// Number of URLs to print
        #[clap(short, long, default_value = "10")]
        limit: usize,
    },

    /// Build the FIB and look up prefixes in it
    Lookup {
        #[clap(flatten)]
        table: TableArgs,

        /// Prefixes to look up; a trailing '/' is added when missing
        #[clap(required = true)]
        prefixes: Vec<String>,
    },

    /// Build the FIB and measure concurrent lookup throughput
    Bench {
        #[clap(flatten)]
        table: TableArgs,

        /// Number of concurrent readers
        #[clap(short, long, default_value = "4")]
        readers: usize,

        /// Passes over the prefix set per reader
        #[clap(long, default_value = "10")]
        rounds: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        if cli.verbose { "debug" } else { "info" }
    )).init();

    let config = cli.config.as_deref();

    // Execute the specified command
    match cli.command {
        Commands::Build { table, check, verify, json } => {
            commands::build::handle_command(config, table, check, verify, json)?;
        },
        Commands::Count { urls } => {
            commands::corpus::count(urls)?;
        },
        Commands::Stats { urls, json } => {
            commands::corpus::stats(config, urls, json)?;
        },
        Commands::Array { urls, limit } => {
            commands::corpus::array(config, urls, limit)?;
        },
        Commands::Lookup { table, prefixes } => {
            commands::lookup::handle_command(config, table, prefixes)?;
        },
        Commands::Bench { table, readers, rounds } => {
            commands::benchmark::run_benchmark(config, table, readers, rounds).await?;
        },
    }

    Ok(())
}
