//! Corpus inspection commands for the NDN FIB CLI

use anyhow::{Context, Result};
use rust_ndnfib_table::{count_urls, url_array, url_stats};
use std::path::{Path, PathBuf};

use super::load_config;
use crate::utils::{human_bytes, section};

/// Print the number of URLs in a corpus
pub fn count(urls: PathBuf) -> Result<()> {
    let total = count_urls(&urls)
        .with_context(|| format!("Failed to read {}", urls.display()))?;
    println!("Total urls = {}", total);
    Ok(())
}

/// Print the component histogram of a corpus
pub fn stats(config_path: Option<&Path>, urls: PathBuf, json: bool) -> Result<()> {
    let config = load_config(config_path, None)?;
    let stats = url_stats(&urls, &config)
        .with_context(|| format!("Failed to collect stats for {}", urls.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", stats);
    }
    Ok(())
}

/// Load a corpus into a URL array and print its head
pub fn array(config_path: Option<&Path>, urls: PathBuf, limit: usize) -> Result<()> {
    let config = load_config(config_path, None)?;
    let array = url_array(&urls, config.max_url_len)
        .with_context(|| format!("Failed to load {}", urls.display()))?;

    section("URL array");
    println!(
        "{} URLs in slots of {} bytes ({})",
        array.len(),
        array.stride(),
        human_bytes(array.as_bytes().len())
    );
    for (i, url) in array.iter().take(limit).enumerate() {
        println!("[{}] {}", i, String::from_utf8_lossy(url));
    }
    Ok(())
}
