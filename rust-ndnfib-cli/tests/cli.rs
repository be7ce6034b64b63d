//! End-to-end tests of the `ndnfib` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn corpus(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", text).unwrap();
    file
}

fn small_config() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "num_buckets = 1024\nlog_capacity = 1048576\nseed = 1\nmax_components = 8"
    )
    .unwrap();
    file
}

fn ndnfib() -> Command {
    Command::cargo_bin("ndnfib").unwrap()
}

#[test]
fn test_count() {
    let urls = corpus("/a/b /c\n/d/e/f\n");
    ndnfib()
        .arg("count")
        .arg(urls.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Total urls = 3"));
}

#[test]
fn test_stats() {
    let urls = corpus("/a /a/b /c/d\n");
    let config = small_config();
    ndnfib()
        .arg("--config")
        .arg(config.path())
        .arg("stats")
        .arg(urls.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("URL stats:"))
        .stdout(predicate::str::contains("2 URLs have 3 components"))
        .stdout(predicate::str::contains("1 URLs have 2 components"));
}

#[test]
fn test_build_with_check() {
    let urls = corpus("/a/b/\n/a/c/\n");
    let config = small_config();
    ndnfib()
        .arg("--config")
        .arg(config.path())
        .args(["build", "--portmask", "0x3", "--check", "--verify"])
        .arg(urls.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Records inserted:  4"))
        .stdout(predicate::str::contains("Insert failures:   0"))
        .stdout(predicate::str::contains("Log memory used:   27 B of 1.00 MiB"))
        .stdout(predicate::str::contains("all present"));
}

#[test]
fn test_build_json() {
    let urls = corpus("/a/b/\n");
    let config = small_config();
    ndnfib()
        .arg("--config")
        .arg(config.path())
        .args(["build", "--portmask", "1", "--json"])
        .arg(urls.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"log_bytes_used\": 19"))
        .stdout(predicate::str::contains("\"records_inserted\": 3"));
}

#[test]
fn test_lookup() {
    let urls = corpus("/p/q\n");
    let config = small_config();
    ndnfib()
        .arg("--config")
        .arg(config.path())
        .args(["lookup", "--portmask", "0x1"])
        .arg(urls.path())
        .args(["/p", "/p/q/", "/r"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/p/: interior"))
        .stdout(predicate::str::contains("/p/q/: terminal, port 0"))
        .stdout(predicate::str::contains("/r/: absent"));
}

#[test]
fn test_bench() {
    let urls = corpus("/a/b /a/c /d\n");
    let config = small_config();
    ndnfib()
        .arg("--config")
        .arg(config.path())
        .args(["bench", "--portmask", "0x1", "--readers", "2", "--rounds", "3"])
        .arg(urls.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Total lookups: 48"))
        .stdout(predicate::str::contains("Misses: 0"));
}

#[test]
fn test_invalid_port_mask_fails() {
    let urls = corpus("/a\n");
    let config = small_config();
    ndnfib()
        .arg("--config")
        .arg(config.path())
        .args(["build", "--portmask", "0"])
        .arg(urls.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("port mask"));
}

#[test]
fn test_missing_corpus_fails() {
    ndnfib()
        .args(["count", "/nonexistent/urls.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}
