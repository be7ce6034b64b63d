//! Output helpers shared by the `ndnfib` subcommands

use log::info;
use std::time::{Duration, Instant};

const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

/// Render a byte count with a binary unit
pub fn human_bytes(bytes: usize) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

/// Render log usage as "used of capacity (percent)"
pub fn log_usage(used: usize, capacity: usize) -> String {
    let percent = if capacity == 0 {
        0.0
    } else {
        used as f64 * 100.0 / capacity as f64
    };
    format!("{} of {} ({:.2}%)", human_bytes(used), human_bytes(capacity), percent)
}

/// Render a build or benchmark time
pub fn human_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1_000 {
        format!("{} ms", millis)
    } else if millis < 60_000 {
        format!("{:.2} s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

/// Run `f`, logging how long the named step took
pub fn timed<T, E>(step: &str, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    let start = Instant::now();
    let result = f();
    let outcome = if result.is_ok() { "done" } else { "failed" };
    info!("{} {} in {}", step, outcome, human_duration(start.elapsed()));
    result
}

/// Print a section title underlined to its width
pub fn section(title: &str) {
    println!("\n{}\n{}", title, "-".repeat(title.len()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(19), "19 B");
        assert_eq!(human_bytes(1536), "1.50 KiB");
        assert_eq!(human_bytes(256 * 1024 * 1024), "256.00 MiB");
        assert_eq!(human_bytes(3 << 40), "3072.00 GiB");
    }

    #[test]
    fn test_log_usage() {
        assert_eq!(log_usage(512, 2048), "512 B of 2.00 KiB (25.00%)");
        assert_eq!(log_usage(0, 0), "0 B of 0 B (0.00%)");
    }

    #[test]
    fn test_human_duration() {
        assert_eq!(human_duration(Duration::from_millis(42)), "42 ms");
        assert_eq!(human_duration(Duration::from_millis(1_250)), "1.25 s");
        assert_eq!(human_duration(Duration::from_secs(125)), "2m 05s");
    }

    #[test]
    fn test_timed_passes_the_result_through() {
        assert_eq!(timed("step", || Ok::<_, ()>(7)), Ok(7));
        assert_eq!(timed("step", || Err::<u8, _>("no")), Err("no"));
    }
}
