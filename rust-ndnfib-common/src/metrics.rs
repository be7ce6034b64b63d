//! Metrics collection and reporting for the FIB build.
//!
//! Counters are atomic so that a frozen table and its readers can share a
//! metrics block without locking.

use std::sync::atomic::{AtomicU64, Ordering};

/* ---------------------------------------------------------------- *
 * Simple Counter
 * ---------------------------------------------------------------- */

#[derive(Debug)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Counter {
    fn clone(&self) -> Self {
        let c = Counter::new();
        c.value.store(self.value.load(Ordering::Relaxed), Ordering::Relaxed);
        c
    }
}

/* ---------------------------------------------------------------- *
 * Gauge
 * ---------------------------------------------------------------- */

#[derive(Debug)]
pub struct Gauge {
    value: AtomicU64,
}

impl Gauge {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Default for Gauge {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Gauge {
    fn clone(&self) -> Self {
        let g = Gauge::new();
        g.value.store(self.value.load(Ordering::Relaxed), Ordering::Relaxed);
        g
    }
}

/* ---------------------------------------------------------------- *
 * Histogram
 * ---------------------------------------------------------------- */

/// Bucketed value histogram. A value lands in the first bucket whose
/// boundary is at least the value; values past the last boundary are
/// refused.
#[derive(Debug)]
pub struct Histogram {
    buckets: Vec<AtomicU64>,
    boundaries: Vec<u64>,
}

impl Histogram {
    pub fn new(boundaries: Vec<u64>) -> Self {
        assert!(!boundaries.is_empty(), "histogram needs at least one boundary");
        let buckets = (0..boundaries.len())
            .map(|_| AtomicU64::new(0))
            .collect();

        Self { buckets, boundaries }
    }

    /// One bucket per integer in `0..=max`.
    pub fn exact(max: u64) -> Self {
        Self::new((0..=max).collect())
    }

    /// Records `value`. Returns false, recording nothing, when it is past
    /// the last boundary.
    pub fn observe(&self, value: u64) -> bool {
        let idx = self.boundaries.partition_point(|&b| b < value);
        match self.buckets.get(idx) {
            Some(bucket) => {
                bucket.fetch_add(1, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// `(boundary, count)` pairs in boundary order.
    pub fn counts(&self) -> Vec<(u64, u64)> {
        self.boundaries
            .iter()
            .zip(self.buckets.iter())
            .map(|(&b, bucket)| (b, bucket.load(Ordering::Relaxed)))
            .collect()
    }
}

impl Clone for Histogram {
    fn clone(&self) -> Self {
        Self {
            buckets: self
                .buckets
                .iter()
                .map(|b| AtomicU64::new(b.load(Ordering::Relaxed)))
                .collect(),
            boundaries: self.boundaries.clone(),
        }
    }
}

/* ---------------------------------------------------------------- *
 * Aggregate metrics for the FIB
 * ---------------------------------------------------------------- */

#[derive(Debug, Default, Clone)]
pub struct FibMetrics {
    // Driver metrics
    pub urls_read: Counter,
    pub prefixes_offered: Counter,

    // Table metrics
    pub records_inserted: Counter,
    pub duplicates: Counter,
    /// Interior records promoted to terminal
    pub upgrades: Counter,
    pub insert_failures: Counter,
    pub log_bytes: Gauge,

    // Read path
    pub lookup_hits: Counter,
    pub lookup_misses: Counter,
}

impl FibMetrics {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_and_gauge() {
        let c = Counter::new();
        c.increment();
        c.add(4);
        assert_eq!(c.value(), 5);
        assert_eq!(c.clone().value(), 5);

        let g = Gauge::new();
        g.set(19);
        assert_eq!(g.value(), 19);
    }

    #[test]
    fn test_exact_histogram() {
        let h = Histogram::exact(3);
        for v in [1, 1, 3, 0] {
            assert!(h.observe(v));
        }
        assert!(!h.observe(9));
        assert_eq!(h.counts(), vec![(0, 1), (1, 2), (2, 0), (3, 1)]);
    }

    #[test]
    fn test_boundary_histogram() {
        let h = Histogram::new(vec![10, 100]);
        assert!(h.observe(5));
        assert!(h.observe(10));
        assert!(h.observe(50));
        assert!(!h.observe(500));
        assert_eq!(h.counts(), vec![(10, 2), (100, 1)]);
    }
}
