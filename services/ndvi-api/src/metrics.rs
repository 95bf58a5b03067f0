//! Request metrics: Prometheus counters plus an in-process snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde::Serialize;
use tokio::sync::RwLock;

/// Metrics collector for the NDVI API.
#[derive(Debug)]
pub struct MetricsCollector {
    pub point_requests: AtomicU64,
    pub zonal_requests: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
    pub failures: AtomicU64,
    pub empty_results: AtomicU64,

    /// Pipeline timing, in microseconds.
    pipeline_times: RwLock<TimingStats>,

    start_time: Instant,
}

#[derive(Debug, Default)]
struct TimingStats {
    count: u64,
    total_us: u64,
    min_us: u64,
    max_us: u64,
}

impl TimingStats {
    fn record(&mut self, duration_us: u64) {
        self.count += 1;
        self.total_us += duration_us;
        if self.min_us == 0 || duration_us < self.min_us {
            self.min_us = duration_us;
        }
        if duration_us > self.max_us {
            self.max_us = duration_us;
        }
    }

    fn avg_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.total_us as f64 / self.count as f64) / 1000.0
        }
    }
}

/// JSON view served on `/api/metrics`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub point_requests: u64,
    pub zonal_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub failures: u64,
    pub empty_results: u64,
    pub pipeline_runs: u64,
    pub pipeline_avg_ms: f64,
    pub pipeline_min_ms: f64,
    pub pipeline_max_ms: f64,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            point_requests: AtomicU64::new(0),
            zonal_requests: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            empty_results: AtomicU64::new(0),
            pipeline_times: RwLock::new(TimingStats::default()),
            start_time: Instant::now(),
        }
    }

    /// Record an incoming request of the given query kind.
    pub fn record_request(&self, kind: &'static str) {
        match kind {
            "zonal" => self.zonal_requests.fetch_add(1, Ordering::Relaxed),
            _ => self.point_requests.fetch_add(1, Ordering::Relaxed),
        };
        counter!("ndvi_requests_total", "query" => kind).increment(1);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        counter!("ndvi_cache_hits_total").increment(1);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        counter!("ndvi_cache_misses_total").increment(1);
    }

    /// Record a request that ended in an error response.
    pub fn record_failure(&self, kind: &'static str) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        counter!("ndvi_request_errors_total", "kind" => kind).increment(1);
    }

    /// Record a successful run whose window had no usable pixels.
    pub fn record_empty_result(&self) {
        self.empty_results.fetch_add(1, Ordering::Relaxed);
        counter!("ndvi_empty_results_total").increment(1);
    }

    /// Record one pipeline run.
    pub async fn record_pipeline(&self, kind: &'static str, elapsed: Duration) {
        histogram!("ndvi_pipeline_duration_seconds", "query" => kind).record(elapsed.as_secs_f64());
        self.pipeline_times
            .write()
            .await
            .record(elapsed.as_micros() as u64);
    }

    pub async fn snapshot(&self) -> MetricsSnapshot {
        let times = self.pipeline_times.read().await;

        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            point_requests: self.point_requests.load(Ordering::Relaxed),
            zonal_requests: self.zonal_requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            empty_results: self.empty_results.load(Ordering::Relaxed),
            pipeline_runs: times.count,
            pipeline_avg_ms: times.avg_ms(),
            pipeline_min_ms: times.min_us as f64 / 1000.0,
            pipeline_max_ms: times.max_us as f64 / 1000.0,
        }
    }
}
