//! Performance metrics and statistics tracking for the scoring service.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for the scoring pipeline
pub struct PipelineMetrics {
    /// Total submissions scored
    pub submissions_scored: AtomicU64,
    /// Submissions the model labelled fraudulent
    pub fraud_flagged: AtomicU64,
    /// Submissions that produced an assembly warning
    pub warnings_emitted: AtomicU64,
    /// End-to-end scoring times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Fraud-probability distribution buckets
    score_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PipelineMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            submissions_scored: AtomicU64::new(0),
            fraud_flagged: AtomicU64::new(0),
            warnings_emitted: AtomicU64::new(0),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record one scored submission
    pub fn record_prediction(&self, processing_time: Duration, probability: f64, label: u8) {
        self.submissions_scored.fetch_add(1, Ordering::Relaxed);
        if label == 1 {
            self.fraud_flagged.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the most recent window for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (probability * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record an assembly warning surfaced to the user
    pub fn record_warning(&self) {
        self.warnings_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get scoring time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = self.processing_times.read().unwrap();
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (submissions per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.submissions_scored.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get probability distribution
    pub fn get_score_distribution(&self) -> [u64; 10] {
        *self.score_buckets.read().unwrap()
    }

    /// Point-in-time snapshot for the metrics endpoint
    pub fn snapshot(&self) -> MetricsSnapshot {
        let processing = self.get_processing_stats();
        MetricsSnapshot {
            submissions_scored: self.submissions_scored.load(Ordering::Relaxed),
            fraud_flagged: self.fraud_flagged.load(Ordering::Relaxed),
            warnings_emitted: self.warnings_emitted.load(Ordering::Relaxed),
            throughput_per_sec: self.get_throughput(),
            processing: processing.into(),
            score_distribution: self.get_score_distribution(),
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let scored = self.submissions_scored.load(Ordering::Relaxed);
        let flagged = self.fraud_flagged.load(Ordering::Relaxed);
        let fraud_rate = if scored > 0 {
            (flagged as f64 / scored as f64) * 100.0
        } else {
            0.0
        };

        let processing = self.get_processing_stats();
        let score_dist = self.get_score_distribution();

        info!(
            submissions_scored = scored,
            fraud_flagged = flagged,
            fraud_rate = format!("{:.1}%", fraud_rate),
            "Scoring summary"
        );
        info!(
            mean_us = processing.mean_us,
            p50_us = processing.p50_us,
            p95_us = processing.p95_us,
            p99_us = processing.p99_us,
            "Scoring time (μs)"
        );

        let total: u64 = score_dist.iter().sum();
        if total > 0 {
            for (i, &count) in score_dist.iter().enumerate() {
                let pct = (count as f64 / total as f64) * 100.0;
                info!(
                    "  {:.1}-{:.1}: {:>6} ({:>5.1}%)",
                    i as f64 / 10.0,
                    (i + 1) as f64 / 10.0,
                    count,
                    pct
                );
            }
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoring time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Serializable form of [`ProcessingStats`]
#[derive(Debug, Default, Serialize)]
pub struct ProcessingStatsSnapshot {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

impl From<ProcessingStats> for ProcessingStatsSnapshot {
    fn from(stats: ProcessingStats) -> Self {
        Self {
            count: stats.count,
            mean_us: stats.mean_us,
            p50_us: stats.p50_us,
            p95_us: stats.p95_us,
            p99_us: stats.p99_us,
            max_us: stats.max_us,
        }
    }
}

/// JSON snapshot returned by the metrics endpoint
#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub submissions_scored: u64,
    pub fraud_flagged: u64,
    pub warnings_emitted: u64,
    pub throughput_per_sec: f64,
    pub processing: ProcessingStatsSnapshot,
    pub score_distribution: [u64; 10],
}

/// Periodic reporter that prints metric summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<PipelineMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<PipelineMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = PipelineMetrics::new();

        metrics.record_prediction(Duration::from_micros(100), 0.2, 0);
        metrics.record_prediction(Duration::from_micros(200), 0.9, 1);
        metrics.record_warning();

        assert_eq!(metrics.submissions_scored.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.fraud_flagged.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.warnings_emitted.load(Ordering::Relaxed), 1);

        let dist = metrics.get_score_distribution();
        assert_eq!(dist[2], 1);
        assert_eq!(dist[9], 1);
    }

    #[test]
    fn test_snapshot_shape() {
        let metrics = PipelineMetrics::new();
        metrics.record_prediction(Duration::from_micros(150), 0.4, 0);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.submissions_scored, 1);
        assert_eq!(snapshot.fraud_flagged, 0);
        assert_eq!(snapshot.processing.count, 1);

        // Snapshot is serializable for the endpoint
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("submissions_scored"));
    }
}
