// Save pipeline metrics
//
// Lock-free counters updated by the orchestrator and logged on shutdown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Process-lifetime counters.
///
/// Uses atomic operations so parallel saves can record without locks.
#[derive(Debug)]
pub struct Metrics {
    /// Saves that reached the download sink successfully
    pub saves_succeeded: AtomicU64,

    /// Saves that returned an error (including empty content)
    pub saves_failed: AtomicU64,

    /// Saves whose format came from the classifier
    pub auto_detections: AtomicU64,

    /// Retries of transient collaborator failures
    pub collaborator_retries: AtomicU64,

    /// PDF renders that failed and were saved as plain text
    pub encode_fallbacks: AtomicU64,

    pub bytes_written: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            saves_succeeded: AtomicU64::new(0),
            saves_failed: AtomicU64::new(0),
            auto_detections: AtomicU64::new(0),
            collaborator_retries: AtomicU64::new(0),
            encode_fallbacks: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a successful save of `bytes` bytes
    pub fn record_save(&self, bytes: usize, auto_detected: bool) {
        self.saves_succeeded.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
        if auto_detected {
            self.auto_detections.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_save_failed(&self) {
        self.saves_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.collaborator_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_encode_fallback(&self) {
        self.encode_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average bytes per successful save
    pub fn avg_file_size(&self) -> f64 {
        let bytes = self.bytes_written.load(Ordering::Relaxed);
        let count = self.saves_succeeded.load(Ordering::Relaxed);
        if count > 0 {
            bytes as f64 / count as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Save Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Saves: {} succeeded, {} failed, {} auto-detected",
            self.saves_succeeded.load(Ordering::Relaxed),
            self.saves_failed.load(Ordering::Relaxed),
            self.auto_detections.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Bytes written: {} (avg: {:.1} per file)",
            self.bytes_written.load(Ordering::Relaxed),
            self.avg_file_size()
        );
        tracing::info!(
            "Collaborator retries: {}, encode fallbacks: {}",
            self.collaborator_retries.load(Ordering::Relaxed),
            self.encode_fallbacks.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
