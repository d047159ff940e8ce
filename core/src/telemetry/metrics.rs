use serde::Serialize;
use std::sync::Mutex;

/// Batch-level tally of group verdicts, shared across workers.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub passed: usize,
    pub flagged: usize,
    pub rejected: usize,
}

impl MetricsSnapshot {
    pub fn total(&self) -> usize {
        self.passed + self.flagged + self.rejected
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    /// Group built and every member passed.
    pub fn record_passed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.passed += 1;
        }
    }

    /// Group built but at least one member carries a failure.
    pub fn record_flagged(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.flagged += 1;
        }
    }

    /// Group construction raised a fatal error.
    pub fn record_rejected(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.rejected += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
