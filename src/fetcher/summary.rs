//! Completion accounting for a run

use std::time::Duration;

/// What a run got through
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Records persisted
    pub processed: u64,
    /// Iterations finished
    pub iterations_completed: u32,
    /// Wall-clock time since the run started
    pub elapsed: Duration,
}

impl RunSummary {
    /// Mean wall-clock time per persisted record, or `None` if nothing was persisted
    pub fn mean_per_record(&self) -> Option<Duration> {
        if self.processed == 0 {
            return None;
        }
        Some(Duration::from_secs_f64(
            self.elapsed.as_secs_f64() / self.processed as f64,
        ))
    }

    /// Human-readable completion line
    pub fn message(&self) -> String {
        let total = self.elapsed.as_secs_f64();
        match self.mean_per_record() {
            Some(mean) => format!(
                "Process completed: {} images processed in {:.2}s (Average: {:.2}s per image)",
                self.processed,
                total,
                mean.as_secs_f64()
            ),
            None => format!(
                "Process completed: No images were processed in {total:.2}s. \
                 Check previous errors for details."
            ),
        }
    }

    /// Log the completion line (warning level when nothing was persisted)
    pub fn log(&self) {
        let message = self.message();
        if self.processed > 0 {
            tracing::info!(
                processed = self.processed,
                iterations = self.iterations_completed,
                "{message}"
            );
        } else {
            tracing::warn!(iterations = self.iterations_completed, "{message}");
        }
    }
}
