use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Metrics collector for observability
#[derive(Debug, Default)]
pub struct Metrics {
    /// Poll cycles attempted
    pub polls: AtomicU64,
    /// Polls that failed to fetch a usable page
    pub fetch_failures: AtomicU64,
    /// Draws newly retained in the history
    pub records_ingested: AtomicU64,
    /// Feed entries dropped as malformed
    pub records_rejected: AtomicU64,
    /// Predictions issued
    pub predictions: AtomicU64,
    pub wins: AtomicU64,
    pub losses: AtomicU64,
    /// History writes that failed
    pub persist_failures: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_polls(&self) {
        self.polls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fetch_failures(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_ingested(&self, n: usize) {
        self.records_ingested.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn add_rejected(&self, n: usize) {
        self.records_rejected.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn inc_predictions(&self) {
        self.predictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_outcome(&self, win: bool) {
        if win {
            self.wins.fetch_add(1, Ordering::Relaxed);
        } else {
            self.losses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn inc_persist_failures(&self) {
        self.persist_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Current metrics as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "polls={} fetch_failures={} ingested={} rejected={} predictions={} wins={} losses={}",
            self.polls.load(Ordering::Relaxed),
            self.fetch_failures.load(Ordering::Relaxed),
            self.records_ingested.load(Ordering::Relaxed),
            self.records_rejected.load(Ordering::Relaxed),
            self.predictions.load(Ordering::Relaxed),
            self.wins.load(Ordering::Relaxed),
            self.losses.load(Ordering::Relaxed),
        )
    }

    /// Export metrics in Prometheus format
    pub fn prometheus(&self) -> String {
        format!(
            r#"# HELP wingo_polls_total Poll cycles attempted
# TYPE wingo_polls_total counter
wingo_polls_total {}

# HELP wingo_fetch_failures_total Polls that failed to fetch the feed
# TYPE wingo_fetch_failures_total counter
wingo_fetch_failures_total {}

# HELP wingo_records_ingested_total Draws added to the history
# TYPE wingo_records_ingested_total counter
wingo_records_ingested_total {}

# HELP wingo_records_rejected_total Malformed feed entries dropped
# TYPE wingo_records_rejected_total counter
wingo_records_rejected_total {}

# HELP wingo_predictions_total Predictions issued
# TYPE wingo_predictions_total counter
wingo_predictions_total {}

# HELP wingo_wins_total Validated predictions that matched
# TYPE wingo_wins_total counter
wingo_wins_total {}

# HELP wingo_losses_total Validated predictions that missed
# TYPE wingo_losses_total counter
wingo_losses_total {}

# HELP wingo_persist_failures_total Failed history writes
# TYPE wingo_persist_failures_total counter
wingo_persist_failures_total {}
"#,
            self.polls.load(Ordering::Relaxed),
            self.fetch_failures.load(Ordering::Relaxed),
            self.records_ingested.load(Ordering::Relaxed),
            self.records_rejected.load(Ordering::Relaxed),
            self.predictions.load(Ordering::Relaxed),
            self.wins.load(Ordering::Relaxed),
            self.losses.load(Ordering::Relaxed),
            self.persist_failures.load(Ordering::Relaxed),
        )
    }

    /// Log periodic status
    pub fn log_status(&self) {
        info!("{}", self.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prometheus_contains_counters() {
        let metrics = Metrics::new();
        metrics.inc_polls();
        metrics.add_ingested(3);
        metrics.record_outcome(true);
        metrics.record_outcome(false);

        let text = metrics.prometheus();
        assert!(text.contains("wingo_polls_total 1"));
        assert!(text.contains("wingo_records_ingested_total 3"));
        assert!(text.contains("wingo_wins_total 1"));
        assert!(text.contains("wingo_losses_total 1"));
    }
}
