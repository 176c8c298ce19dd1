use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::adapters::FeedClient;
use crate::config::AppConfig;
use crate::domain::{
    DashboardSnapshot, DrawRecord, IssueId, Prediction, Scoreboard, TrackerPhase, Validation,
};
use crate::error::{Result, WingoError};
use crate::history::HistoryBuffer;
use crate::persistence::ByteStore;
use crate::services::{HealthState, Metrics};
use crate::strategy::TrendScorer;

/// Everything the poller mutates, owned by exactly one task
#[derive(Debug, Clone)]
pub struct HistoryState {
    pub history: HistoryBuffer,
    pub prediction: Option<Prediction>,
    pub validation: Option<Validation>,
    pub scoreboard: Scoreboard,
    pub phase: TrackerPhase,
    /// Newest issue id already acted on
    pub last_seen: Option<IssueId>,
    /// History changed since the last successful write
    pub dirty: bool,
}

impl HistoryState {
    pub fn new(history: HistoryBuffer) -> Self {
        Self {
            history,
            prediction: None,
            validation: None,
            scoreboard: Scoreboard::default(),
            phase: TrackerPhase::NoPrediction,
            last_seen: None,
            dirty: false,
        }
    }
}

/// Outcome of one poll cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub inserted: usize,
    pub rejected: usize,
    /// The newest issue changed and a new prediction was issued
    pub new_draw: bool,
    pub validation: Option<Validation>,
}

/// Polls the feed, maintains the history and publishes dashboard snapshots
pub struct DrawPoller {
    feed: Arc<dyn FeedClient>,
    store: Arc<dyn ByteStore>,
    scorer: TrendScorer,
    state: HistoryState,
    fetch_limit: usize,
    fetch_timeout: Duration,
    interval: Duration,
    backoff: Duration,
    recent_limit: usize,
    metrics: Arc<Metrics>,
    health: Arc<HealthState>,
    publisher: watch::Sender<Arc<DashboardSnapshot>>,
}

impl DrawPoller {
    /// Restore history from the store and issue an initial prediction if possible
    pub fn new(
        config: &AppConfig,
        feed: Arc<dyn FeedClient>,
        store: Arc<dyn ByteStore>,
        metrics: Arc<Metrics>,
        health: Arc<HealthState>,
    ) -> Self {
        let history = HistoryBuffer::restore(store.as_ref(), config.history.capacity);
        let (publisher, _) = watch::channel(Arc::new(DashboardSnapshot::empty()));

        let mut poller = Self {
            feed,
            store,
            scorer: TrendScorer::new(config.scoring.clone()),
            state: HistoryState::new(history),
            fetch_limit: config.feed.fetch_limit,
            fetch_timeout: config.feed.timeout(),
            interval: config.poller.interval(),
            backoff: config.poller.backoff(),
            recent_limit: config.server.recent_limit,
            metrics,
            health,
            publisher,
        };
        poller.bootstrap();
        poller
    }

    fn bootstrap(&mut self) {
        if let Some(newest) = self.state.history.newest().map(|r| r.issue.clone()) {
            self.state.prediction = self.predict();
            if self.state.prediction.is_some() {
                self.state.phase = TrackerPhase::Predicted;
            }
            self.state.last_seen = Some(newest);
        }
        self.publish();
    }

    /// Receiver for dashboard snapshots
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardSnapshot>> {
        self.publisher.subscribe()
    }

    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.publisher.borrow().clone()
    }

    /// Run one fetch → ingest → predict → publish cycle
    pub async fn poll_once(&mut self) -> Result<CycleReport> {
        self.metrics.inc_polls();

        let fetch = self.feed.fetch_latest(self.fetch_limit);
        let fetched = tokio::time::timeout(self.fetch_timeout, fetch)
            .await
            .map_err(|_| {
                WingoError::Fetch(format!("feed timed out after {:?}", self.fetch_timeout))
            })
            .and_then(|r| r);

        let batch = match fetched {
            Ok(batch) => batch,
            Err(e) => {
                self.metrics.inc_fetch_failures();
                self.health.record_fetch(false).await;
                return Err(e);
            }
        };
        self.health.record_fetch(true).await;

        let mut report = CycleReport {
            rejected: batch.rejected,
            ..CycleReport::default()
        };
        self.metrics.add_rejected(batch.rejected);

        report.inserted = self.state.history.ingest(batch.records);
        if report.inserted > 0 {
            self.metrics.add_ingested(report.inserted);
            debug!(inserted = report.inserted, total = self.state.history.len(), "history updated");
            self.state.dirty = true;
        }
        if self.state.dirty {
            self.persist();
        }

        let previous = self.state.last_seen.clone();
        report.validation = self.advance()?;
        report.new_draw = self.state.last_seen != previous;

        self.publish();
        Ok(report)
    }

    /// Validate and re-predict when the newest issue changed
    fn advance(&mut self) -> Result<Option<Validation>> {
        let Some(newest) = self.state.history.newest().cloned() else {
            return Ok(None);
        };
        if self.state.last_seen.as_ref() == Some(&newest.issue) {
            return Ok(None);
        }

        let validation = match (&self.state.prediction, &self.state.last_seen) {
            (Some(prediction), Some(_)) => {
                let resolved = self.resolving_draw(prediction, &newest);
                Some(self.scorer.validate(prediction, &resolved))
            }
            _ => None,
        };

        let next_phase = if validation.is_some() {
            TrackerPhase::Validated
        } else {
            TrackerPhase::Predicted
        };
        self.transition(next_phase)?;

        if let Some(ref v) = validation {
            self.state.scoreboard.record(v.outcome);
            self.metrics.record_outcome(v.outcome.is_win());
            info!(
                period = %v.period,
                signal = %v.signal,
                number = v.winning_number,
                outcome = %v.outcome,
                win_rate = self.state.scoreboard.win_rate(),
                "prediction validated"
            );
            self.state.validation = Some(v.clone());
        }

        self.state.prediction = self.predict();
        if let Some(ref p) = self.state.prediction {
            self.metrics.inc_predictions();
            info!(
                period = %p.period,
                signal = %p.signal,
                hints = ?p.rationale(),
                "new prediction"
            );
        }
        self.state.last_seen = Some(newest.issue);

        Ok(validation)
    }

    /// The draw for the predicted period, or the newest one when the feed skipped it
    fn resolving_draw(&self, prediction: &Prediction, newest: &DrawRecord) -> DrawRecord {
        match self.state.history.get(&prediction.period) {
            Some(record) => record.clone(),
            None => {
                debug!(
                    period = %prediction.period,
                    newest = %newest.issue,
                    "predicted period not in history, validating against newest draw"
                );
                newest.clone()
            }
        }
    }

    fn transition(&mut self, to: TrackerPhase) -> Result<()> {
        let from = self.state.phase;
        if !from.can_transition_to(to) {
            return Err(WingoError::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.state.phase = to;
        Ok(())
    }

    fn predict(&self) -> Option<Prediction> {
        let window = self.state.history.snapshot(self.scorer.config().window);
        self.scorer.predict(&window)
    }

    /// Write the history; a failed write leaves it dirty for the next cycle
    fn persist(&mut self) {
        match self.state.history.persist(self.store.as_ref()) {
            Ok(()) => {
                self.state.dirty = false;
                self.health.set_persist_ok(true);
            }
            Err(e) => {
                self.state.dirty = true;
                self.metrics.inc_persist_failures();
                self.health.set_persist_ok(false);
                warn!(store = %self.store.describe(), error = %e, "failed to persist history");
            }
        }
    }

    fn publish(&self) {
        let recent = self.state.history.snapshot(self.recent_limit);
        let snapshot = DashboardSnapshot {
            prediction: self.state.prediction.clone(),
            validation: self.state.validation.clone(),
            type_trend: recent.iter().map(|r| self.scorer.classify(r.number)).collect(),
            color_trend: recent.iter().map(|r| r.color.clone()).collect(),
            recent_history: recent,
            scoreboard: self.state.scoreboard.clone(),
            phase: self.state.phase,
            updated_at: Utc::now(),
        };
        self.publisher.send_replace(Arc::new(snapshot));
    }

    /// Poll until the shutdown flag flips to `true`
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            history = self.state.history.len(),
            "draw poller started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let delay = match self.poll_once().await {
                Ok(report) => {
                    if report.rejected > 0 {
                        warn!(rejected = report.rejected, "feed page contained malformed entries");
                    }
                    self.interval
                }
                Err(e) if e.is_transient() => {
                    warn!(error = %e, backoff_ms = self.backoff.as_millis() as u64, "poll failed, reusing last snapshot");
                    self.backoff
                }
                Err(e) => {
                    error!(error = %e, "poll cycle error");
                    self.backoff
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        if self.state.dirty {
            self.persist();
        }
        self.metrics.log_status();
        info!("draw poller stopped");
    }
}
