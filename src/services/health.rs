//! Liveness and readiness tracking for the poller and its store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::RwLock;

/// Health status for a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Component health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_check: Option<DateTime<Utc>>,
}

/// Overall system health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
}

/// Shared health state, written by the poller
pub struct HealthState {
    pub started_at: DateTime<Utc>,
    /// Last poll reached the feed
    pub feed_reachable: AtomicBool,
    pub consecutive_fetch_failures: AtomicU32,
    pub last_fetch: RwLock<Option<DateTime<Utc>>>,
    /// Last history write succeeded
    pub persist_ok: AtomicBool,
    /// Seconds without a successful fetch before the feed counts as stale
    pub staleness_threshold: u64,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            feed_reachable: AtomicBool::new(false),
            consecutive_fetch_failures: AtomicU32::new(0),
            last_fetch: RwLock::new(None),
            persist_ok: AtomicBool::new(true),
            staleness_threshold: 30,
        }
    }

    pub fn with_staleness_threshold(mut self, secs: u64) -> Self {
        self.staleness_threshold = secs;
        self
    }

    /// Record the result of one fetch attempt
    pub async fn record_fetch(&self, success: bool) {
        if success {
            *self.last_fetch.write().await = Some(Utc::now());
            self.consecutive_fetch_failures.store(0, Ordering::SeqCst);
        } else {
            self.consecutive_fetch_failures.fetch_add(1, Ordering::SeqCst);
        }
        self.feed_reachable.store(success, Ordering::SeqCst);
    }

    pub fn set_persist_ok(&self, ok: bool) {
        self.persist_ok.store(ok, Ordering::SeqCst);
    }

    /// Check if the last successful fetch is too old
    pub async fn is_feed_stale(&self) -> bool {
        match *self.last_fetch.read().await {
            Some(last) => {
                (Utc::now() - last).num_seconds().max(0) as u64 > self.staleness_threshold
            }
            None => true,
        }
    }

    /// Get overall health status
    pub async fn get_health(&self) -> HealthResponse {
        let mut components = Vec::new();

        let reachable = self.feed_reachable.load(Ordering::SeqCst);
        let stale = self.is_feed_stale().await;
        let failures = self.consecutive_fetch_failures.load(Ordering::SeqCst);
        let feed_status = match (reachable, stale) {
            (true, false) => HealthStatus::Healthy,
            (_, false) => HealthStatus::Degraded,
            (_, true) => HealthStatus::Unhealthy,
        };
        components.push(ComponentHealth {
            name: "feed".to_string(),
            status: feed_status,
            message: if stale {
                Some("No recent successful fetch".to_string())
            } else if failures > 0 {
                Some(format!("{} consecutive fetch failures", failures))
            } else {
                None
            },
            last_check: *self.last_fetch.read().await,
        });

        // History keeps serving from memory when writes fail
        let persist_ok = self.persist_ok.load(Ordering::SeqCst);
        let store_status = if persist_ok {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };
        components.push(ComponentHealth {
            name: "history_store".to_string(),
            status: store_status,
            message: if persist_ok {
                None
            } else {
                Some("Last history write failed".to_string())
            },
            last_check: None,
        });

        let status = components
            .iter()
            .map(|c| c.status)
            .fold(HealthStatus::Healthy, |acc, s| match (acc, s) {
                (HealthStatus::Unhealthy, _) | (_, HealthStatus::Unhealthy) => {
                    HealthStatus::Unhealthy
                }
                (HealthStatus::Degraded, _) | (_, HealthStatus::Degraded) => {
                    HealthStatus::Degraded
                }
                _ => HealthStatus::Healthy,
            });

        HealthResponse {
            status,
            timestamp: Utc::now(),
            uptime_seconds: (Utc::now() - self.started_at).num_seconds().max(0) as u64,
            components,
        }
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unhealthy_before_first_fetch() {
        let state = HealthState::new();
        assert!(state.is_feed_stale().await);
        assert_eq!(state.get_health().await.status, HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades() {
        let state = HealthState::new();
        state.record_fetch(true).await;
        assert_eq!(state.get_health().await.status, HealthStatus::Healthy);

        state.record_fetch(false).await;
        let health = state.get_health().await;
        assert_eq!(health.status, HealthStatus::Degraded);
        assert_eq!(
            health.components[0].message.as_deref(),
            Some("1 consecutive fetch failures")
        );
    }

    #[tokio::test]
    async fn test_persist_failure_degrades() {
        let state = HealthState::new();
        state.record_fetch(true).await;
        state.set_persist_ok(false);
        assert_eq!(state.get_health().await.status, HealthStatus::Degraded);
    }

    #[tokio::test]
    async fn test_clock_step_back_is_not_stale() {
        let state = HealthState::new();
        state.record_fetch(true).await;
        *state.last_fetch.write().await = Some(Utc::now() + chrono::Duration::minutes(10));
        assert!(!state.is_feed_stale().await);
    }
}
