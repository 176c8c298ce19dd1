//! Poller and HTTP surface wired together with a scripted feed.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use wingo::domain::TrackerPhase;
use wingo::services::{router, AppState};
use wingo::{
    AppConfig, DrawPoller, DrawRecord, FeedBatch, FeedClient, HealthState, MemoryStore, Metrics,
    Outcome, Result, Size, WingoError,
};

/// Feed that replays prepared pages, then fails
struct ScriptedFeed {
    pages: Mutex<VecDeque<Result<FeedBatch>>>,
}

impl ScriptedFeed {
    fn new(pages: Vec<Result<FeedBatch>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
        }
    }
}

#[async_trait]
impl FeedClient for ScriptedFeed {
    async fn fetch_latest(&self, limit: usize) -> Result<FeedBatch> {
        let next = self.pages.lock().unwrap().pop_front();
        match next {
            Some(Ok(mut batch)) => {
                batch.records.truncate(limit);
                Ok(batch)
            }
            Some(Err(e)) => Err(e),
            None => Err(WingoError::Fetch("script exhausted".to_string())),
        }
    }
}

fn page(draws: &[(u64, u8, &str)]) -> Result<FeedBatch> {
    Ok(FeedBatch {
        records: draws
            .iter()
            .map(|(i, n, c)| DrawRecord::new(format!("202401011000{:05}", i), *n, *c))
            .collect(),
        rejected: 0,
    })
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
}

#[tokio::test]
async fn poll_validate_and_serve() {
    let feed = Arc::new(ScriptedFeed::new(vec![
        page(&[(3, 2, "red"), (2, 2, "red"), (1, 2, "red")]),
        Err(WingoError::Fetch("status 502".to_string())),
        page(&[(4, 1, "green"), (3, 2, "red"), (2, 2, "red")]),
    ]));
    let store = Arc::new(MemoryStore::new());
    let metrics = Arc::new(Metrics::new());
    let health = Arc::new(HealthState::new());

    let mut poller = DrawPoller::new(
        &AppConfig::default(),
        feed,
        store.clone(),
        metrics.clone(),
        health.clone(),
    );
    let app = router(AppState {
        snapshot: poller.subscribe(),
        health,
        metrics: metrics.clone(),
    });

    // First page: prediction for period 4. Odd issue 3 and flat numbers -> Small
    let report = poller.poll_once().await.unwrap();
    assert_eq!(report.inserted, 3);
    assert!(report.new_draw);
    let (status, state) = get_json(&app, "/api/state").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["prediction"]["period"], "20240101100000004");
    assert_eq!(state["prediction"]["signal"], "Small");
    assert_eq!(state["phase"], "Predicted");

    // Feed outage keeps the snapshot
    assert!(poller.poll_once().await.is_err());
    let (_, after_outage) = get_json(&app, "/api/state").await;
    assert_eq!(after_outage["prediction"], state["prediction"]);

    // Draw 4 resolves the prediction: number 1 is Small -> win
    let report = poller.poll_once().await.unwrap();
    assert_eq!(report.inserted, 1);
    let validation = report.validation.unwrap();
    assert_eq!(validation.outcome, Outcome::Win);
    assert_eq!(validation.signal, Size::Small);
    assert_eq!(poller.state().phase, TrackerPhase::Validated);

    let (_, state) = get_json(&app, "/api/state").await;
    assert_eq!(state["validation"]["outcome"], "Win");
    assert_eq!(state["validation"]["winning_number"], 1);
    assert_eq!(state["scoreboard"]["wins"], 1);
    assert_eq!(state["recent_history"].as_array().unwrap().len(), 4);
    assert_eq!(state["type_trend"][0], "Small");
    assert_eq!(state["color_trend"][0], "green");

    let (_, history) = get_json(&app, "/api/history?limit=2").await;
    assert_eq!(history.as_array().unwrap().len(), 2);
    assert_eq!(history[0]["issueNumber"], "20240101100000004");

    // History was written for both pages that added draws
    let saved: serde_json::Value = serde_json::from_slice(&store.contents().unwrap()).unwrap();
    assert_eq!(saved.as_array().unwrap().len(), 4);

    let text = metrics.prometheus();
    assert!(text.contains("wingo_polls_total 3"));
    assert!(text.contains("wingo_fetch_failures_total 1"));
    assert!(text.contains("wingo_wins_total 1"));
}

#[tokio::test]
async fn restart_resumes_from_saved_history() {
    let store = Arc::new(MemoryStore::new());
    let config = AppConfig::default();

    let mut first = DrawPoller::new(
        &config,
        Arc::new(ScriptedFeed::new(vec![page(&[(8, 9, "green"), (7, 0, "red")])])),
        store.clone(),
        Arc::new(Metrics::new()),
        Arc::new(HealthState::new()),
    );
    first.poll_once().await.unwrap();
    let before = first.state().prediction.clone();

    let second = DrawPoller::new(
        &config,
        Arc::new(ScriptedFeed::new(Vec::new())),
        store,
        Arc::new(Metrics::new()),
        Arc::new(HealthState::new()),
    );
    assert_eq!(second.state().history.len(), 2);
    assert_eq!(second.state().prediction, before);
    assert_eq!(second.snapshot().recent_history.len(), 2);
}

#[tokio::test]
async fn run_stops_on_shutdown() {
    let mut config = AppConfig::default();
    config.poller.interval_ms = 10;
    config.poller.backoff_ms = 10;

    let poller = DrawPoller::new(
        &config,
        Arc::new(ScriptedFeed::new(vec![page(&[(1, 5, "green")])])),
        Arc::new(MemoryStore::new()),
        Arc::new(Metrics::new()),
        Arc::new(HealthState::new()),
    );
    let mut snapshots = poller.subscribe();
    let (tx, rx) = tokio::sync::watch::channel(false);
    let task = tokio::spawn(poller.run(rx));

    snapshots.changed().await.unwrap();
    assert_eq!(snapshots.borrow().recent_history.len(), 1);

    tx.send(true).unwrap();
    tokio::time::timeout(std::time::Duration::from_secs(2), task)
        .await
        .expect("poller did not stop")
        .unwrap();
}
