pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod history;
pub mod logging;
pub mod persistence;
pub mod services;
pub mod strategy;

pub use adapters::{FeedBatch, FeedClient, WingoFeedClient};
pub use config::AppConfig;
pub use domain::{DrawRecord, IssueId, Outcome, Prediction, Size, Validation};
pub use error::{RecordError, Result, WingoError};
pub use history::HistoryBuffer;
pub use persistence::{ByteStore, FileStore, MemoryStore};
pub use services::{DrawPoller, HealthState, HttpServer, Metrics};
pub use strategy::{validate, TrendScorer};
