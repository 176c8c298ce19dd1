pub mod health;
pub mod metrics;
pub mod poller;
pub mod server;

pub use health::{ComponentHealth, HealthResponse, HealthState, HealthStatus};
pub use metrics::Metrics;
pub use poller::{CycleReport, DrawPoller, HistoryState};
pub use server::{router, AppState, HttpServer};
