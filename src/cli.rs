use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::adapters::{FeedClient, WingoFeedClient};
use crate::config::AppConfig;
use crate::domain::{DrawRecord, Prediction};
use crate::history::HistoryBuffer;
use crate::persistence::FileStore;
use crate::strategy::TrendScorer;

#[derive(Parser)]
#[command(name = "wingo")]
#[command(author = "Wingo Team")]
#[command(version)]
#[command(about = "WinGo draw tracker with Big/Small trend signals", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory (default.toml, <WINGO_ENV>.toml)
    #[arg(short, long, default_value = "config", env = "WINGO_CONFIG_DIR")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the feed and serve the dashboard API (default)
    Run,
    /// Fetch the newest draws once and print them
    Fetch {
        /// Number of draws to request
        #[arg(short, long)]
        limit: Option<usize>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Score the saved history and print the next prediction
    Predict {
        #[arg(long)]
        json: bool,
    },
    /// Print the saved history, newest first
    History {
        #[arg(short, long, default_value = "20")]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Tabled, Serialize)]
struct DrawRow {
    #[tabled(rename = "Issue")]
    issue: String,
    #[tabled(rename = "Number")]
    number: u8,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Color")]
    color: String,
}

impl DrawRow {
    fn from_record(record: &DrawRecord, scorer: &TrendScorer) -> Self {
        Self {
            issue: record.issue.to_string(),
            number: record.number,
            size: scorer.classify(record.number).to_string(),
            color: record.color.clone(),
        }
    }
}

fn print_draws(records: &[DrawRecord], scorer: &TrendScorer, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("(no draws)");
        return Ok(());
    }
    let rows: Vec<DrawRow> = records
        .iter()
        .map(|r| DrawRow::from_record(r, scorer))
        .collect();
    println!("{}", Table::new(rows));
    Ok(())
}

fn print_prediction(prediction: &Prediction) {
    println!("Period: {}", prediction.period);
    println!("Signal: {}", prediction.signal);
    if prediction.hints.is_empty() {
        println!("Hints:  (none fired, default signal)");
    } else {
        println!("Hints:");
        for line in prediction.rationale() {
            println!("  - {}", line);
        }
    }
}

/// Refuse to run a command against an invalid configuration
pub fn ensure_valid(config: &AppConfig) -> anyhow::Result<()> {
    config
        .validate()
        .map_err(|errors| anyhow::anyhow!("invalid configuration: {}", errors.join("; ")))
}

fn load_history(config: &AppConfig) -> HistoryBuffer {
    let store = FileStore::new(&config.history.path);
    HistoryBuffer::restore(&store, config.history.capacity)
}

/// One-shot fetch from the live feed
pub async fn fetch_draws(config: &AppConfig, limit: Option<usize>, json: bool) -> anyhow::Result<()> {
    ensure_valid(config)?;
    let client = WingoFeedClient::new(&config.feed).context("failed to create feed client")?;
    let batch = client
        .fetch_latest(limit.unwrap_or(config.feed.fetch_limit))
        .await
        .with_context(|| format!("failed to fetch draws from {}", client.url()))?;

    let scorer = TrendScorer::new(config.scoring.clone());
    print_draws(&batch.records, &scorer, json)?;
    if batch.rejected > 0 && !json {
        println!("({} malformed entries skipped)", batch.rejected);
    }
    Ok(())
}

/// Prediction for the period after the newest saved draw
pub fn predict_from_history(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    ensure_valid(config)?;
    let history = load_history(config);
    let scorer = TrendScorer::new(config.scoring.clone());
    let window = history.snapshot(scorer.config().window);

    match scorer.predict(&window) {
        Some(prediction) if json => println!("{}", serde_json::to_string_pretty(&prediction)?),
        Some(prediction) => print_prediction(&prediction),
        None if json => println!("null"),
        None => println!(
            "No saved history at {}; run `wingo run` first",
            config.history.path.display()
        ),
    }
    Ok(())
}

pub fn show_history(config: &AppConfig, limit: usize, json: bool) -> anyhow::Result<()> {
    ensure_valid(config)?;
    let history = load_history(config);
    let scorer = TrendScorer::new(config.scoring.clone());
    print_draws(&history.snapshot(limit), &scorer, json)
}

pub fn show_config(config: &AppConfig) -> anyhow::Result<()> {
    let rendered = toml::to_string_pretty(config).context("failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}
