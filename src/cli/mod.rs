//! Crop yield CLI Module
//!
//! Command-line interface for serving, training, one-off predictions and dataset inspection.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::dataset::{load_dataset, TrainingDataset};
use crate::inference::{predict, validate_input};
use crate::server::ServerConfig;
use crate::training::{train_model, TrainedModel};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let total_pad = W.saturating_sub(strip_ansi(content).chars().count());
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "cropyield")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Crop yield prediction from historical sown area, price and region data")]
#[command(long_about = None)]
pub struct Cli {
    /// Training dataset (CSV with localized headers)
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,

    /// Random seed for the forest
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Number of trees in the forest
    #[arg(long, global = true)]
    pub trees: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train on the dataset and serve predictions over HTTP (default)
    Serve {
        /// Server port
        #[arg(short, long)]
        port: Option<u16>,

        /// Server host
        #[arg(long)]
        host: Option<String>,
    },

    /// Train once and report the fitted model
    Train,

    /// Predict the yield for a single input
    Predict {
        #[arg(long)]
        crop: String,

        #[arg(long)]
        region: String,

        #[arg(long, allow_hyphen_values = true)]
        year: i64,

        /// Sown area in thousand hectares
        #[arg(long, allow_hyphen_values = true)]
        sown_area: f64,

        /// Average price in yuan per ton
        #[arg(long, allow_hyphen_values = true)]
        price: f64,
    },

    /// Show dataset information
    Info,
}

impl Cli {
    /// Environment defaults overlaid with the command-line flags
    pub fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::default();
        if let Some(path) = &self.dataset {
            config.dataset_path = path.clone();
        }
        if let Some(seed) = self.seed {
            config.model.random_state = seed;
        }
        if let Some(trees) = self.trees {
            config.model.n_estimators = trees;
        }
        if let Some(Commands::Serve { port, host }) = &self.command {
            if let Some(port) = port {
                config.port = *port;
            }
            if let Some(host) = host {
                config.host = host.clone();
            }
        }
        config
    }
}

/// Dispatch the parsed command line
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.server_config();

    match cli.command {
        None | Some(Commands::Serve { .. }) => cmd_serve(config).await,
        Some(Commands::Train) => cmd_train(&config),
        Some(Commands::Predict { crop, region, year, sown_area, price }) => {
            let payload = serde_json::json!({
                "crop": crop,
                "region": region,
                "year": year,
                "sown_area_kha": sown_area,
                "avg_price_yuan_per_ton": price,
            });
            cmd_predict(&config, &payload)
        }
        Some(Commands::Info) => cmd_info(&config),
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

fn load_and_train(config: &ServerConfig) -> anyhow::Result<(TrainingDataset, TrainedModel)> {
    step_run("Loading dataset");
    let start = Instant::now();
    let dataset = load_dataset(&config.dataset_path)?;
    step_done(&format!(
        "{} rows kept, {} dropped in {:?}",
        dataset.len(),
        dataset.rows_dropped(),
        start.elapsed()
    ));

    step_run(&format!("Training {} trees", config.model.n_estimators.to_string().cyan()));
    let model = train_model(&dataset, &config.model)?;
    step_done(&format!("{:?}", model.fit_duration()));

    Ok((dataset, model))
}

pub fn cmd_train(config: &ServerConfig) -> anyhow::Result<()> {
    section("Train");

    let (dataset, model) = load_and_train(config)?;
    let summary = dataset.summary()?;

    println!();
    println!("  {:<16} {}", muted("Dataset"), summary.source);
    println!("  {:<16} {}", muted("Rows"), summary.rows.to_string().white().bold());
    println!("  {:<16} {}", muted("Crops"), summary.crops.len());
    println!("  {:<16} {}", muted("Regions"), summary.regions.len());
    println!("  {:<16} {}", muted("Trees"), model.n_trees());
    println!("  {:<16} {}", muted("Features"), model.feature_names().len());
    println!("  {:<16} {}", muted("Seed"), config.model.random_state);
    println!("  {:<16} {}", muted("Time"), format!("{:.3}s", model.fit_duration().as_secs_f64()).white());

    section("Top features");
    for (name, importance) in model.top_features(10) {
        let bar = "█".repeat((importance * 40.0).round() as usize);
        println!("  {:<28} {:>7.4} {}", name, importance, accent(&bar));
    }
    println!();

    Ok(())
}

pub fn cmd_predict(config: &ServerConfig, payload: &serde_json::Value) -> anyhow::Result<()> {
    let request = validate_input(payload)?;

    let dataset = load_dataset(&config.dataset_path)?;
    let model = train_model(&dataset, &config.model)?;
    let result = predict(&model, &request)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub fn cmd_info(config: &ServerConfig) -> anyhow::Result<()> {
    section("Dataset Info");

    let dataset = load_dataset(&config.dataset_path)?;
    let summary = dataset.summary()?;

    println!("  {:<12} {}", muted("File"), summary.source);
    println!("  {:<12} {}", muted("Rows"), summary.rows);
    println!("  {:<12} {}", muted("Dropped"), summary.rows_dropped);
    println!("  {:<12} {}", muted("Columns"), summary.columns.join(", "));
    if let (Some(min), Some(max)) = (summary.year_min, summary.year_max) {
        println!("  {:<12} {} - {}", muted("Years"), min, max);
    }
    println!("  {:<12} {}", muted("Crops"), summary.crops.join(", "));
    println!("  {:<12} {}", muted("Regions"), summary.regions.join(", "));

    println!();
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(config: ServerConfig) -> anyhow::Result<()> {
    use crate::server::run_server;

    let base = format!("http://{}:{}", config.host, config.port);

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Crop Yield".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Predict", &format!("{}/predict", base)));
    line_box(&kv("Preview", &format!("{}/model/preview", base)));
    line_box(&kv("Health ", &format!("{}/health", base)));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    run_server(config).await
}
