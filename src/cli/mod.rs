//! PumpGuard CLI Module
//!
//! Command-line interface for training, one-off analysis, dataset inspection
//! and serving.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::analysis::Analyzer;
use crate::health::HealthStatus;
use crate::hypothesis::{HypothesisConfig, HypothesisGenerator, HypothesisSource};
use crate::inference::Predictor;
use crate::preprocessing::{load_csv, ColumnMapping, LabelSource};
use crate::sensor::{SensorReading, FEATURE_NAMES};
use crate::session::AnalysisSession;
use crate::training::{Trainer, TrainingConfig};

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
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
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

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
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

fn status_label(status: HealthStatus) -> ColoredString {
    match status {
        HealthStatus::Healthy => status.as_str().truecolor(100, 210, 120).bold(),
        HealthStatus::Warning => status.as_str().truecolor(240, 190, 80).bold(),
        HealthStatus::Critical => status.as_str().truecolor(240, 90, 90).bold(),
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "pumpguard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Predictive maintenance for industrial pumps")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the health classifier from a sensor CSV
    Train {
        /// Sensor CSV with vibration, temperature and current columns
        #[arg(short, long)]
        csv: PathBuf,

        /// Directory the model bundle is written to
        #[arg(short, long, default_value = "model")]
        out: PathBuf,

        /// Number of trees in the forest
        #[arg(long, default_value = "200")]
        trees: usize,

        /// Seed for the split and the forest
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Analyze one reading with a trained bundle
    Predict {
        /// Vibration in mm/s
        #[arg(long)]
        vibration: f64,

        /// Temperature in °C
        #[arg(long)]
        temperature: f64,

        /// Motor current in A
        #[arg(long)]
        current: f64,

        /// Directory holding the model bundle
        #[arg(short, long, default_value = "model", env = "MODEL_DIR")]
        model_dir: PathBuf,
    },

    /// Show how a CSV would be read for training
    Inspect {
        /// Sensor CSV
        #[arg(short, long)]
        csv: PathBuf,
    },

    /// Start the HTTP API
    Serve {
        /// Server host
        #[arg(long, default_value = "0.0.0.0", env = "API_HOST")]
        host: String,

        /// Server port
        #[arg(short, long, default_value = "8080", env = "API_PORT")]
        port: u16,

        /// Directory holding the model bundle
        #[arg(short, long, default_value = "model", env = "MODEL_DIR")]
        model_dir: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(csv: &Path, out: &Path, trees: usize, seed: u64) -> anyhow::Result<()> {
    section("Train");

    let config = TrainingConfig::new()
        .with_n_estimators(trees)
        .with_random_state(seed);
    let trainer = Trainer::new(config);

    step_run(&format!("Training on {}", csv.display().to_string().cyan()));
    let start = Instant::now();
    let outcome = trainer.train_csv(csv, out)?;
    step_done(&format!("{:?}", start.elapsed()));

    let summary = &outcome.summary;
    let mapping = &summary.mapping;

    section("Data");
    println!("  {:<16} {}", muted("Rows"), summary.n_rows);
    println!("  {:<16} {} / {}", muted("Train / test"), summary.n_train, summary.n_test);
    for (name, (column, imputed)) in FEATURE_NAMES
        .iter()
        .zip(mapping.feature_columns().iter().zip(summary.imputed_counts))
    {
        println!(
            "  {:<16} {} {}",
            muted(name),
            column.white(),
            dim(&format!("({} imputed)", imputed))
        );
    }
    match &summary.label_source {
        LabelSource::Column(col) => println!("  {:<16} {}", muted("Labels"), col.white()),
        LabelSource::Synthesized => println!("  {:<16} {}", muted("Labels"), "synthesized from sensor limits".yellow()),
    }
    for (idx, count) in summary.class_counts.iter().enumerate() {
        if let Some(status) = HealthStatus::from_index(idx) {
            println!("  {:<16} {}", muted(status.as_str()), count);
        }
    }

    section("Evaluation");
    for line in outcome.report.to_string().lines() {
        println!("  {}", line);
    }

    section("Feature importance");
    for (name, importance) in &summary.feature_importances {
        println!("  {:<16} {:.4}", muted(name), importance);
    }

    println!();
    step_ok(&format!("Bundle written to {}", out.display()));
    println!("  {:<16} {}", muted("Time"), format!("{:.3}s", summary.training_time_secs).white());
    println!();

    Ok(())
}

pub async fn cmd_predict(reading: SensorReading, model_dir: &Path) -> anyhow::Result<()> {
    section("Analyze");

    step_run(&format!("Loading bundle from {}", model_dir.display()));
    let predictor = Predictor::load(model_dir)?;
    step_done(&format!("{} trees", predictor.bundle().model.n_trees()));

    let hypotheses = HypothesisGenerator::new(&HypothesisConfig::from_env());
    let analyzer = Analyzer::new(Arc::new(predictor), hypotheses);
    let mut session = AnalysisSession::new();
    let outcome = analyzer.analyze(&mut session, reading).await?;

    println!();
    println!("  {:<16} {:.2} mm/s", muted("Vibration"), reading.vibration);
    println!("  {:<16} {:.2} °C", muted("Temperature"), reading.temperature);
    println!("  {:<16} {:.2} A", muted("Current"), reading.current);
    println!();
    println!("  {:<16} {}", muted("Status"), status_label(outcome.prediction.status));
    println!("  {:<16} {}", muted("Risk"), format!("{:.2}%", outcome.prediction.risk * 100.0).white().bold());
    for p in &outcome.prediction.probabilities {
        println!("  {:<16} {:.4}", dim(p.status.as_str()), p.probability);
    }

    let source = match &outcome.hypothesis.source {
        HypothesisSource::Generated => "generated".to_string(),
        HypothesisSource::Fallback(reason) => format!("fallback: {}", reason),
    };
    section(&format!("Hypothesis ({})", source));
    for line in outcome.hypothesis.text.lines() {
        println!("  {}", line);
    }

    section("Maintenance");
    for advice in &outcome.recommendations {
        println!("  {} {}", accent("›"), advice);
    }
    println!();

    Ok(())
}

pub fn cmd_inspect(csv: &Path) -> anyhow::Result<()> {
    section("Inspect");

    let df = load_csv(csv)?;
    let columns: Vec<String> = df.get_column_names().iter().map(|c| c.to_string()).collect();

    println!("  {:<12} {}", muted("File"), csv.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!();

    println!("  {:<20} {:<12} {:>6}", muted("Column"), muted("Type"), muted("Nulls"));
    println!("  {}", dim(&"─".repeat(42)));
    for col in df.get_columns() {
        println!(
            "  {:<20} {:<12} {:>6}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
        );
    }

    section("Detected mapping");
    let mapping: ColumnMapping = ColumnMapping::detect(&columns)?;
    for (name, column) in FEATURE_NAMES.iter().zip(mapping.feature_columns()) {
        println!("  {:<16} {}", muted(name), column.white());
    }
    match &mapping.label {
        Some(label) => println!("  {:<16} {}", muted("label"), label.white()),
        None => println!("  {:<16} {}", muted("label"), "none, will be synthesized".yellow()),
    }

    println!();
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(host: &str, port: u16, model_dir: &Path) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "PumpGuard".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("API    ", &format!("http://{}:{}/api", host, port)));
    line_box(&kv("Health ", &format!("http://{}:{}/api/health", host, port)));
    line_box(&kv("Model  ", &model_dir.display().to_string()));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    let config = ServerConfig {
        host: host.to_string(),
        port,
        model_dir: model_dir.to_path_buf(),
        ..ServerConfig::default()
    };

    run_server(config, HypothesisConfig::from_env()).await
}
