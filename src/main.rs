//! PumpGuard - Main Entry Point
//!
//! Trains the pump health classifier, analyzes single readings and serves the
//! analysis API.

use clap::Parser;
use pumpguard::cli::{cmd_inspect, cmd_predict, cmd_serve, cmd_train, Cli, Commands};
use pumpguard::sensor::SensorReading;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pumpguard=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { csv, out, trees, seed } => {
            cmd_train(&csv, &out, trees, seed)?;
        }
        Commands::Predict { vibration, temperature, current, model_dir } => {
            cmd_predict(SensorReading::new(vibration, temperature, current), &model_dir).await?;
        }
        Commands::Inspect { csv } => {
            cmd_inspect(&csv)?;
        }
        Commands::Serve { host, port, model_dir } => {
            cmd_serve(&host, port, &model_dir).await?;
        }
    }

    Ok(())
}
