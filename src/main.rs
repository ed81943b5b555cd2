mod output;
mod wallets;

use anyhow::bail;
use chrono::DateTime;
use clap::Parser;
use config_manager::ExporterConfig;
use export_orchestrator::{ExportOptions, WalletExporter};
use futures::{pin_mut, StreamExt};
use helius_client::FetchWindow;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "helius_exporter")]
#[command(
    about = "Export Solana wallet activity to a CSV ledger via the Helius enriched API",
    long_about = None
)]
struct Args {
    /// Helius API key (falls back to HELIUS_API_KEY or config.toml)
    #[arg(long)]
    api_key: Option<String>,

    /// Path to the wallet list, a JSON array of base58 strings
    #[arg(long)]
    wallets: Option<String>,

    /// CSV output path
    #[arg(long)]
    output: Option<String>,

    /// Inclusive RFC3339 start bound, e.g. 2024-01-01T00:00:00Z
    #[arg(long)]
    start: Option<String>,

    /// Exclusive RFC3339 end bound
    #[arg(long)]
    end: Option<String>,

    /// Max transactions fetched per wallet
    #[arg(long)]
    limit: Option<usize>,
}

fn parse_bound(label: &str, value: &str) -> anyhow::Result<i64> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Ok(dt.timestamp_millis()),
        Err(e) => bail!("invalid {} time '{}': {}", label, value, e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,helius_exporter=debug".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = ExporterConfig::load()?;
    if let Some(key) = args.api_key {
        config.helius.api_key = key;
    }
    if let Some(limit) = args.limit {
        config.export.default_limit = limit;
    }
    if let Some(path) = args.wallets {
        config.export.wallets_path = path;
    }
    if let Some(path) = args.output {
        config.export.output_path = path;
    }

    // Fatal before any network activity
    config.helius.validate()?;
    config.export.validate()?;

    let window = FetchWindow {
        start_ms: args
            .start
            .as_deref()
            .map(|s| parse_bound("start", s))
            .transpose()?,
        end_ms: args
            .end
            .as_deref()
            .map(|s| parse_bound("end", s))
            .transpose()?,
    };
    let options = ExportOptions {
        limit: config.export.default_limit,
        window,
    };

    let wallet_list = wallets::load_wallets(&config.export.wallets_path)?;
    info!(
        "Loaded {} wallets from {}",
        wallet_list.len(),
        config.export.wallets_path
    );

    let managed: HashSet<String> = wallet_list.iter().cloned().collect();
    let exporter = WalletExporter::new(&config, managed)?;

    let progress = ProgressBar::new(wallet_list.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")?.progress_chars("=> "),
    );
    progress.set_message("Wallets");

    let mut all_rows = Vec::new();
    let mut failed_wallets: Vec<String> = Vec::new();

    let results = exporter.export_stream(&wallet_list, &options);
    pin_mut!(results);
    while let Some(result) = results.next().await {
        match result.rows {
            Ok(rows) => all_rows.extend(rows),
            Err(e) => {
                error!("{}", e);
                failed_wallets.push(result.wallet);
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    output::write_csv(&all_rows, &config.export.output_path)?;
    info!(
        "Wrote {} rows to {}",
        all_rows.len(),
        config.export.output_path
    );

    if !failed_wallets.is_empty() {
        bail!(
            "{} wallet(s) failed: {}",
            failed_wallets.len(),
            failed_wallets.join(", ")
        );
    }
    Ok(())
}
