//! Per-wallet export pipeline: fetch enriched transactions through
//! `helius_client`, normalize them into ledger rows with `ledger_core`.
//! Wallets run through a bounded, order-preserving stream; one wallet's
//! failure never takes down the rest of the run.

use config_manager::ExporterConfig;
use futures::{stream, Stream, StreamExt};
use helius_client::{FetchWindow, HeliusClient, HeliusError};
use ledger_core::LedgerRow;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("fetch failed for wallet {wallet}: {source}")]
    Fetch {
        wallet: String,
        #[source]
        source: HeliusError,
    },
}

/// Per-run fetch options, resolved from config and CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// Maximum transactions fetched per wallet
    pub limit: usize,
    pub window: FetchWindow,
}

/// Outcome for one wallet: its rows, or the error that aborted its fetch.
#[derive(Debug)]
pub struct WalletResult {
    pub wallet: String,
    pub rows: Result<Vec<LedgerRow>, OrchestratorError>,
}

#[derive(Clone)]
pub struct WalletExporter {
    client: HeliusClient,
    wallets: HashSet<String>,
    spam_program_ids: HashSet<String>,
    max_concurrent: usize,
}

impl WalletExporter {
    pub fn new(config: &ExporterConfig, wallets: HashSet<String>) -> Result<Self, HeliusError> {
        let client = HeliusClient::new(config.helius.clone())?;
        Ok(Self {
            client,
            wallets,
            spam_program_ids: config.spam.program_id_set(),
            max_concurrent: config.export.max_concurrent_wallets,
        })
    }

    /// Fetch and normalize one wallet's history. Classification and
    /// decomposition never fail; only the fetch can.
    pub async fn export_wallet(
        &self,
        wallet: &str,
        options: &ExportOptions,
    ) -> Result<Vec<LedgerRow>, OrchestratorError> {
        let transactions = self
            .client
            .get_wallet_transactions(wallet, options.limit, options.window)
            .await
            .map_err(|source| OrchestratorError::Fetch {
                wallet: wallet.to_string(),
                source,
            })?;

        let rows = ledger_core::build_rows(&self.wallets, &transactions, &self.spam_program_ids);
        info!(
            "Wallet {}: {} transactions -> {} rows",
            wallet,
            transactions.len(),
            rows.len()
        );
        Ok(rows)
    }

    /// All wallets as an order-preserving stream with bounded concurrency.
    /// Each item completes as its wallet finishes; failed wallets are
    /// reported in place and the stream continues.
    pub fn export_stream<'a>(
        &'a self,
        wallet_order: &'a [String],
        options: &'a ExportOptions,
    ) -> impl Stream<Item = WalletResult> + 'a {
        stream::iter(wallet_order)
            .map(move |wallet| async move {
                let rows = self.export_wallet(wallet, options).await;
                if let Err(e) = &rows {
                    warn!("Wallet {} failed: {}", wallet, e);
                }
                WalletResult {
                    wallet: wallet.clone(),
                    rows,
                }
            })
            .buffered(self.max_concurrent)
    }

    /// Convenience wrapper collecting the whole run.
    pub async fn export_all(
        &self,
        wallet_order: &[String],
        options: &ExportOptions,
    ) -> Vec<WalletResult> {
        self.export_stream(wallet_order, options).collect().await
    }
}
