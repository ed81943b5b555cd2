use crate::classify::{derive_type, is_bubblegum_spam, is_self_transfer, DerivedType};
use crate::movement::{decompose, lamports_to_sol};
use chrono::DateTime;
use helius_client::EnrichedTransaction;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Numeric timestamps below this are taken to be seconds and scaled up.
/// The upstream contract is ambiguous about units; this magnitude heuristic
/// is an approximation carried over from the feed's observed behavior.
const MS_THRESHOLD: i64 = 1_000_000_000_000;

/// One normalized output row. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    pub timestamp: String,
    pub txid: String,
    pub program_id: String,
    pub program_source: String,
    pub helius_type: String,
    pub derived_type: DerivedType,
    pub asset: String,
    pub amount: Decimal,
    pub fee_sol: Decimal,
    pub is_self_transfer: bool,
    pub spam_flag: bool,
    pub from: String,
    pub to: String,
    pub description: String,
    /// Reserved for a future price collaborator; always blank
    pub cost_basis_usd: String,
}

fn timestamp_to_iso(ts: i64) -> String {
    if ts <= 0 {
        return String::new();
    }
    let ms = if ts < MS_THRESHOLD { ts * 1000 } else { ts };
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_default()
}

/// Normalize a batch of transactions into ledger rows: one row per asset
/// movement, or a single zero-movement row when a transaction moved nothing
/// relative to the managed set. Pure and deterministic over its inputs.
pub fn build_rows(
    wallets: &HashSet<String>,
    transactions: &[EnrichedTransaction],
    spam_program_ids: &HashSet<String>,
) -> Vec<LedgerRow> {
    let mut rows = Vec::new();

    for tx in transactions {
        let (movements, fee_lamports) = decompose(wallets, tx);
        let is_self = is_self_transfer(wallets, tx);
        let spam = is_bubblegum_spam(tx, &movements, spam_program_ids);
        let derived = derive_type(tx, is_self, &movements, spam);

        let timestamp = timestamp_to_iso(tx.timestamp);
        let fee_sol = lamports_to_sol(fee_lamports).normalize();
        let program_id = tx.primary_program_id().to_string();

        debug!(
            "tx {}: {} movement(s), derived type {}",
            tx.signature,
            movements.len(),
            derived
        );

        if movements.is_empty() {
            rows.push(LedgerRow {
                timestamp,
                txid: tx.signature.clone(),
                program_id,
                program_source: tx.source.clone(),
                helius_type: tx.tx_type.clone(),
                derived_type: derived,
                asset: String::new(),
                amount: Decimal::ZERO,
                fee_sol,
                is_self_transfer: is_self,
                spam_flag: spam,
                from: String::new(),
                to: String::new(),
                description: format!("program={} type={}", tx.source, tx.tx_type),
                cost_basis_usd: String::new(),
            });
            continue;
        }

        for movement in &movements {
            rows.push(LedgerRow {
                timestamp: timestamp.clone(),
                txid: tx.signature.clone(),
                program_id: program_id.clone(),
                program_source: tx.source.clone(),
                helius_type: tx.tx_type.clone(),
                derived_type: derived,
                asset: movement.asset.clone(),
                amount: movement.amount.normalize(),
                fee_sol,
                is_self_transfer: is_self,
                spam_flag: spam,
                from: movement.from.clone().unwrap_or_default(),
                to: movement.to.clone().unwrap_or_default(),
                description: format!(
                    "program={} type={} mint={}",
                    tx.source,
                    tx.tx_type,
                    movement.mint.as_deref().unwrap_or("none")
                ),
                cost_basis_usd: String::new(),
            });
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use helius_client::NativeTransfer;

    fn wallets(addrs: &[&str]) -> HashSet<String> {
        addrs.iter().map(|a| a.to_string()).collect()
    }

    fn no_spam_ids() -> HashSet<String> {
        HashSet::new()
    }

    #[test]
    fn second_granular_timestamps_are_scaled() {
        assert_eq!(timestamp_to_iso(1_700_000_000), "2023-11-14T22:13:20Z");
        // already milliseconds: same instant
        assert_eq!(timestamp_to_iso(1_700_000_000_000), "2023-11-14T22:13:20Z");
        assert_eq!(timestamp_to_iso(0), "");
    }

    #[test]
    fn incoming_transfer_produces_full_row() {
        let wallets = wallets(&["Y"]);
        let tx = EnrichedTransaction {
            signature: "sig1".to_string(),
            timestamp: 1_700_000_000,
            fee: 5000,
            source: "SYSTEM_PROGRAM".to_string(),
            tx_type: "TRANSFER".to_string(),
            native_transfers: vec![NativeTransfer {
                from_user_account: Some("X".to_string()),
                to_user_account: Some("Y".to_string()),
                amount: 2_000_000_000,
            }],
            ..Default::default()
        };

        let rows = build_rows(&wallets, &[tx], &no_spam_ids());
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.txid, "sig1");
        assert_eq!(row.asset, "SOL");
        assert_eq!(row.amount, Decimal::from(2));
        assert_eq!(row.fee_sol, Decimal::new(5, 6));
        assert_eq!(row.derived_type, DerivedType::Income);
        assert!(!row.is_self_transfer);
        assert!(!row.spam_flag);
        assert_eq!(row.from, "X");
        assert_eq!(row.to, "Y");
        assert_eq!(row.cost_basis_usd, "");
    }

    #[test]
    fn zero_movement_transaction_yields_one_summary_row() {
        let wallets = wallets(&["A"]);
        let tx = EnrichedTransaction {
            signature: "sig2".to_string(),
            source: "JUPITER".to_string(),
            tx_type: "SWAP".to_string(),
            ..Default::default()
        };

        let rows = build_rows(&wallets, &[tx], &no_spam_ids());
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.asset, "");
        assert_eq!(row.amount, Decimal::ZERO);
        assert_eq!(row.from, "");
        assert_eq!(row.to, "");
        assert_eq!(row.description, "program=JUPITER type=SWAP");
        assert_eq!(row.derived_type, DerivedType::Trade);
    }

    #[test]
    fn bubblegum_dust_overrides_declared_nft_category() {
        let wallets = wallets(&["A"]);
        let allow: HashSet<String> = ["BGUM111".to_string()].into_iter().collect();
        let tx = EnrichedTransaction {
            signature: "sig3".to_string(),
            source: "UNKNOWN".to_string(),
            tx_type: "NFT".to_string(),
            program_id: Some("BGUM111".to_string()),
            ..Default::default()
        };

        let rows = build_rows(&wallets, &[tx], &allow);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].spam_flag);
        assert_eq!(rows[0].derived_type, DerivedType::SpamCnft);
    }

    #[test]
    fn internal_transfer_emits_summary_row_with_flag() {
        // Both endpoints managed: the decomposer skips the transfer, so the
        // transaction surfaces as one zero-movement transfer_internal row.
        let wallets = wallets(&["A", "B"]);
        let tx = EnrichedTransaction {
            signature: "sig4".to_string(),
            native_transfers: vec![NativeTransfer {
                from_user_account: Some("A".to_string()),
                to_user_account: Some("B".to_string()),
                amount: 1_000_000_000,
            }],
            ..Default::default()
        };

        let rows = build_rows(&wallets, &[tx], &no_spam_ids());
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_self_transfer);
        assert_eq!(rows[0].derived_type, DerivedType::TransferInternal);
    }

    #[test]
    fn one_row_per_movement_with_shared_fields() {
        let wallets = wallets(&["A"]);
        let tx: EnrichedTransaction = serde_json::from_str(
            r#"{
                "signature": "sig5",
                "timestamp": 1700000000,
                "fee": 5000,
                "type": "SWAP",
                "source": "JUPITER",
                "nativeTransfers": [
                    { "fromUserAccount": "A", "toUserAccount": "X", "amount": 1000000000 }
                ],
                "tokenTransfers": [
                    { "fromUserAccount": "X", "toUserAccount": "A",
                      "tokenAmount": 1500000, "tokenDecimals": 6,
                      "mint": "EPjF", "tokenSymbol": "USDC" }
                ]
            }"#,
        )
        .unwrap();

        let rows = build_rows(&wallets, &[tx], &no_spam_ids());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].asset, "SOL");
        assert_eq!(rows[1].asset, "USDC");
        for row in &rows {
            assert_eq!(row.txid, "sig5");
            assert_eq!(row.derived_type, DerivedType::Trade);
            assert_eq!(row.fee_sol, Decimal::new(5, 6));
        }
        assert_eq!(rows[1].description, "program=JUPITER type=SWAP mint=EPjF");
    }

    #[test]
    fn build_rows_is_idempotent() {
        let wallets = wallets(&["A"]);
        let txs = vec![
            EnrichedTransaction {
                signature: "s1".to_string(),
                timestamp: 1_700_000_000,
                native_transfers: vec![NativeTransfer {
                    from_user_account: Some("X".to_string()),
                    to_user_account: Some("A".to_string()),
                    amount: 42,
                }],
                ..Default::default()
            },
            EnrichedTransaction {
                signature: "s2".to_string(),
                ..Default::default()
            },
        ];

        let first = build_rows(&wallets, &txs, &no_spam_ids());
        let second = build_rows(&wallets, &txs, &no_spam_ids());
        assert_eq!(first, second);
    }
}
