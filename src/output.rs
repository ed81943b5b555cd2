use anyhow::{Context, Result};
use ledger_core::LedgerRow;

/// CSV column order; must match the `LedgerRow` field order.
const HEADERS: [&str; 15] = [
    "timestamp",
    "txid",
    "program_id",
    "program_source",
    "helius_type",
    "derived_type",
    "asset",
    "amount",
    "fee_sol",
    "is_self_transfer",
    "spam_flag",
    "from",
    "to",
    "description",
    "cost_basis_usd",
];

/// Write the normalized rows to `path`. The header row is always present,
/// even for an empty export; boolean flags serialize as lowercase literals.
pub fn write_csv(rows: &[LedgerRow], path: &str) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("failed to create {}", path))?;

    if rows.is_empty() {
        writer.write_record(HEADERS)?;
    } else {
        for row in rows {
            writer.serialize(row)?;
        }
    }

    writer.flush()?;
    Ok(())
}
