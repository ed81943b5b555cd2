use helius_client::EnrichedTransaction;
use rust_decimal::Decimal;
use std::collections::HashSet;

/// One signed asset flow relative to the managed wallet set within a single
/// transaction. Positive = inflow to the managed set, negative = outflow.
/// Recomputed per transaction, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Movement {
    /// Display label: token symbol, else mint, else "TOKEN"; "SOL" for native
    pub asset: String,
    pub mint: Option<String>,
    pub decimals: u32,
    pub amount: Decimal,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Lamports to SOL as an exact decimal (10^9 lamports per SOL).
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from(lamports) * Decimal::new(1, 9)
}

fn scaled(raw: u64, decimals: u32) -> Decimal {
    // Decimal carries at most 28 fractional digits
    Decimal::from(raw) * Decimal::new(1, decimals.min(28))
}

fn is_managed(wallets: &HashSet<String>, addr: Option<&str>) -> bool {
    addr.map(|a| wallets.contains(a)).unwrap_or(false)
}

/// Sign of a transfer relative to the managed set, or `None` when the
/// transfer does not cross its boundary: both-managed entries are
/// self-transfer territory handled elsewhere, neither-managed entries are
/// noise, and an unresolved (null) address is never managed.
fn direction(wallets: &HashSet<String>, from: Option<&str>, to: Option<&str>) -> Option<Decimal> {
    match (is_managed(wallets, from), is_managed(wallets, to)) {
        (false, true) => Some(Decimal::ONE),
        (true, false) => Some(Decimal::NEGATIVE_ONE),
        _ => None,
    }
}

/// Decompose one transaction into per-asset movements plus its network fee
/// in lamports. A movement is emitted only for transfers with exactly one
/// managed endpoint; incoming amounts are positive, outgoing negative.
pub fn decompose(
    wallets: &HashSet<String>,
    tx: &EnrichedTransaction,
) -> (Vec<Movement>, u64) {
    let mut movements = Vec::new();

    for nt in &tx.native_transfers {
        let from = nt.from_user_account.as_deref();
        let to = nt.to_user_account.as_deref();
        let Some(sign) = direction(wallets, from, to) else {
            continue;
        };
        movements.push(Movement {
            asset: "SOL".to_string(),
            mint: None,
            decimals: 9,
            amount: lamports_to_sol(nt.amount) * sign,
            from: nt.from_user_account.clone(),
            to: nt.to_user_account.clone(),
        });
    }

    for tt in &tx.token_transfers {
        let from = tt.from_user_account.as_deref();
        let to = tt.to_user_account.as_deref();
        let Some(sign) = direction(wallets, from, to) else {
            continue;
        };
        let asset = tt
            .token_symbol
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(tt.mint.as_deref())
            .unwrap_or("TOKEN")
            .to_uppercase();
        movements.push(Movement {
            asset,
            mint: tt.mint.clone(),
            decimals: tt.token_decimals,
            amount: scaled(tt.token_amount, tt.token_decimals) * sign,
            from: tt.from_user_account.clone(),
            to: tt.to_user_account.clone(),
        });
    }

    (movements, tx.fee)
}
