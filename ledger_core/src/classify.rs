use crate::movement::Movement;
use helius_client::EnrichedTransaction;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Source label marker for the Bubblegum compressed-NFT program family
const BUBBLEGUM_SOURCE_MARKER: &str = "bubblegum";

/// Semantic transaction type derived from the ordered rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedType {
    SpamCnft,
    TransferInternal,
    Trade,
    Nft,
    Staking,
    Income,
    Spend,
    Transfer,
}

impl DerivedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DerivedType::SpamCnft => "spam_cnft",
            DerivedType::TransferInternal => "transfer_internal",
            DerivedType::Trade => "trade",
            DerivedType::Nft => "nft",
            DerivedType::Staking => "staking",
            DerivedType::Income => "income",
            DerivedType::Spend => "spend",
            DerivedType::Transfer => "transfer",
        }
    }
}

impl fmt::Display for DerivedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the transaction's value movement appears confined to the managed
/// wallet set: true iff at least two distinct managed addresses appear among
/// the transfer endpoints.
///
/// This is a deliberate over-approximation: any transaction touching two
/// managed wallets is flagged, not only a clean internal A->B transfer.
pub fn is_self_transfer(wallets: &HashSet<String>, tx: &EnrichedTransaction) -> bool {
    let mut endpoints: HashSet<&str> = HashSet::new();

    for nt in &tx.native_transfers {
        endpoints.extend(nt.from_user_account.as_deref());
        endpoints.extend(nt.to_user_account.as_deref());
    }
    for tt in &tx.token_transfers {
        endpoints.extend(tt.from_user_account.as_deref());
        endpoints.extend(tt.to_user_account.as_deref());
    }

    endpoints.iter().filter(|a| wallets.contains(**a)).count() >= 2
}

/// Heuristic for unsolicited compressed-NFT airdrops: the transaction comes
/// from the Bubblegum family (source marker or program-id allow-list) and
/// its net SOL movement is negligible (at most 1e-5 SOL in magnitude).
pub fn is_bubblegum_spam(
    tx: &EnrichedTransaction,
    movements: &[Movement],
    program_ids: &HashSet<String>,
) -> bool {
    let source = tx.source.to_lowercase();
    let from_family = source.contains(BUBBLEGUM_SOURCE_MARKER)
        || program_ids.contains(tx.primary_program_id());
    if !from_family {
        return false;
    }

    let sol_net: Decimal = movements
        .iter()
        .filter(|m| m.asset == "SOL")
        .map(|m| m.amount)
        .sum();
    sol_net.abs() <= Decimal::new(1, 5)
}

/// Ordered, first-match classification. Total: the final net-movement rule
/// always produces a value.
pub fn derive_type(
    tx: &EnrichedTransaction,
    is_self: bool,
    movements: &[Movement],
    spam: bool,
) -> DerivedType {
    if spam {
        return DerivedType::SpamCnft;
    }
    if is_self {
        return DerivedType::TransferInternal;
    }

    let category = tx.tx_type.to_lowercase();
    let source = tx.source.to_lowercase();

    if source.contains("swap") || category == "swap" {
        return DerivedType::Trade;
    }
    if matches!(category.as_str(), "nft" | "nft_sale" | "nft_mint") || source.contains("nft") {
        return DerivedType::Nft;
    }
    if source.contains("stake") || matches!(category.as_str(), "stake" | "unstake") {
        return DerivedType::Staking;
    }

    let net: Decimal = movements.iter().map(|m| m.amount).sum();
    if net > Decimal::ZERO {
        DerivedType::Income
    } else if net < Decimal::ZERO {
        DerivedType::Spend
    } else {
        DerivedType::Transfer
    }
}
