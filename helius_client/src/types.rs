use serde::{Deserialize, Serialize};

/// One enriched transaction as returned by
/// `GET /v0/addresses/{address}/transactions`.
///
/// Every field defaults: upstream data is noisy and a missing label or
/// amount must degrade to empty/zero, never fail the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnrichedTransaction {
    pub signature: String,

    /// Unix timestamp. Helius documents seconds, but the field has been
    /// observed in milliseconds as well; see `ledger_core::rows`.
    pub timestamp: i64,

    /// Network fee in lamports
    pub fee: u64,

    /// Declared transaction category, e.g. "SWAP", "NFT_SALE"
    #[serde(rename = "type")]
    pub tx_type: String,

    /// Program source label, e.g. "JUPITER", "MAGIC_EDEN"
    pub source: String,

    /// Top-level program id, when Helius resolves one
    pub program_id: Option<String>,

    /// Instruction list, used as a fallback for the program id
    pub instructions: Vec<Instruction>,

    pub native_transfers: Vec<NativeTransfer>,

    pub token_transfers: Vec<TokenTransfer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Instruction {
    pub program_id: Option<String>,
}

/// A SOL transfer; `amount` is in lamports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NativeTransfer {
    pub from_user_account: Option<String>,
    pub to_user_account: Option<String>,
    pub amount: u64,
}

/// An SPL token transfer; `token_amount` is in raw token units.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenTransfer {
    pub from_user_account: Option<String>,
    pub to_user_account: Option<String>,
    pub token_amount: u64,
    pub token_decimals: u32,
    pub mint: Option<String>,
    pub token_symbol: Option<String>,
}

impl EnrichedTransaction {
    /// The transaction's primary program id: the top-level `programId` when
    /// present and non-empty, else the first instruction's, else "".
    pub fn primary_program_id(&self) -> &str {
        if let Some(pid) = self.program_id.as_deref() {
            if !pid.is_empty() {
                return pid;
            }
        }
        self.instructions
            .first()
            .and_then(|ix| ix.program_id.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_enriched_transaction() {
        let json_data = r#"
        {
          "signature": "58Y6ScVvkFutzKp57dX5xfLfxvw6e9pMYeK5vBbAb3fWKLBTpKvSxJZYQLGQDSkA1w3J8hF2gcPKgfr8sjpCBk5U",
          "timestamp": 1751414738,
          "fee": 5000,
          "type": "SWAP",
          "source": "JUPITER",
          "nativeTransfers": [
            {
              "fromUserAccount": "GBJ4MZe8fqpA6UVgjh19BwJPMb79KDfMv78XnFVxgH2Q",
              "toUserAccount": "BNso1VUJnh4zcfpZa6986Ea66P6TCp59hvtNJ8b1X85",
              "amount": 2000000000
            }
          ],
          "tokenTransfers": [
            {
              "fromUserAccount": "BNso1VUJnh4zcfpZa6986Ea66P6TCp59hvtNJ8b1X85",
              "toUserAccount": "GBJ4MZe8fqpA6UVgjh19BwJPMb79KDfMv78XnFVxgH2Q",
              "tokenAmount": 8369439226307,
              "tokenDecimals": 9,
              "mint": "BNso1VUJnh4zcfpZa6986Ea66P6TCp59hvtNJ8b1X85",
              "tokenSymbol": "BNSOL"
            }
          ],
          "instructions": [
            { "programId": "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4" }
          ]
        }"#;

        let tx: EnrichedTransaction =
            serde_json::from_str(json_data).expect("failed to parse transaction");

        assert_eq!(tx.tx_type, "SWAP");
        assert_eq!(tx.fee, 5000);
        assert_eq!(tx.native_transfers.len(), 1);
        assert_eq!(tx.native_transfers[0].amount, 2_000_000_000);
        assert_eq!(tx.token_transfers[0].token_symbol.as_deref(), Some("BNSOL"));
        assert_eq!(tx.token_transfers[0].token_decimals, 9);
        // no top-level programId, falls back to the first instruction
        assert_eq!(
            tx.primary_program_id(),
            "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4"
        );
    }

    #[test]
    fn sparse_payload_degrades_to_defaults() {
        let tx: EnrichedTransaction =
            serde_json::from_str(r#"{"signature": "abc"}"#).expect("failed to parse");

        assert_eq!(tx.signature, "abc");
        assert_eq!(tx.timestamp, 0);
        assert_eq!(tx.fee, 0);
        assert_eq!(tx.tx_type, "");
        assert_eq!(tx.source, "");
        assert!(tx.native_transfers.is_empty());
        assert!(tx.token_transfers.is_empty());
        assert_eq!(tx.primary_program_id(), "");
    }

    #[test]
    fn null_transfer_endpoints_parse() {
        let json_data = r#"
        {
          "signature": "sig",
          "nativeTransfers": [
            { "fromUserAccount": null, "toUserAccount": "abc", "amount": 1 }
          ]
        }"#;

        let tx: EnrichedTransaction = serde_json::from_str(json_data).expect("failed to parse");
        assert!(tx.native_transfers[0].from_user_account.is_none());
        assert_eq!(tx.native_transfers[0].to_user_account.as_deref(), Some("abc"));
    }
}
