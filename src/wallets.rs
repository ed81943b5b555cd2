use anyhow::{bail, Context, Result};
use std::fs;

/// Load the managed wallet list: a JSON array of base58 address strings.
/// Any other shape is a fatal input validation error, raised before any
/// network activity.
pub fn load_wallets(path: &str) -> Result<Vec<String>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read wallet list {}", path))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("wallet list {} is not valid JSON", path))?;

    let Some(entries) = value.as_array() else {
        bail!("{} must be a JSON array of wallet strings", path);
    };

    let mut wallets = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry.as_str() {
            Some(s) => wallets.push(s.trim().to_string()),
            None => bail!("{} must contain only strings, found: {}", path, entry),
        }
    }

    if wallets.is_empty() {
        bail!("wallet list {} is empty", path);
    }
    Ok(wallets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_fixture(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("helius_exporter_{}", name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_and_trims_wallet_strings() {
        let path = write_fixture("wallets_ok.json", r#"[" abc ", "def"]"#);
        let wallets = load_wallets(path.to_str().unwrap()).unwrap();
        assert_eq!(wallets, vec!["abc".to_string(), "def".to_string()]);
    }

    #[test]
    fn rejects_non_array_payload() {
        let path = write_fixture("wallets_obj.json", r#"{"wallets": []}"#);
        assert!(load_wallets(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn rejects_non_string_entries() {
        let path = write_fixture("wallets_mixed.json", r#"["abc", 42]"#);
        assert!(load_wallets(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn rejects_empty_list() {
        let path = write_fixture("wallets_empty.json", "[]");
        assert!(load_wallets(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_wallets("/nonexistent/wallets.json").is_err());
    }
}
