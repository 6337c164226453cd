// src/foundry/validate.rs
//
// Input shape checks for the dispatch layer. Every check runs before any
// subprocess or network call; values are passed to the tools verbatim once
// they pass.

use ethers_core::types::{Address, H256};
use url::Url;

use super::models::FoundryError;

/// 20-byte hex account/contract address, `0x`-prefixed or bare.
pub fn ensure_address(value: &str) -> Result<(), FoundryError> {
    value
        .parse::<Address>()
        .map(|_| ())
        .map_err(|_| FoundryError::InvalidParams(format!("invalid address: '{}'", value)))
}

/// 32-byte hex transaction hash.
pub fn ensure_tx_hash(value: &str) -> Result<(), FoundryError> {
    value
        .parse::<H256>()
        .map(|_| ())
        .map_err(|_| FoundryError::InvalidParams(format!("invalid transaction hash: '{}'", value)))
}

/// 32-byte hex private key, with or without the `0x` prefix.
pub fn ensure_private_key(value: &str) -> Result<(), FoundryError> {
    let raw = value.strip_prefix("0x").unwrap_or(value);
    match hex::decode(raw) {
        Ok(bytes) if bytes.len() == 32 => Ok(()),
        _ => Err(FoundryError::InvalidParams(
            "invalid private key: expected 32 bytes of hex".to_string(),
        )),
    }
}

/// Absolute URL with a host, e.g. an RPC endpoint or fork origin.
pub fn ensure_url(value: &str) -> Result<(), FoundryError> {
    match Url::parse(value) {
        Ok(url) if url.host().is_some() => Ok(()),
        _ => Err(FoundryError::InvalidParams(format!(
            "invalid URL: '{}'",
            value
        ))),
    }
}

/// Rejects empty or whitespace-only required string fields.
pub fn ensure_non_empty(field: &str, value: &str) -> Result<(), FoundryError> {
    if value.trim().is_empty() {
        return Err(FoundryError::InvalidParams(format!(
            "'{}' must not be empty",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_checksummed_and_lowercase_addresses() {
        assert!(ensure_address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045").is_ok());
        assert!(ensure_address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(ensure_address("0x1234").is_err());
        assert!(ensure_address("not-an-address").is_err());
        assert!(ensure_address("0xzzda6bf26964af9d7eed9e03e53415d37aa96045").is_err());
    }

    #[test]
    fn accepts_well_formed_tx_hashes() {
        assert!(ensure_tx_hash(
            "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b"
        )
        .is_ok());
    }

    #[test]
    fn rejects_short_tx_hashes() {
        assert!(ensure_tx_hash("0x88df016429689c079f3b2f6ad39fa052").is_err());
    }

    #[test]
    fn accepts_bare_and_prefixed_private_keys() {
        let bare = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        assert!(ensure_private_key(bare).is_ok());
        assert!(ensure_private_key(&format!("0x{}", bare)).is_ok());
    }

    #[test]
    fn rejects_wrong_length_private_keys() {
        assert!(ensure_private_key("0xac0974").is_err());
        assert!(ensure_private_key("").is_err());
    }

    #[test]
    fn urls_need_a_host() {
        assert!(ensure_url("http://127.0.0.1:8545").is_ok());
        assert!(ensure_url("https://eth-mainnet.example/v2/key").is_ok());
        assert!(ensure_url("not a url").is_err());
        assert!(ensure_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn empty_required_fields_are_rejected() {
        assert!(ensure_non_empty("source", "   ").is_err());
        assert!(ensure_non_empty("source", "uint x;").is_ok());
    }
}
