//! Signing key wrapper.

use std::fmt;

use alloy_core::primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use k256::ecdsa;

/// A validated secp256k1 private key.
///
/// The key material never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    inner: ecdsa::SigningKey,
}

impl SigningKey {
    /// Parse a hex encoded private key, with or without a `0x` prefix.
    ///
    /// Returns `None` when the input is not 32 bytes of hex or is not a valid scalar
    /// (zero or above the curve order).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let hex_part = raw.strip_prefix("0x").unwrap_or(raw);
        let bytes = hex::decode(hex_part).ok()?;

        if bytes.len() != 32 {
            return None;
        }

        let inner = ecdsa::SigningKey::from_slice(&bytes).ok()?;
        Some(Self { inner })
    }

    /// Build a transaction signer from this key.
    pub fn signer(&self) -> PrivateKeySigner {
        PrivateKeySigner::from_signing_key(self.inner.clone())
    }

    /// The account address controlled by this key.
    pub fn address(&self) -> Address {
        self.signer().address()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// First default account of Anvil and Hardhat local nodes.
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_parse_with_and_without_prefix() {
        let with_prefix = SigningKey::parse(DEV_KEY).unwrap();
        let without_prefix = SigningKey::parse(&DEV_KEY[2..]).unwrap();
        assert_eq!(with_prefix, without_prefix);
    }

    #[test]
    fn test_address_derivation() {
        let key = SigningKey::parse(DEV_KEY).unwrap();
        assert_eq!(
            key.address().to_checksum(None),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn test_rejects_malformed_keys() {
        assert!(SigningKey::parse("").is_none());
        assert!(SigningKey::parse("0x1234").is_none());
        assert!(SigningKey::parse(&format!("0x{}", "zz".repeat(32))).is_none());
        // zero is not a valid scalar
        assert!(SigningKey::parse(&format!("0x{}", "00".repeat(32))).is_none());
        // 33 bytes
        assert!(SigningKey::parse(&format!("{}aa", DEV_KEY)).is_none());
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = SigningKey::parse(DEV_KEY).unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains(&DEV_KEY[2..]));
        assert!(debug.contains("SigningKey"));
    }
}
