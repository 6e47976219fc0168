//! Token identity: the `(chain, address)` pair that scopes one lot ledger.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Chain identifier as supplied by the history provider. Not validated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chain(String);

impl Chain {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Chain {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Token contract or native-asset address.
///
/// Hex (`0x`-prefixed) addresses are stored lowercased so that two spellings
/// of the same checksummed address compare equal. Anything else, such as a
/// base58 Solana mint, is case-sensitive and kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TokenAddress(String);

impl TokenAddress {
    pub fn new(address: &str) -> Self {
        let is_hex = address
            .get(..2)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("0x"));

        if is_hex {
            Self(address.to_ascii_lowercase())
        } else {
            Self(address.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for TokenAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let address = String::deserialize(deserializer)?;
        Ok(Self::new(&address))
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenKey {
    pub chain: Chain,
    pub address: TokenAddress,
}

impl TokenKey {
    pub fn new(chain: impl Into<String>, address: &str) -> Self {
        Self {
            chain: Chain::new(chain),
            address: TokenAddress::new(address),
        }
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain, self.address)
    }
}
