use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::token::{Chain, TokenAddress, TokenKey};

/// Largest number of fractional digits `Decimal` can carry.
const MAX_TOKEN_DECIMALS: u8 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Acquire,
    Dispose,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Acquire => "acquire",
            Self::Dispose => "dispose",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid direction: '{0}'")]
pub struct InvalidDirectionError(String);

impl FromStr for Direction {
    type Err = InvalidDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "acquire" => Ok(Self::Acquire),
            "dispose" => Ok(Self::Dispose),
            _ => Err(InvalidDirectionError(s.to_string())),
        }
    }
}

/// A single acquisition or disposal of one token.
///
/// `amount` is in the token's human-readable units and is expected to be
/// non-negative. A missing `unitPriceUsd` deserializes as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub token: TokenKey,
    pub amount: Decimal,
    #[serde(default)]
    pub unit_price_usd: Decimal,
    pub direction: Direction,
}

impl Event {
    pub fn acquire(
        token: TokenKey,
        timestamp: DateTime<Utc>,
        amount: Decimal,
        unit_price_usd: Decimal,
    ) -> Self {
        Self {
            timestamp,
            token,
            amount,
            unit_price_usd,
            direction: Direction::Acquire,
        }
    }

    pub fn dispose(
        token: TokenKey,
        timestamp: DateTime<Utc>,
        amount: Decimal,
        unit_price_usd: Decimal,
    ) -> Self {
        Self {
            timestamp,
            token,
            amount,
            unit_price_usd,
            direction: Direction::Dispose,
        }
    }
}

/// How a transfer moved relative to the wallet, as reported by a
/// transaction-history provider. Each swap is reported as two legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    Send,
    Receive,
    SwapIn,
    SwapOut,
}

impl From<TransferKind> for Direction {
    fn from(kind: TransferKind) -> Self {
        match kind {
            TransferKind::Receive | TransferKind::SwapIn => Self::Acquire,
            TransferKind::Send | TransferKind::SwapOut => Self::Dispose,
        }
    }
}

/// Provider-shaped transfer carrying a signed base-unit amount.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransfer {
    pub chain: Chain,
    pub address: TokenAddress,
    pub decimals: u8,
    pub raw_amount: i128,
    pub unit_price_usd: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
    pub kind: TransferKind,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferConversionError {
    #[error("Token decimals {0} exceed the supported maximum of {MAX_TOKEN_DECIMALS}")]
    UnsupportedDecimals(u8),
    #[error("Raw amount {0} does not fit in a decimal")]
    AmountOutOfRange(i128),
}

impl TryFrom<RawTransfer> for Event {
    type Error = TransferConversionError;

    fn try_from(transfer: RawTransfer) -> Result<Self, Self::Error> {
        if transfer.decimals > MAX_TOKEN_DECIMALS {
            return Err(TransferConversionError::UnsupportedDecimals(
                transfer.decimals,
            ));
        }

        let amount =
            Decimal::try_from_i128_with_scale(transfer.raw_amount, u32::from(transfer.decimals))
                .map_err(|_| TransferConversionError::AmountOutOfRange(transfer.raw_amount))?
                .abs()
                .normalize();

        Ok(Self {
            timestamp: transfer.timestamp,
            token: TokenKey {
                chain: transfer.chain,
                address: transfer.address,
            },
            amount,
            unit_price_usd: transfer.unit_price_usd.unwrap_or_default(),
            direction: transfer.kind.into(),
        })
    }
}
