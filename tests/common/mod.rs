//! Shared helpers for the accounting scenarios: token fixtures and event
//! builders keyed by whole days since the Unix epoch.

#![allow(dead_code)]

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;

use st0x_pnl::{Event, TokenKey};

pub const ONE_YEAR_DAYS: i64 = 365;

pub fn weth() -> TokenKey {
    TokenKey::new("ethereum", "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2")
}

pub fn usdc_on_base() -> TokenKey {
    TokenKey::new("base", "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913")
}

pub fn wsol() -> TokenKey {
    TokenKey::new("solana", "So11111111111111111111111111111111111111112")
}

pub fn day(days: i64) -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + TimeDelta::days(days)
}

pub fn buy(token: &TokenKey, days: i64, amount: Decimal, price: Decimal) -> Event {
    Event::acquire(token.clone(), day(days), amount, price)
}

pub fn sell(token: &TokenKey, days: i64, amount: Decimal, price: Decimal) -> Event {
    Event::dispose(token.clone(), day(days), amount, price)
}
