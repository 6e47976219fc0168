//! Shared test fixtures: well-known tokens and event builders keyed by
//! seconds since the Unix epoch.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::event::Event;
use crate::token::TokenKey;

pub(crate) const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

pub(crate) fn eth_token() -> TokenKey {
    TokenKey::new("ethereum", "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE")
}

pub(crate) fn base_token() -> TokenKey {
    TokenKey::new("base", "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913")
}

pub(crate) fn sol_token() -> TokenKey {
    TokenKey::new("solana", "So11111111111111111111111111111111111111112")
}

pub(crate) fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).expect("Invalid timestamp")
}

pub(crate) fn acquire(token: &TokenKey, secs: i64, amount: Decimal, price: Decimal) -> Event {
    Event::acquire(token.clone(), at(secs), amount, price)
}

pub(crate) fn dispose(token: &TokenKey, secs: i64, amount: Decimal, price: Decimal) -> Event {
    Event::dispose(token.clone(), at(secs), amount, price)
}
