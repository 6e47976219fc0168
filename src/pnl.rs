//! Per-token P&L: replays one token's events through a fresh [`LotLedger`]
//! and values whatever is left at the current price.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::event::{Direction, Event};
use crate::ledger::{Disposal, LotLedger, PnlError};
use crate::normalize::normalize;
use crate::token::TokenKey;

/// Result of replaying one token's normalized events.
///
/// Both the P&L figures and the tax-lot classification are derived from the
/// same replay, so the holding period of every matched unit is preserved
/// alongside the aggregate realized P&L.
#[derive(Debug)]
pub struct Replay {
    pub token: TokenKey,
    pub ledger: LotLedger,
    pub disposals: Vec<Disposal>,
    pub realized_pnl_usd: Decimal,
    pub total_invested_usd: Decimal,
}

impl Replay {
    /// Replays `events` in order. Callers pass events already normalized
    /// for `token`.
    pub fn run(token: TokenKey, events: &[Event]) -> Result<Self, PnlError> {
        let mut replay = Self {
            token,
            ledger: LotLedger::new(),
            disposals: Vec::new(),
            realized_pnl_usd: Decimal::ZERO,
            total_invested_usd: Decimal::ZERO,
        };

        for event in events {
            match event.direction {
                Direction::Acquire => replay.apply_acquisition(event)?,
                Direction::Dispose => replay.apply_disposal(event)?,
            }
        }

        debug!(
            token = %replay.token,
            disposals = replay.disposals.len(),
            realized_pnl_usd = %replay.realized_pnl_usd,
            "Replayed token events"
        );

        Ok(replay)
    }

    fn apply_acquisition(&mut self, event: &Event) -> Result<(), PnlError> {
        self.ledger
            .acquire(event.amount, event.unit_price_usd, event.timestamp);

        self.total_invested_usd = event
            .amount
            .checked_mul(event.unit_price_usd)
            .and_then(|notional| self.total_invested_usd.checked_add(notional))
            .ok_or(PnlError::ArithmeticOverflow)?;

        Ok(())
    }

    fn apply_disposal(&mut self, event: &Event) -> Result<(), PnlError> {
        let disposal = self
            .ledger
            .dispose(event.amount, event.unit_price_usd, event.timestamp)?;

        if disposal.unmatched_amount > Decimal::ZERO {
            warn!(
                token = %self.token,
                timestamp = %event.timestamp,
                unmatched_amount = %disposal.unmatched_amount,
                "Disposal exceeds tracked lots, ignoring unmatched amount"
            );
        }

        self.realized_pnl_usd = self
            .realized_pnl_usd
            .checked_add(disposal.realized_pnl()?)
            .ok_or(PnlError::ArithmeticOverflow)?;

        self.disposals.push(disposal);
        Ok(())
    }

    /// Values the replayed position.
    ///
    /// Effective holdings are the larger of `balance` and what the ledger
    /// still holds, so a stale balance never zeroes out unrealized P&L.
    pub fn token_pnl(
        &self,
        current_price_usd: Decimal,
        balance: Option<Decimal>,
    ) -> Result<TokenPnl, PnlError> {
        let cost_basis_usd = self.ledger.cost_basis()?;
        let holdings = self
            .ledger
            .holdings()?
            .max(balance.unwrap_or_default());

        let current_value_usd = holdings
            .checked_mul(current_price_usd)
            .ok_or(PnlError::ArithmeticOverflow)?;

        let unrealized_pnl_usd = cost_basis_usd
            .checked_mul(holdings)
            .and_then(|open_cost| current_value_usd.checked_sub(open_cost))
            .ok_or(PnlError::ArithmeticOverflow)?;

        let total_pnl_usd = self
            .realized_pnl_usd
            .checked_add(unrealized_pnl_usd)
            .ok_or(PnlError::ArithmeticOverflow)?;

        let unmatched_disposal_amount =
            self.disposals
                .iter()
                .try_fold(Decimal::ZERO, |acc, disposal| {
                    acc.checked_add(disposal.unmatched_amount)
                        .ok_or(PnlError::ArithmeticOverflow)
                })?;

        Ok(TokenPnl {
            token: self.token.clone(),
            realized_pnl_usd: self.realized_pnl_usd,
            unrealized_pnl_usd,
            total_pnl_usd,
            cost_basis_usd,
            current_value_usd,
            total_invested_usd: self.total_invested_usd,
            percentage_change: percentage_change(total_pnl_usd, self.total_invested_usd)?,
            holdings,
            unmatched_disposal_amount,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPnl {
    pub token: TokenKey,
    pub realized_pnl_usd: Decimal,
    pub unrealized_pnl_usd: Decimal,
    pub total_pnl_usd: Decimal,
    /// Weighted-average unit cost of the lots still held.
    pub cost_basis_usd: Decimal,
    pub current_value_usd: Decimal,
    /// Sum of all acquisition notional. Disposals never reduce it.
    pub total_invested_usd: Decimal,
    pub percentage_change: Decimal,
    pub holdings: Decimal,
    pub unmatched_disposal_amount: Decimal,
}

/// Computes P&L for a single token from its raw event history.
pub fn calculate_token_pnl(
    token: &TokenKey,
    events: Vec<Event>,
    current_price_usd: Decimal,
    balance: Option<Decimal>,
) -> Result<TokenPnl, PnlError> {
    let events = normalize(events);
    Replay::run(token.clone(), &events)?.token_pnl(current_price_usd, balance)
}

pub(crate) fn percentage_change(
    total_pnl_usd: Decimal,
    total_invested_usd: Decimal,
) -> Result<Decimal, PnlError> {
    if total_invested_usd <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    total_pnl_usd
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(total_invested_usd))
        .ok_or(PnlError::ArithmeticOverflow)
}
