use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PnlError {
    #[error("Arithmetic overflow in P&L calculation")]
    ArithmeticOverflow,
}

/// An open acquisition still (partially) held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lot {
    pub amount: Decimal,
    pub unit_cost_usd: Decimal,
    pub acquired_at: DateTime<Utc>,
}

/// The slice of a single lot consumed by a disposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotMatch {
    pub amount: Decimal,
    pub unit_cost_usd: Decimal,
    pub acquired_at: DateTime<Utc>,
    pub disposed_at: DateTime<Utc>,
    pub gain_usd: Decimal,
}

impl LotMatch {
    pub fn holding_period(&self) -> TimeDelta {
        self.disposed_at - self.acquired_at
    }
}

/// Outcome of matching one disposal event against the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposal {
    pub disposed_at: DateTime<Utc>,
    pub amount: Decimal,
    pub unit_price_usd: Decimal,
    pub matches: Vec<LotMatch>,
    /// Portion of `amount` left over once every lot was consumed.
    pub unmatched_amount: Decimal,
}

impl Disposal {
    pub fn realized_pnl(&self) -> Result<Decimal, PnlError> {
        self.matches.iter().try_fold(Decimal::ZERO, |acc, lot_match| {
            acc.checked_add(lot_match.gain_usd)
                .ok_or(PnlError::ArithmeticOverflow)
        })
    }
}

/// FIFO queue of open lots for a single token.
///
/// Acquisitions append to the back, disposals consume from the front, and
/// a lot is evicted as soon as its remaining amount reaches zero. The queue
/// is never reordered.
#[derive(Debug, Default)]
pub struct LotLedger {
    lots: VecDeque<Lot>,
}

impl LotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, amount: Decimal, unit_cost_usd: Decimal, acquired_at: DateTime<Utc>) {
        if amount <= Decimal::ZERO {
            return;
        }

        self.lots.push_back(Lot {
            amount,
            unit_cost_usd,
            acquired_at,
        });
    }

    /// Consumes lots oldest first until `amount` is covered or the ledger
    /// runs dry.
    ///
    /// Each consumed slice realizes `consumed * (unit_price_usd - unit_cost)`.
    /// Whatever cannot be matched is reported as `unmatched_amount` and
    /// otherwise ignored.
    pub fn dispose(
        &mut self,
        amount: Decimal,
        unit_price_usd: Decimal,
        disposed_at: DateTime<Utc>,
    ) -> Result<Disposal, PnlError> {
        let mut matches = Vec::new();

        let unmatched_amount =
            self.lots
                .iter_mut()
                .try_fold(amount, |remaining, lot| {
                    if remaining <= Decimal::ZERO {
                        return Ok(remaining);
                    }

                    let consumed = remaining.min(lot.amount);

                    let gain_usd = unit_price_usd
                        .checked_sub(lot.unit_cost_usd)
                        .and_then(|spread| spread.checked_mul(consumed))
                        .ok_or(PnlError::ArithmeticOverflow)?;

                    lot.amount = lot
                        .amount
                        .checked_sub(consumed)
                        .ok_or(PnlError::ArithmeticOverflow)?;

                    matches.push(LotMatch {
                        amount: consumed,
                        unit_cost_usd: lot.unit_cost_usd,
                        acquired_at: lot.acquired_at,
                        disposed_at,
                        gain_usd,
                    });

                    remaining
                        .checked_sub(consumed)
                        .ok_or(PnlError::ArithmeticOverflow)
                })?;

        self.lots.retain(|lot| lot.amount > Decimal::ZERO);

        Ok(Disposal {
            disposed_at,
            amount,
            unit_price_usd,
            matches,
            unmatched_amount: unmatched_amount.max(Decimal::ZERO),
        })
    }

    /// Total amount still held across all open lots.
    pub fn holdings(&self) -> Result<Decimal, PnlError> {
        self.lots.iter().try_fold(Decimal::ZERO, |acc, lot| {
            acc.checked_add(lot.amount)
                .ok_or(PnlError::ArithmeticOverflow)
        })
    }

    /// Weighted-average unit cost of the open lots, or zero when empty.
    pub fn cost_basis(&self) -> Result<Decimal, PnlError> {
        let holdings = self.holdings()?;
        if holdings.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let open_cost = self.lots.iter().try_fold(Decimal::ZERO, |acc, lot| {
            lot.amount
                .checked_mul(lot.unit_cost_usd)
                .and_then(|cost| acc.checked_add(cost))
                .ok_or(PnlError::ArithmeticOverflow)
        })?;

        open_cost
            .checked_div(holdings)
            .ok_or(PnlError::ArithmeticOverflow)
    }

    pub fn lots(&self) -> impl Iterator<Item = &Lot> {
        self.lots.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }
}
