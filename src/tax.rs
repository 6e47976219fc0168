//! Capital-gains classification of realized gains by holding period.
//!
//! A matched unit is long-term once it has been held for at least 365 days,
//! counted as exactly `365 * 24h` rather than calendar years. Anything held
//! for less is short-term.

use chrono::TimeDelta;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::event::Event;
use crate::ledger::{Disposal, PnlError};
use crate::normalize::group_by_token;
use crate::pnl::Replay;
use crate::token::{Chain, TokenKey};

const LONG_TERM_HOLDING_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldingTerm {
    ShortTerm,
    LongTerm,
}

impl HoldingTerm {
    pub fn classify(holding_period: TimeDelta) -> Self {
        if holding_period >= TimeDelta::days(LONG_TERM_HOLDING_DAYS) {
            Self::LongTerm
        } else {
            Self::ShortTerm
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxLotResult {
    pub short_term_gains_usd: Decimal,
    pub long_term_gains_usd: Decimal,
    pub total_capital_gains_usd: Decimal,
    /// Disposal events processed, not individual lot matches.
    pub realized_event_count: usize,
}

impl TaxLotResult {
    pub fn from_disposals(disposals: &[Disposal]) -> Result<Self, PnlError> {
        let (short_term_gains_usd, long_term_gains_usd) = disposals
            .iter()
            .flat_map(|disposal| &disposal.matches)
            .try_fold(
                (Decimal::ZERO, Decimal::ZERO),
                |(short_term, long_term), lot_match| {
                    let buckets = match HoldingTerm::classify(lot_match.holding_period()) {
                        HoldingTerm::ShortTerm => short_term
                            .checked_add(lot_match.gain_usd)
                            .map(|short_term| (short_term, long_term)),
                        HoldingTerm::LongTerm => long_term
                            .checked_add(lot_match.gain_usd)
                            .map(|long_term| (short_term, long_term)),
                    };

                    buckets.ok_or(PnlError::ArithmeticOverflow)
                },
            )?;

        Self::new(short_term_gains_usd, long_term_gains_usd, disposals.len())
    }

    fn new(
        short_term_gains_usd: Decimal,
        long_term_gains_usd: Decimal,
        realized_event_count: usize,
    ) -> Result<Self, PnlError> {
        let total_capital_gains_usd = short_term_gains_usd
            .checked_add(long_term_gains_usd)
            .ok_or(PnlError::ArithmeticOverflow)?;

        Ok(Self {
            short_term_gains_usd,
            long_term_gains_usd,
            total_capital_gains_usd,
            realized_event_count,
        })
    }

    fn merge(&self, other: &Self) -> Result<Self, PnlError> {
        let short_term = self
            .short_term_gains_usd
            .checked_add(other.short_term_gains_usd)
            .ok_or(PnlError::ArithmeticOverflow)?;

        let long_term = self
            .long_term_gains_usd
            .checked_add(other.long_term_gains_usd)
            .ok_or(PnlError::ArithmeticOverflow)?;

        Self::new(
            short_term,
            long_term,
            self.realized_event_count + other.realized_event_count,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTaxLots {
    pub token: TokenKey,
    #[serde(flatten)]
    pub result: TaxLotResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxLotReport {
    pub total: TaxLotResult,
    pub by_chain: BTreeMap<Chain, TaxLotResult>,
    pub by_token: Vec<TokenTaxLots>,
}

impl TaxLotReport {
    pub fn from_token_results(
        results: impl IntoIterator<Item = (TokenKey, TaxLotResult)>,
    ) -> Result<Self, PnlError> {
        results
            .into_iter()
            .try_fold(Self::default(), |mut report, (token, result)| {
                report.total = report.total.merge(&result)?;

                let chain_total = report.by_chain.entry(token.chain.clone()).or_default();
                *chain_total = chain_total.merge(&result)?;

                report.by_token.push(TokenTaxLots { token, result });
                Ok(report)
            })
    }
}

/// Classifies realized gains for a mixed event stream, replaying each
/// token on its own ledger.
///
/// A token whose gains overflow is logged and left out of the report.
pub fn classify_tax_lots(events: Vec<Event>) -> Result<TaxLotReport, PnlError> {
    let results = group_by_token(events)
        .into_iter()
        .filter_map(|(token, events)| {
            let result = Replay::run(token.clone(), &events)
                .and_then(|replay| TaxLotResult::from_disposals(&replay.disposals));

            match result {
                Ok(result) => Some((token, result)),
                Err(error) => {
                    warn!(
                        token = %token,
                        %error,
                        "Skipping token whose gains could not be classified"
                    );
                    None
                }
            }
        });

    TaxLotReport::from_token_results(results)
}
