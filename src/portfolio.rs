use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::event::Event;
use crate::ledger::PnlError;
use crate::market::MarketData;
use crate::normalize::group_by_token;
use crate::pnl::{Replay, TokenPnl, percentage_change};
use crate::tax::{TaxLotReport, TaxLotResult};
use crate::token::{Chain, TokenKey};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub realized_pnl_usd: Decimal,
    pub unrealized_pnl_usd: Decimal,
    pub total_pnl_usd: Decimal,
    pub current_value_usd: Decimal,
    pub total_invested_usd: Decimal,
    pub percentage_change: Decimal,
    pub pnl_by_chain: BTreeMap<Chain, Decimal>,
}

impl PortfolioSummary {
    /// Sums per-token results into portfolio totals and a per-chain
    /// breakdown of total P&L.
    pub fn aggregate(tokens: &[TokenPnl]) -> Result<Self, PnlError> {
        let mut summary = tokens
            .iter()
            .try_fold(Self::default(), |mut summary, token| {
                summary.realized_pnl_usd =
                    checked_sum(summary.realized_pnl_usd, token.realized_pnl_usd)?;
                summary.unrealized_pnl_usd =
                    checked_sum(summary.unrealized_pnl_usd, token.unrealized_pnl_usd)?;
                summary.current_value_usd =
                    checked_sum(summary.current_value_usd, token.current_value_usd)?;
                summary.total_invested_usd =
                    checked_sum(summary.total_invested_usd, token.total_invested_usd)?;

                let chain_pnl = summary
                    .pnl_by_chain
                    .entry(token.token.chain.clone())
                    .or_default();
                *chain_pnl = checked_sum(*chain_pnl, token.total_pnl_usd)?;

                Ok::<_, PnlError>(summary)
            })?;

        summary.total_pnl_usd =
            checked_sum(summary.realized_pnl_usd, summary.unrealized_pnl_usd)?;
        summary.percentage_change =
            percentage_change(summary.total_pnl_usd, summary.total_invested_usd)?;

        Ok(summary)
    }
}

fn checked_sum(lhs: Decimal, rhs: Decimal) -> Result<Decimal, PnlError> {
    lhs.checked_add(rhs).ok_or(PnlError::ArithmeticOverflow)
}

/// Everything one accounting run produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioReport {
    pub tokens: Vec<TokenPnl>,
    pub summary: PortfolioSummary,
    pub tax: TaxLotReport,
    /// Tokens left out of every total because their own figures overflowed.
    pub skipped_tokens: Vec<TokenKey>,
}

impl PortfolioReport {
    /// Runs the full pipeline over a mixed event stream.
    ///
    /// Each token is replayed exactly once; its P&L and its tax-lot split
    /// are both derived from that replay. A token whose figures cannot be
    /// computed is logged and skipped so the rest of the portfolio still
    /// reports.
    pub fn compute(events: Vec<Event>, market: &impl MarketData) -> Result<Self, PnlError> {
        let mut tokens = Vec::new();
        let mut tax_lots = Vec::new();
        let mut skipped_tokens = Vec::new();

        for (token, events) in group_by_token(events) {
            match compute_token(&token, &events, market) {
                Ok((pnl, tax_lot)) => {
                    tokens.push(pnl);
                    tax_lots.push((token, tax_lot));
                }
                Err(error) => {
                    warn!(
                        token = %token,
                        %error,
                        "Skipping token whose P&L could not be computed"
                    );
                    skipped_tokens.push(token);
                }
            }
        }

        let summary = PortfolioSummary::aggregate(&tokens)?;
        let tax = TaxLotReport::from_token_results(tax_lots)?;

        info!(
            tokens = tokens.len(),
            skipped = skipped_tokens.len(),
            total_pnl_usd = %summary.total_pnl_usd,
            capital_gains_usd = %tax.total.total_capital_gains_usd,
            "Computed portfolio report"
        );

        Ok(Self {
            tokens,
            summary,
            tax,
            skipped_tokens,
        })
    }
}

fn compute_token(
    token: &TokenKey,
    events: &[Event],
    market: &impl MarketData,
) -> Result<(TokenPnl, TaxLotResult), PnlError> {
    let replay = Replay::run(token.clone(), events)?;

    let pnl = replay.token_pnl(market.current_price_usd(token), market.balance(token))?;
    let tax_lot = TaxLotResult::from_disposals(&replay.disposals)?;

    Ok((pnl, tax_lot))
}
