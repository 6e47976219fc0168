//! Multi-chain portfolio accounting.
//!
//! Token acquisition and disposal events are normalized, replayed through a
//! FIFO lot ledger per `(chain, address)` and valued against current market
//! prices. One replay per token yields realized and unrealized P&L, a
//! portfolio summary, and a short/long-term capital-gains split.

pub mod config;
mod event;
mod ledger;
mod market;
mod normalize;
mod pnl;
mod portfolio;
pub mod reporter;
mod tax;
mod token;

#[cfg(test)]
mod test_utils;

pub use config::setup_tracing;
pub use event::{
    Direction, Event, InvalidDirectionError, RawTransfer, TransferConversionError, TransferKind,
};
pub use ledger::{Disposal, Lot, LotLedger, LotMatch, PnlError};
pub use market::{MarketData, MarketSnapshot, Quote};
pub use normalize::{group_by_token, normalize};
pub use pnl::{Replay, TokenPnl, calculate_token_pnl};
pub use portfolio::{PortfolioReport, PortfolioSummary};
pub use tax::{HoldingTerm, TaxLotReport, TaxLotResult, TokenTaxLots, classify_tax_lots};
pub use token::{Chain, TokenAddress, TokenKey};
