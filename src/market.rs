//! Current prices and balances supplied from outside the engine.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

use crate::token::TokenKey;

/// Source of current valuation inputs for each token.
pub trait MarketData {
    /// Current USD unit price. Unknown tokens are priced at zero.
    fn current_price_usd(&self, token: &TokenKey) -> Decimal;

    /// Latest known on-chain balance, if the balance provider has one.
    fn balance(&self, token: &TokenKey) -> Option<Decimal>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(flatten)]
    pub token: TokenKey,
    #[serde(default)]
    pub price_usd: Decimal,
    #[serde(default)]
    pub balance: Option<Decimal>,
}

/// In-memory [`MarketData`] captured at a single point in time.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    quotes: HashMap<TokenKey, Quote>,
}

impl MarketSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a quote, replacing any earlier quote for the same token.
    pub fn insert(&mut self, quote: Quote) {
        self.quotes.insert(quote.token.clone(), quote);
    }

    #[must_use]
    pub fn with_price(mut self, token: &TokenKey, price_usd: Decimal) -> Self {
        self.quote_mut(token).price_usd = price_usd;
        self
    }

    #[must_use]
    pub fn with_balance(mut self, token: &TokenKey, balance: Decimal) -> Self {
        self.quote_mut(token).balance = Some(balance);
        self
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    fn quote_mut(&mut self, token: &TokenKey) -> &mut Quote {
        self.quotes.entry(token.clone()).or_insert_with(|| Quote {
            token: token.clone(),
            price_usd: Decimal::ZERO,
            balance: None,
        })
    }
}

impl FromIterator<Quote> for MarketSnapshot {
    fn from_iter<I: IntoIterator<Item = Quote>>(quotes: I) -> Self {
        quotes
            .into_iter()
            .fold(Self::new(), |mut snapshot, quote| {
                snapshot.insert(quote);
                snapshot
            })
    }
}

impl MarketData for MarketSnapshot {
    fn current_price_usd(&self, token: &TokenKey) -> Decimal {
        self.quotes
            .get(token)
            .map_or(Decimal::ZERO, |quote| quote.price_usd)
    }

    fn balance(&self, token: &TokenKey) -> Option<Decimal> {
        self.quotes.get(token).and_then(|quote| quote.balance)
    }
}
