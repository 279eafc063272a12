use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::holdings::{HoldingsTable, Market};
use crate::pricing::{strip_market_suffix, Quote, QuoteSource};

/// Display settings of one currency bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub symbol: String,
}

impl Currency {
    pub fn new(code: &str, symbol: &str) -> Self {
        Self {
            code: code.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

/// How holdings map to fetch keys and currency buckets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    /// Appended to foreign symbols when fetching (e.g. `.BK`)
    pub foreign_suffix: String,
    pub domestic: Currency,
    pub foreign: Currency,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            foreign_suffix: ".BK".to_string(),
            domestic: Currency::new("USD", "$"),
            foreign: Currency::new("THB", "฿"),
        }
    }
}

impl ReportSettings {
    pub fn currency(&self, market: Market) -> &Currency {
        match market {
            Market::Domestic => &self.domestic,
            Market::Foreign => &self.foreign,
        }
    }
}

/// Invested vs current value of one currency bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CurrencyTotals {
    pub invested: Decimal,
    pub current: Decimal,
}

impl CurrencyTotals {
    pub fn gain(&self) -> Decimal {
        self.current - self.invested
    }
}

/// One line of the price table; `price` is `None` when the source had no quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRow {
    pub symbol: String,
    pub market: Market,
    pub price: Option<Decimal>,
}

/// Totals block for a bucket with a non-zero invested amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencySummary {
    pub market: Market,
    pub currency: Currency,
    pub totals: CurrencyTotals,
}

/// Result of one valuation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValuationReport {
    pub date: NaiveDate,
    pub rows: Vec<PriceRow>,
    pub summaries: Vec<CurrencySummary>,
}

impl ValuationReport {
    pub fn summary(&self, market: Market) -> Option<&CurrencySummary> {
        self.summaries.iter().find(|s| s.market == market)
    }

    /// Symbols rendered with a placeholder price
    pub fn missing_symbols(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|row| row.price.is_none())
            .map(|row| row.symbol.as_str())
            .collect()
    }
}

/// Distinct, sorted keys to request from the quote source
pub fn fetch_keys(holdings: &HoldingsTable, settings: &ReportSettings) -> BTreeSet<String> {
    holdings
        .iter()
        .map(|h| h.fetch_key(&settings.foreign_suffix))
        .collect()
}

/// Fetch all quotes in one batch and value the holdings against them
pub async fn build_report(
    holdings: &HoldingsTable,
    source: &dyn QuoteSource,
    settings: &ReportSettings,
    date: NaiveDate,
) -> Result<ValuationReport, FetchError> {
    let keys = fetch_keys(holdings, settings);
    info!("Valuing {} holdings", holdings.len());

    let quotes = source.fetch(&keys).await?;
    value_holdings(holdings, &quotes, settings, date)
}

/// Fold every lot against the quotes into per-currency totals.
///
/// Holdings without a quote keep a placeholder row and are left out of the
/// totals. Buckets with nothing invested are dropped. Invested totals are
/// bounded at load; a quote whose current value overflows is an error.
pub fn value_holdings(
    holdings: &HoldingsTable,
    quotes: &[Quote],
    settings: &ReportSettings,
    date: NaiveDate,
) -> Result<ValuationReport, FetchError> {
    let prices = match_quotes(holdings, quotes, settings);

    let mut domestic = CurrencyTotals::default();
    let mut foreign = CurrencyTotals::default();
    let mut rows = Vec::with_capacity(holdings.len());

    for holding in holdings.iter() {
        let price = prices.get(holding.symbol.as_str()).copied();

        match price {
            Some(price) => {
                let totals = match holding.market {
                    Market::Domestic => &mut domestic,
                    Market::Foreign => &mut foreign,
                };
                let overflow = || FetchError::Overflow {
                    symbol: holding.symbol.clone(),
                    price,
                };
                for lot in &holding.lots {
                    let shares = Decimal::from(lot.shares);
                    totals.invested += lot.cost();
                    totals.current = price
                        .checked_mul(shares)
                        .and_then(|value| totals.current.checked_add(value))
                        .ok_or_else(overflow)?;
                }
                debug!("{}: {} shares @ {}", holding.symbol, holding.shares(), price);
            }
            None => warn!(
                "No quote for {} ({}); excluded from totals",
                holding.symbol,
                holding.fetch_key(&settings.foreign_suffix)
            ),
        }

        rows.push(PriceRow {
            symbol: holding.symbol.clone(),
            market: holding.market,
            price,
        });
    }

    let summaries = [(Market::Domestic, domestic), (Market::Foreign, foreign)]
        .into_iter()
        .filter(|(_, totals)| !totals.invested.is_zero())
        .map(|(market, totals)| CurrencySummary {
            market,
            currency: settings.currency(market).clone(),
            totals,
        })
        .collect();

    Ok(ValuationReport {
        date,
        rows,
        summaries,
    })
}

/// Map each returned quote back to the holding it was requested for.
///
/// Quotes are matched on the exact fetch key first. A symbol that matches no
/// key falls back to stripping the foreign suffix, which only ever resolves
/// to a foreign holding.
fn match_quotes<'a>(
    holdings: &'a HoldingsTable,
    quotes: &[Quote],
    settings: &ReportSettings,
) -> HashMap<&'a str, Decimal> {
    let by_key: HashMap<String, &str> = holdings
        .iter()
        .map(|h| {
            (
                h.fetch_key(&settings.foreign_suffix).to_uppercase(),
                h.symbol.as_str(),
            )
        })
        .collect();

    let mut prices = HashMap::new();
    for quote in quotes {
        let key = quote.symbol.trim().to_uppercase();
        let symbol = by_key.get(&key).copied().or_else(|| {
            let stripped = strip_market_suffix(&key, &settings.foreign_suffix);
            holdings
                .get(&stripped)
                .filter(|h| h.market == Market::Foreign)
                .map(|h| h.symbol.as_str())
        });

        match symbol {
            Some(symbol) => {
                prices.insert(symbol, quote.price);
            }
            None => debug!("Ignoring quote for unrequested key {}", quote.symbol),
        }
    }
    prices
}
