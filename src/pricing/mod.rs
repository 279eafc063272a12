// Pricing module - quote sources for the valuation engine

pub mod yahoo;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::FetchError;

pub use yahoo::YahooQuoteSource;

/// Latest price for one fetch key, as returned by a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub symbol: String,
    pub price: Decimal,
}

/// Batch quote lookup.
///
/// Called once per report with every fetch key. Sources may omit keys they
/// don't know; transport and decoding failures are errors.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch(&self, keys: &BTreeSet<String>) -> Result<Vec<Quote>, FetchError>;
}

/// Quotes read from a JSON object (`{"AAPL": "150.00", "PTT.BK": 34.5}`).
///
/// The file is re-read on every fetch so it can be edited between ticks.
pub struct FileQuoteSource {
    path: PathBuf,
}

impl FileQuoteSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_prices(&self) -> Result<HashMap<String, Decimal>, FetchError> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| FetchError::Malformed(format!("{}: {}", self.path.display(), e)))?;
        let prices: HashMap<String, Decimal> = serde_json::from_str(&text)
            .map_err(|e| FetchError::Malformed(format!("{}: {}", self.path.display(), e)))?;
        Ok(prices
            .into_iter()
            .map(|(symbol, price)| (symbol.to_uppercase(), price))
            .collect())
    }
}

#[async_trait]
impl QuoteSource for FileQuoteSource {
    async fn fetch(&self, keys: &BTreeSet<String>) -> Result<Vec<Quote>, FetchError> {
        info!("Reading {} quotes from {:?}", keys.len(), self.path);
        let prices = self.read_prices()?;

        let quotes: Vec<Quote> = keys
            .iter()
            .filter_map(|key| {
                prices.get(&key.to_uppercase()).map(|price| Quote {
                    symbol: key.clone(),
                    price: *price,
                })
            })
            .collect();

        debug!("Quote file had {}/{} requested keys", quotes.len(), keys.len());
        Ok(quotes)
    }
}

/// Reverse of `Holding::fetch_key`: drop the foreign suffix a source echoes
/// back so the quote matches its holding.
pub fn strip_market_suffix(symbol: &str, foreign_suffix: &str) -> String {
    let upper = symbol.trim().to_uppercase();
    let suffix = foreign_suffix.to_uppercase();
    if !suffix.is_empty() && upper.len() > suffix.len() && upper.ends_with(&suffix) {
        upper[..upper.len() - suffix.len()].to_string()
    } else {
        upper
    }
}
