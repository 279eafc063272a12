use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{Quote, QuoteSource};
use crate::error::FetchError;

pub const DEFAULT_QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";

/// Yahoo Finance batch quote response
#[derive(Debug, Deserialize)]
struct YahooQuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    result: Option<Vec<QuoteResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct QuoteResult {
    symbol: String,
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

/// Quote source backed by the Yahoo Finance batch quote endpoint
pub struct YahooQuoteSource {
    client: Client,
    base_url: String,
}

impl YahooQuoteSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; OrcaBot/1.0)")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl QuoteSource for YahooQuoteSource {
    async fn fetch(&self, keys: &BTreeSet<String>) -> Result<Vec<Quote>, FetchError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let symbols = keys.iter().map(String::as_str).collect::<Vec<_>>().join(",");
        info!("Fetching {} quotes from Yahoo Finance: {}", keys.len(), symbols);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("symbols", symbols.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let quotes = decode_quote_response(&body)?;
        debug!("Yahoo Finance returned {}/{} quotes", quotes.len(), keys.len());
        Ok(quotes)
    }
}

/// Flatten a Yahoo `quoteResponse` envelope into quotes.
///
/// Results without a market price are dropped, so their holdings show up as
/// missing quotes rather than failing the whole batch.
pub fn decode_quote_response(body: &str) -> Result<Vec<Quote>, FetchError> {
    let data: YahooQuoteResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if let Some(error) = data.quote_response.error {
        return Err(FetchError::Api {
            code: error.code,
            description: error.description,
        });
    }

    let mut quotes = Vec::new();
    for result in data.quote_response.result.unwrap_or_default() {
        let Some(raw) = result.regular_market_price else {
            warn!("No market price for {}", result.symbol);
            continue;
        };

        let price = Decimal::from_f64(raw)
            .filter(|p| !p.is_sign_negative())
            .ok_or_else(|| {
                FetchError::Malformed(format!("invalid price {} for {}", raw, result.symbol))
            })?;

        quotes.push(Quote {
            symbol: result.symbol,
            price,
        });
    }

    Ok(quotes)
}
