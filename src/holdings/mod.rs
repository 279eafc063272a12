// Holdings module - per-symbol positions built from the holdings file

pub mod loader;

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub use loader::{load_holdings_file, load_holdings_reader, load_holdings_rows};

/// Market a symbol trades on, which also selects its currency bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Market {
    Domestic,
    Foreign,
}

impl Market {
    pub fn from_foreign_flag(is_foreign: bool) -> Self {
        if is_foreign {
            Market::Foreign
        } else {
            Market::Domestic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Domestic => "Domestic",
            Market::Foreign => "Foreign",
        }
    }
}

/// One purchase of a symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lot {
    pub price: Decimal,
    pub shares: u64,
}

impl Lot {
    pub fn cost(&self) -> Decimal {
        self.price * Decimal::from(self.shares)
    }
}

/// All lots held in one symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holding {
    pub symbol: String,
    pub market: Market,
    pub lots: Vec<Lot>,
}

impl Holding {
    pub fn shares(&self) -> u64 {
        self.lots.iter().map(|lot| lot.shares).sum()
    }

    /// Sum of price * shares over every lot
    pub fn invested(&self) -> Decimal {
        self.lots.iter().map(Lot::cost).sum()
    }

    /// Symbol as sent to the quote source. Foreign symbols carry the
    /// exchange suffix (e.g. `PTT` -> `PTT.BK`).
    pub fn fetch_key(&self, foreign_suffix: &str) -> String {
        match self.market {
            Market::Domestic => self.symbol.clone(),
            Market::Foreign => format!("{}{}", self.symbol, foreign_suffix),
        }
    }
}

/// Holdings keyed by symbol, iterated in symbol order.
///
/// Built once by the loader and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HoldingsTable {
    holdings: BTreeMap<String, Holding>,
}

impl HoldingsTable {
    pub fn get(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.get(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Holding> {
        self.holdings.values()
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.holdings.keys().map(String::as_str)
    }

    pub(crate) fn entry(&mut self, symbol: String, market: Market) -> &mut Holding {
        self.holdings
            .entry(symbol.clone())
            .or_insert_with(|| Holding {
                symbol,
                market,
                lots: Vec::new(),
            })
    }
}
