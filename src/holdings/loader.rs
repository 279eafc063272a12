use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use super::{HoldingsTable, Lot, Market};
use crate::error::LoadError;

const FIELDS: [&str; 4] = ["symbol", "price", "shares", "is_foreign_market"];

/// Parse a holdings CSV file (`symbol,price,shares,is_foreign_market`)
pub fn load_holdings_file<P: AsRef<Path>>(file_path: P) -> Result<HoldingsTable, LoadError> {
    let path = file_path.as_ref();
    info!("Loading holdings from {:?}", path);

    let file = std::fs::File::open(path)
        .map_err(|e| LoadError::Unreadable(format!("{}: {}", path.display(), e)))?;
    load_holdings_reader(file)
}

/// Parse holdings CSV from any reader. The first row is a header.
pub fn load_holdings_reader<R: Read>(input: R) -> Result<HoldingsTable, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // short rows are reported as missing fields
        .trim(Trim::All)
        .from_reader(input);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| LoadError::Unreadable(e.to_string()))?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(rows.len() + 1);
        rows.push((line, record.iter().map(str::to_string).collect::<Vec<_>>()));
    }

    let mut builder = TableBuilder::default();
    for (line, fields) in rows.iter().skip(1) {
        builder.push(fields, *line)?;
    }
    builder.finish()
}

/// Build a table from already-split rows. The first row is a header and
/// line numbers in errors count from 1.
pub fn load_holdings_rows<I, R, S>(rows: I) -> Result<HoldingsTable, LoadError>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut builder = TableBuilder::default();
    for (idx, row) in rows.into_iter().enumerate().skip(1) {
        builder.push(row.as_ref(), idx + 1)?;
    }
    builder.finish()
}

#[derive(Default)]
struct TableBuilder {
    table: HoldingsTable,
    rows: usize,
    // Running invested total per market, so valuation sums can't overflow
    domestic: Decimal,
    foreign: Decimal,
}

impl TableBuilder {
    fn push<S: AsRef<str>>(&mut self, fields: &[S], line: usize) -> Result<(), LoadError> {
        let symbol = field(fields, 0, line)?.to_uppercase();
        if symbol.is_empty() {
            return Err(LoadError::EmptySymbol { line });
        }

        let price = parse_price(field(fields, 1, line)?, line)?;
        let shares = parse_shares(field(fields, 2, line)?, line)?;
        let market = Market::from_foreign_flag(parse_market_flag(field(fields, 3, line)?, line)?);

        let holding = self.table.entry(symbol.clone(), market);
        if holding.market != market {
            return Err(LoadError::ConflictingMarket { line, symbol });
        }

        let lot = Lot { price, shares };
        let total = match market {
            Market::Domestic => &mut self.domestic,
            Market::Foreign => &mut self.foreign,
        };
        *total = price
            .checked_mul(Decimal::from(shares))
            .and_then(|cost| total.checked_add(cost))
            .ok_or(LoadError::Overflow { line })?;
        holding.lots.push(lot);
        self.rows += 1;

        debug!("line {}: {} {} @ {} ({:?})", line, symbol, shares, price, market);
        Ok(())
    }

    fn finish(self) -> Result<HoldingsTable, LoadError> {
        if self.table.is_empty() {
            return Err(LoadError::Empty);
        }
        info!(
            "Loaded {} lots across {} holdings",
            self.rows,
            self.table.len()
        );
        Ok(self.table)
    }
}

/// Trimmed field at `idx`. Only the symbol may be blank; the caller reports it.
fn field<S: AsRef<str>>(fields: &[S], idx: usize, line: usize) -> Result<&str, LoadError> {
    fields
        .get(idx)
        .map(|f| f.as_ref().trim())
        .filter(|f| !f.is_empty() || idx == 0)
        .ok_or(LoadError::MissingField {
            line,
            field: FIELDS[idx],
        })
}

fn parse_price(text: &str, line: usize) -> Result<Decimal, LoadError> {
    let invalid = || LoadError::InvalidPrice {
        line,
        value: text.to_string(),
    };
    let price = Decimal::from_str(text).map_err(|_| invalid())?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(invalid());
    }
    Ok(price)
}

fn parse_shares(text: &str, line: usize) -> Result<u64, LoadError> {
    match text.parse::<u64>() {
        Ok(shares) if shares > 0 => Ok(shares),
        _ => Err(LoadError::InvalidShares {
            line,
            value: text.to_string(),
        }),
    }
}

/// Accepts the usual boolean literals: true/false, t/f, 1/0 (any case)
fn parse_market_flag(text: &str, line: usize) -> Result<bool, LoadError> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Ok(true),
        "false" | "f" | "0" => Ok(false),
        _ => Err(LoadError::InvalidMarketFlag {
            line,
            value: text.to_string(),
        }),
    }
}
