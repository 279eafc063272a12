//! Plain-text rendering of a valuation report
//!
//! The output goes into an email body, so it sticks to fixed-width columns
//! and avoids colors or box drawing.

use super::portfolio::{CurrencySummary, ValuationReport};
use crate::utils::{format_currency, format_decimal};

const SYMBOL_WIDTH: usize = 10;
const PRICE_WIDTH: usize = 15;
const PLACEHOLDER: &str = "N/A";

fn rule() -> String {
    "-".repeat(29)
}

fn columns(symbol: &str, price: &str) -> String {
    format!(
        "{:<sw$} {:<pw$}",
        symbol,
        price,
        sw = SYMBOL_WIDTH,
        pw = PRICE_WIDTH
    )
    .trim_end()
    .to_string()
}

fn summary_block(summary: &CurrencySummary) -> Vec<String> {
    let symbol = summary.currency.symbol.as_str();
    vec![
        format!("{} ({})", summary.market.as_str(), summary.currency.code),
        format!(
            "Total amount invested: {}",
            format_currency(summary.totals.invested, symbol)
        ),
        format!(
            "Current amount: {}",
            format_currency(summary.totals.current, symbol)
        ),
        format!("Gain/Loss = {}", format_currency(summary.totals.gain(), symbol)),
    ]
}

/// Render the report as it is sent to the user
pub fn render_report(report: &ValuationReport) -> String {
    let mut lines = vec![
        format!("Stocks Update {}", report.date.format("%a %b %d %Y")),
        rule(),
        columns("Symbol", "Market Price"),
    ];

    for row in &report.rows {
        let price = row
            .price
            .map(format_decimal)
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        lines.push(columns(&row.symbol, &price));
    }

    lines.push(rule());

    for (idx, summary) in report.summaries.iter().enumerate() {
        if idx > 0 {
            lines.push(String::new());
        }
        lines.extend(summary_block(summary));
    }

    let mut output = lines.join("\n");
    output.push('\n');
    output
}
