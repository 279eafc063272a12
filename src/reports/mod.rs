// Reports module - portfolio valuation and its text rendering

pub mod portfolio;
pub mod text;

pub use portfolio::{
    build_report, fetch_keys, value_holdings, Currency, CurrencySummary, CurrencyTotals,
    PriceRow, ReportSettings, ValuationReport,
};
pub use text::render_report;
