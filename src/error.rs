//! Error handling for Orca
//!
//! Defines the typed failure kinds of each stage (configuration, holdings
//! load, quote fetch, delivery). The binary wraps them in `anyhow` for
//! context chaining and error propagation.

use thiserror::Error;

/// Bad invocation or configuration; fatal before any report is produced
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid time of day '{0}' (expected HH:MM)")]
    InvalidTime(String),

    #[error("cannot read config file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    Invalid { path: String, message: String },

    #[error("mailgun delivery requires '{0}' (set it in the config file or environment)")]
    MissingMailgun(&'static str),
}

/// Holdings file rejected during the one-time startup load
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read holdings: {0}")]
    Unreadable(String),

    #[error("line {line}: missing field '{field}'")]
    MissingField { line: usize, field: &'static str },

    #[error("line {line}: empty symbol")]
    EmptySymbol { line: usize },

    #[error("line {line}: invalid price '{value}'")]
    InvalidPrice { line: usize, value: String },

    #[error("line {line}: invalid share count '{value}'")]
    InvalidShares { line: usize, value: String },

    #[error("line {line}: invalid market flag '{value}' (expected true or false)")]
    InvalidMarketFlag { line: usize, value: String },

    #[error("line {line}: {symbol} was first declared on a different market")]
    ConflictingMarket { line: usize, symbol: String },

    #[error("line {line}: invested amount is too large")]
    Overflow { line: usize },

    #[error("holdings file has no data rows")]
    Empty,
}

/// Quote source failure; aborts the current tick
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("quote request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("quote service returned status {0}")]
    Status(u16),

    #[error("quote service error: {code} - {description}")]
    Api { code: String, description: String },

    #[error("malformed quote response: {0}")]
    Malformed(String),

    #[error("quote {price} for {symbol} overflows the current value")]
    Overflow { symbol: String, price: rust_decimal::Decimal },
}

/// Report could not be handed off; the report is lost
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("delivery request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("delivery rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("cannot write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for command-level operations
pub type Result<T> = anyhow::Result<T>;
