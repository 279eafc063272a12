//! Orca - daily stock portfolio valuation report
//!
//! This library loads per-lot stock holdings, values them against a batch of
//! current quotes, and renders a per-currency gain/loss report that the
//! binary delivers by email on a daily schedule.

pub mod cli;
pub mod config;
pub mod delivery;
pub mod dispatcher;
pub mod error;
pub mod holdings;
pub mod pricing;
pub mod reports;
pub mod scheduler;
pub mod utils;
