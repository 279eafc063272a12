use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "orca")]
#[command(version, about = "Daily stock portfolio valuation report")]
#[command(
    long_about = "Values your stock holdings against current market prices and delivers a gain/loss report by email, once or every day at a fixed time."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Config file (default: $ORCA_CONFIG or <config dir>/orca/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the report once and deliver it
    Report {
        #[command(flatten)]
        job: JobArgs,
    },

    /// Deliver the report every day at a fixed time
    Run {
        #[command(flatten)]
        job: JobArgs,

        /// Time of day as HH:MM (overrides schedule.at)
        #[arg(long, value_name = "HH:MM")]
        at: Option<String>,

        /// Interpret the time of day in UTC instead of local time
        #[arg(long)]
        utc: bool,

        /// Also deliver one report immediately on startup
        #[arg(long)]
        now: bool,
    },
}

#[derive(Args, Debug)]
pub struct JobArgs {
    /// Holdings CSV file (symbol,price,shares,is_foreign_market)
    pub holdings: PathBuf,

    /// Print the report instead of emailing it
    #[arg(long)]
    pub stdout: bool,

    /// Read quotes from a JSON file instead of the quote service
    #[arg(long, value_name = "FILE")]
    pub quotes: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_report_with_flags() {
        let cli = Cli::try_parse_from([
            "orca",
            "--no-color",
            "report",
            "holdings.csv",
            "--stdout",
            "--quotes",
            "quotes.json",
        ])
        .expect("parse failed");

        assert!(cli.no_color);
        match cli.command {
            Commands::Report { job } => {
                assert_eq!(job.holdings, PathBuf::from("holdings.csv"));
                assert!(job.stdout);
                assert_eq!(job.quotes, Some(PathBuf::from("quotes.json")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parse_run_schedule() {
        let cli = Cli::try_parse_from(["orca", "run", "h.csv", "--at", "07:45", "--utc"])
            .expect("parse failed");
        match cli.command {
            Commands::Run { job, at, utc, now } => {
                assert_eq!(at.as_deref(), Some("07:45"));
                assert!(utc);
                assert!(!now);
                assert!(!job.stdout);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn missing_holdings_is_usage_error() {
        assert!(Cli::try_parse_from(["orca", "report"]).is_err());
    }
}
