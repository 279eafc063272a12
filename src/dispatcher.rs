//! Command dispatcher that wires the loaded holdings, a quote source and a
//! delivery channel together for each CLI command.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use colored::Colorize;
use tracing::info;

use crate::cli::{Cli, Commands, JobArgs};
use crate::config::{parse_time_of_day, Config};
use crate::delivery::{Delivery, MailgunDelivery, StdoutDelivery};
use crate::holdings::{load_holdings_file, HoldingsTable};
use crate::pricing::{FileQuoteSource, QuoteSource, YahooQuoteSource};
use crate::reports::{build_report, render_report, ReportSettings, ValuationReport};
use crate::scheduler::{run_daily, DailySchedule};

/// Everything one tick needs. Holdings are loaded once and only read.
pub struct ReportJob {
    holdings: HoldingsTable,
    settings: ReportSettings,
    source: Box<dyn QuoteSource>,
    delivery: Box<dyn Delivery>,
}

impl ReportJob {
    pub fn new(
        holdings: HoldingsTable,
        settings: ReportSettings,
        source: Box<dyn QuoteSource>,
        delivery: Box<dyn Delivery>,
    ) -> Self {
        Self {
            holdings,
            settings,
            source,
            delivery,
        }
    }

    /// Fetch, value, render and deliver one report.
    ///
    /// Any fetch or delivery failure aborts the run; nothing partial is sent.
    pub async fn run_once(&self, today: NaiveDate) -> Result<ValuationReport> {
        let report = build_report(&self.holdings, self.source.as_ref(), &self.settings, today)
            .await
            .context("Failed to fetch quotes")?;

        let text = render_report(&report);
        self.delivery
            .deliver(&text)
            .await
            .with_context(|| format!("Failed to deliver report to {}", self.delivery.describe()))?;

        info!("Report delivered to {}", self.delivery.describe());
        Ok(report)
    }
}

/// Route a parsed command to its handler
pub async fn dispatch_command(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Report { job } => {
            let quiet = job.stdout;
            let report_job = prepare_job(&job, &config)?;
            let today = if config.schedule.utc {
                Utc::now().date_naive()
            } else {
                Local::now().date_naive()
            };
            let report = report_job.run_once(today).await?;
            if !quiet {
                print_status(&report, &report_job.delivery.describe());
            }
            Ok(())
        }

        Commands::Run { job, at, utc, now } => {
            let at_text = at.unwrap_or_else(|| config.schedule.at.clone());
            let schedule = DailySchedule {
                at: parse_time_of_day(&at_text)?,
                utc: utc || config.schedule.utc,
            };
            let quiet = job.stdout;
            let report_job = prepare_job(&job, &config)?;

            println!(
                "{} Sending daily report at {}{}",
                "⏰".cyan(),
                at_text,
                if schedule.utc { " UTC" } else { "" }
            );

            let job_ref = &report_job;
            let tick = move || async move {
                let today = if schedule.utc {
                    Utc::now().date_naive()
                } else {
                    Local::now().date_naive()
                };
                let report = job_ref.run_once(today).await?;
                if !quiet {
                    print_status(&report, &job_ref.delivery.describe());
                }
                Ok::<(), anyhow::Error>(())
            };

            if now {
                // Startup run follows the same rules as a scheduled tick
                if let Err(e) = tick().await {
                    tracing::error!("Initial report failed: {:#}", e);
                }
            }

            run_daily(schedule, tick).await
        }
    }
}

/// Load holdings and build the source/delivery pair for a job.
/// Holdings errors are fatal here, before any tick runs.
fn prepare_job(args: &JobArgs, config: &Config) -> Result<ReportJob> {
    let holdings = load_holdings_file(&args.holdings)
        .with_context(|| format!("Failed to load holdings from {}", args.holdings.display()))?;

    let source: Box<dyn QuoteSource> = match &args.quotes {
        Some(path) => Box::new(FileQuoteSource::new(path)),
        None => Box::new(YahooQuoteSource::new(
            &config.quotes.url,
            config.http_timeout(),
        )?),
    };

    let delivery: Box<dyn Delivery> = if args.stdout {
        Box::new(StdoutDelivery)
    } else {
        Box::new(MailgunDelivery::new(&config.mailgun, config.http_timeout())?)
    };

    Ok(ReportJob::new(
        holdings,
        config.report_settings(),
        source,
        delivery,
    ))
}

fn print_status(report: &ValuationReport, recipient: &str) {
    println!(
        "{} Report for {} holdings sent to {}",
        "✓".green().bold(),
        report.rows.len(),
        recipient
    );
    for symbol in report.missing_symbols() {
        println!("  {} No quote for {}", "⚠".yellow(), symbol);
    }
}
