use anyhow::Result;
use clap::Parser;
use orca::cli::Cli;
use orca::dispatcher;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, so --stdout output stays clean)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("orca=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Usage errors exit with 1 like every other fatal error; help/version exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    if cli.no_color {
        colored::control::set_override(false);
    }

    dispatcher::dispatch_command(cli).await
}
