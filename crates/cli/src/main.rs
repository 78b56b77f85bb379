use clap::{Parser, Subcommand};

mod commands;

use commands::ScanArgs;

#[derive(Parser)]
#[command(name = "edge-scan")]
#[command(
    about = "Cross-venue prediction market scanner for Kalshi and Polymarket",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan both venues once and print detected opportunities as JSON
    Scan(ScanArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan(args) => commands::run_scan(args).await?,
    }

    Ok(())
}
