//! One-shot cross-venue scan.
//!
//! Loads configuration, fetches both venues, runs the matching pipeline and
//! prints the detected opportunities as a JSON array on stdout.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use edge_scan_arbitrage_cross::{
    build_matcher, to_records, OpportunityRecord, PipelineConfig, ScanPipeline,
};
use edge_scan_core::{AppConfig, ConfigLoader, MatcherProvider, VenueFeed};
use edge_scan_kalshi::{KalshiClient, KalshiClientConfig};
use edge_scan_polymarket::{GammaClient, GammaClientConfig};
use tracing::{error, info};

/// Arguments for the scan command.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,

    /// Minimum edge in basis points for an opportunity to be reported.
    #[arg(long)]
    pub min_edge_bps: Option<f64>,

    /// Maximum distance between resolution times, in hours.
    #[arg(long)]
    pub max_resolution_delta_hours: Option<i64>,

    /// Semantic matcher backend (noop, openai, anthropic).
    #[arg(long)]
    pub matcher: Option<MatcherProvider>,

    /// Kalshi API token.
    #[arg(long, env = "KALSHI_API_KEY", hide_env_values = true)]
    pub kalshi_api_key: Option<String>,

    /// Polymarket API token.
    #[arg(long, env = "POLYMARKET_API_KEY", hide_env_values = true)]
    pub polymarket_api_key: Option<String>,

    /// API key for the LLM matcher.
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
}

impl ScanArgs {
    /// Applies command-line overrides on top of file and environment config.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(min) = self.min_edge_bps {
            config.thresholds.min_edge_bps = min;
        }
        if let Some(hours) = self.max_resolution_delta_hours {
            config.thresholds.max_resolution_delta_secs = hours.saturating_mul(3600);
        }
        if let Some(provider) = self.matcher {
            config.matcher.provider = provider;
        }
        if let Some(key) = &self.kalshi_api_key {
            config.kalshi.api_key = Some(key.clone());
        }
        if let Some(key) = &self.polymarket_api_key {
            config.polymarket.api_key = Some(key.clone());
        }
        if let Some(key) = &self.llm_api_key {
            config.matcher.api_key = Some(key.clone());
        }
    }
}

/// Runs the scan command.
///
/// # Errors
/// Returns an error on invalid configuration or any fatal pipeline failure.
pub async fn run_scan(args: ScanArgs) -> Result<()> {
    let mut config = ConfigLoader::load(&args.config)?;
    args.apply(&mut config);
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {e}"))?;

    info!(
        config = %args.config,
        min_edge_bps = config.thresholds.min_edge_bps,
        max_resolution_delta_secs = config.thresholds.max_resolution_delta_secs,
        matcher = ?config.matcher.provider,
        "Starting scan"
    );

    let retry = config.retry.policy();
    let kalshi = KalshiClient::new(KalshiClientConfig::from_venue(&config.kalshi, retry))?;
    let polymarket = GammaClient::new(GammaClientConfig::from_venue(&config.polymarket, retry))?;
    let matcher = build_matcher(&config.matcher).context("Failed to build semantic matcher")?;

    let pipeline = ScanPipeline::new(
        PipelineConfig::from(&config.thresholds),
        VenueFeed::live(kalshi),
        VenueFeed::live(polymarket),
        matcher,
    );

    let report = match pipeline.run().await {
        Ok(report) => report,
        Err(err) => {
            if err.is_configuration() {
                error!(error = %err, "Scan aborted: configuration problem");
            } else if err.is_transient() {
                error!(error = %err, "Scan aborted: venue unavailable after retries");
            } else {
                error!(error = %err, "Scan aborted");
            }
            return Err(err.into());
        }
    };

    let records = to_records(&report.opportunities);
    println!("{}", render(&records, args.pretty)?);

    Ok(())
}

/// Serializes output records as a JSON array.
fn render(records: &[OpportunityRecord], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };
    Ok(json)
}
