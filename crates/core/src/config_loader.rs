use crate::config::AppConfig;
use anyhow::{anyhow, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

/// Environment prefix for overrides, e.g. `EDGE_SCAN_KALSHI__API_KEY`.
pub const ENV_PREFIX: &str = "EDGE_SCAN_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by layering defaults, a TOML file and environment variables.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<AppConfig> {
        Self::extract(Self::figment(path.as_ref()))
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn extract(figment: Figment) -> Result<AppConfig> {
        let config: AppConfig = figment.extract()?;
        config.validate().map_err(|e| anyhow!("invalid configuration: {e}"))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatcherProvider;

    #[test]
    fn test_missing_file_yields_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = ConfigLoader::load("does/not/exist.toml").expect("defaults");
            assert_eq!(config.thresholds.min_edge_bps, 50.0);
            assert!(config.kalshi.api_key.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_toml_and_env_layering() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "Config.toml",
                r#"
                [thresholds]
                min_edge_bps = 120.0
                max_resolution_delta_secs = 3600

                [matcher]
                provider = "anthropic"
                model = "claude-sonnet-4-5"
                "#,
            )?;
            jail.set_env("EDGE_SCAN_KALSHI__API_KEY", "kalshi-token");
            jail.set_env("EDGE_SCAN_THRESHOLDS__MIN_EDGE_BPS", "75");

            let config = ConfigLoader::load("Config.toml").expect("config");
            assert_eq!(config.thresholds.min_edge_bps, 75.0);
            assert_eq!(config.thresholds.max_resolution_delta_secs, 3600);
            assert_eq!(config.kalshi.api_key.as_deref(), Some("kalshi-token"));
            assert_eq!(config.matcher.provider, MatcherProvider::Anthropic);
            assert_eq!(config.matcher.max_candidates_per_batch, 20);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "Config.toml",
                r#"
                [retry]
                max_attempts = 0
                backoff_unit_ms = 10
                "#,
            )?;
            let err = ConfigLoader::load("Config.toml").unwrap_err();
            assert!(err.to_string().contains("retry.max_attempts"));
            Ok(())
        });
    }
}
