use crate::application::poller::PollSettings;
use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub server: ServerSettings,
    pub api: ApiSettings,
    pub poll: PollConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Rows requested from `/stats/countries`.
    pub country_limit: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    pub interval_ms: u64,
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl PollConfig {
    pub fn settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.interval_ms),
            max_attempts: self.max_attempts,
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl DashboardConfig {
    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.poll.interval_ms > 0,
            "poll.interval_ms must be > 0, got {}",
            self.poll.interval_ms
        );
        anyhow::ensure!(
            self.poll.max_attempts != Some(0),
            "poll.max_attempts must be > 0 when set"
        );
        anyhow::ensure!(
            self.api.country_limit > 0,
            "api.country_limit must be > 0, got {}",
            self.api.country_limit
        );
        anyhow::ensure!(
            self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"),
            "api.base_url must be an http(s) URL, got {}",
            self.api.base_url
        );
        Ok(())
    }
}

fn builder_with_defaults() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder()
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("api.base_url", "http://localhost:8000/api/v1")?
        .set_default("api.timeout_ms", 30_000)?
        .set_default("api.country_limit", 6)?
        .set_default("poll.interval_ms", 5_000)?)
}

/// Defaults, then `config/dashboard.*` if present, then `DASHBOARD__*` env vars.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = builder_with_defaults()?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to read dashboard configuration")?;

    let config: DashboardConfig = settings
        .try_deserialize()
        .context("Invalid dashboard configuration")?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate a TOML document layered over the defaults.
#[cfg(test)]
pub fn load_dashboard_config_from_str(toml: &str) -> anyhow::Result<DashboardConfig> {
    let settings = builder_with_defaults()?
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = load_dashboard_config_from_str("").unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.api.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.api.country_limit, 6);
        assert_eq!(config.poll.settings(), PollSettings::default());
    }

    #[test]
    fn test_overrides() {
        let config = load_dashboard_config_from_str(
            r#"
            [api]
            base_url = "https://bi.internal/api/v1"
            country_limit = 10

            [poll]
            interval_ms = 2000
            max_attempts = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://bi.internal/api/v1");
        assert_eq!(config.api.country_limit, 10);
        assert_eq!(
            config.poll.settings(),
            PollSettings {
                interval: Duration::from_secs(2),
                max_attempts: Some(30),
            }
        );
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(load_dashboard_config_from_str("[poll]\ninterval_ms = 0").is_err());
        assert!(load_dashboard_config_from_str("[poll]\nmax_attempts = 0").is_err());
        assert!(load_dashboard_config_from_str("[api]\ncountry_limit = 0").is_err());
        assert!(load_dashboard_config_from_str("[api]\nbase_url = \"localhost:8000\"").is_err());
    }
}
