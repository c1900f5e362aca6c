//! Configuration loading from environment.

use std::env;

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Insert demo cash desks and employees on startup
    pub seed_demo_data: bool,
    /// OTLP collector; span export is off when unset
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from a variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let seed_demo_data = match lookup("SEED_DEMO_DATA") {
            Some(value) => parse_flag(&value)?,
            None => false,
        };

        let otlp_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.trim().is_empty());

        Ok(Self {
            port,
            database_url,
            seed_demo_data,
            otlp_endpoint,
        })
    }
}

fn parse_flag(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("Invalid boolean value: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DATABASE_URL", "sqlite::memory:")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert!(!config.seed_demo_data);
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_database_url_required() {
        assert!(config_from(&[("PORT", "8080")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/cashdesk"),
            ("PORT", "8080"),
            ("SEED_DEMO_DATA", "TRUE"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://localhost:4317"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert!(config.seed_demo_data);
        assert_eq!(
            config.otlp_endpoint.as_deref(),
            Some("http://localhost:4317")
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("DATABASE_URL", "x"), ("PORT", "http")]).is_err());
        assert!(config_from(&[("DATABASE_URL", "x"), ("SEED_DEMO_DATA", "maybe")]).is_err());
    }
}
