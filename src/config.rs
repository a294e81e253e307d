use std::net::SocketAddr;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::Deserialize;

fn default_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

fn default_min_relationship_strength() -> f64 {
    0.5
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_addr")]
    pub addr: SocketAddr,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
    /// Relationships weaker than this (by absolute strength) are not reported.
    #[serde(default = "default_min_relationship_strength")]
    pub min_relationship_strength: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            max_file_size: default_max_file_size(),
            min_relationship_strength: default_min_relationship_strength(),
        }
    }
}

fn env_or<T, F>(key: &str, default: T, parse: F) -> Result<T>
where
    F: FnOnce(&str) -> Result<T>,
{
    match std::env::var(key) {
        Ok(raw) => parse(raw.trim()).with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let defaults = Config::default();
        let addr = env_or("PROFILER_ADDR", defaults.addr, |s| Ok(s.parse()?))?;
        let max_file_size = env_or("MAX_FILE_SIZE", defaults.max_file_size, |s| Ok(s.parse()?))?;
        let min_relationship_strength = env_or(
            "MIN_RELATIONSHIP_STRENGTH",
            defaults.min_relationship_strength,
            |s| Ok(s.parse::<f64>()?),
        )?;

        if !min_relationship_strength.is_finite() {
            anyhow::bail!("MIN_RELATIONSHIP_STRENGTH must be a finite number");
        }

        Ok(Config {
            addr,
            max_file_size,
            min_relationship_strength: min_relationship_strength.clamp(0.0, 1.0),
        })
    }
}

pub fn load_config() -> Result<Config> {
    let config = Config::from_env()?;
    tracing::info!(
        "Loaded configuration: addr={}, max_file_size={}B, min_relationship_strength={}",
        config.addr,
        config.max_file_size,
        config.min_relationship_strength
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.addr, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.min_relationship_strength, 0.5);
    }

    #[test]
    fn test_env_or_falls_back_when_unset() -> Result<()> {
        let value = env_or("SHEET_PROFILER_TEST_UNSET_KEY", 7usize, |s| Ok(s.parse()?))?;
        assert_eq!(value, 7);
        Ok(())
    }

    #[test]
    fn test_env_or_reports_bad_values() {
        std::env::set_var("SHEET_PROFILER_TEST_BAD_SIZE", "lots");
        let result = env_or("SHEET_PROFILER_TEST_BAD_SIZE", 0usize, |s| Ok(s.parse()?));
        let message = result.map_err(|e| e.to_string()).err().unwrap_or_default();
        assert!(message.contains("SHEET_PROFILER_TEST_BAD_SIZE"));
    }

    #[test]
    fn test_deserialize_fills_defaults() -> Result<()> {
        let config: Config = serde_json::from_str(r#"{"max_file_size": 1024}"#)?;
        assert_eq!(config.max_file_size, 1024);
        assert_eq!(config.min_relationship_strength, 0.5);
        Ok(())
    }
}
