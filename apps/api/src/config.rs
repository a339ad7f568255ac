use anyhow::{bail, Context, Result};

use crate::analytics::projection::MAX_HORIZON_WEEKS;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Used when a scores request omits `risk_tolerance`.
    pub default_risk_tolerance: f64,
    pub default_active_pods: u32,
    /// Scenario horizons in weeks, ascending.
    pub forecast_horizons: Vec<u32>,
    pub reminders_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let default_risk_tolerance = optional_env("DEFAULT_RISK_TOLERANCE", "50")
            .parse::<f64>()
            .context("DEFAULT_RISK_TOLERANCE must be a number")?;
        if !(0.0..=100.0).contains(&default_risk_tolerance) {
            bail!("DEFAULT_RISK_TOLERANCE must be between 0 and 100");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            default_risk_tolerance,
            default_active_pods: optional_env("DEFAULT_ACTIVE_PODS", "0")
                .parse::<u32>()
                .context("DEFAULT_ACTIVE_PODS must be a non-negative integer")?,
            forecast_horizons: parse_horizons(&optional_env("FORECAST_HORIZONS", "4,8,12"))
                .context("FORECAST_HORIZONS is invalid")?,
            reminders_enabled: parse_flag(&optional_env("REMINDERS_ENABLED", "true"))
                .context("REMINDERS_ENABLED must be true or false")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parses a comma-separated horizon list such as `"4, 8,12"`.
/// Result is sorted and deduplicated; every entry must be within 1..=52.
pub fn parse_horizons(raw: &str) -> Result<Vec<u32>> {
    let mut horizons = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let weeks = part
                .parse::<u32>()
                .with_context(|| format!("'{part}' is not a whole number of weeks"))?;
            if weeks == 0 || weeks > MAX_HORIZON_WEEKS {
                bail!("horizon {weeks} must be between 1 and {MAX_HORIZON_WEEKS}");
            }
            Ok(weeks)
        })
        .collect::<Result<Vec<u32>>>()?;

    if horizons.is_empty() {
        bail!("at least one horizon is required");
    }
    horizons.sort_unstable();
    horizons.dedup();
    Ok(horizons)
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => bail!("unrecognised flag value '{other}'"),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/jobpulse_test".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            default_risk_tolerance: 50.0,
            default_active_pods: 0,
            forecast_horizons: vec![4, 8, 12],
            reminders_enabled: true,
        }
    }
}
