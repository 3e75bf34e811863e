//! Environment-driven configuration loading.
//!
//! All lookups go through an injected closure so tests can exercise the
//! loader without touching the process environment.

use std::env::VarError;
use std::path::PathBuf;

use thiserror::Error;

use crate::app_config::AppConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load [`AppConfig`] from the process environment.
///
/// # Errors
///
/// Returns [`ConfigError`] when `NUTRILOG_BASE_URL` is unset or any
/// variable fails to parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    build_app_config(|var| std::env::var(var))
}

/// Build [`AppConfig`] from an arbitrary variable lookup.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] for an absent required variable
/// and [`ConfigError::InvalidEnvVar`] for a present but unparseable one.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let optional = |var: &str| lookup(var).ok().filter(|value| !value.is_empty());
    let required = |var: &str| {
        optional(var).ok_or_else(|| ConfigError::MissingEnvVar(var.to_owned()))
    };
    let or_default = |var: &str, default: &str| optional(var).unwrap_or_else(|| default.to_owned());

    let base_url = required("NUTRILOG_BASE_URL")?;
    let account = optional("NUTRILOG_ACCOUNT");
    let password = optional("NUTRILOG_PASSWORD");
    let headless = parse_bool("NUTRILOG_HEADLESS", &or_default("NUTRILOG_HEADLESS", "true"))?;
    let data_dir = PathBuf::from(or_default("NUTRILOG_DATA_DIR", "./data"));
    let log_level = or_default("NUTRILOG_LOG_LEVEL", "info");
    let user_agent = or_default(
        "NUTRILOG_USER_AGENT",
        "nutrilog/0.1 (+https://github.com/nutrilog/nutrilog)",
    );
    let request_timeout_secs = parse_u64(
        "NUTRILOG_REQUEST_TIMEOUT_SECS",
        &or_default("NUTRILOG_REQUEST_TIMEOUT_SECS", "30"),
    )?;
    let render_wait_secs = parse_u64(
        "NUTRILOG_RENDER_WAIT_SECS",
        &or_default("NUTRILOG_RENDER_WAIT_SECS", "10"),
    )?;
    let render_poll_ms = parse_u64(
        "NUTRILOG_RENDER_POLL_MS",
        &or_default("NUTRILOG_RENDER_POLL_MS", "500"),
    )?;
    let inter_page_delay_ms = parse_u64(
        "NUTRILOG_INTER_PAGE_DELAY_MS",
        &or_default("NUTRILOG_INTER_PAGE_DELAY_MS", "500"),
    )?;
    let session_max_age_hours = parse_u64(
        "NUTRILOG_SESSION_MAX_AGE_HOURS",
        &or_default("NUTRILOG_SESSION_MAX_AGE_HOURS", "12"),
    )?;
    let day_boundary_hour = parse_u32(
        "NUTRILOG_DAY_BOUNDARY_HOUR",
        &or_default("NUTRILOG_DAY_BOUNDARY_HOUR", "3"),
    )?;
    if day_boundary_hour > 23 {
        return Err(ConfigError::InvalidEnvVar {
            var: "NUTRILOG_DAY_BOUNDARY_HOUR".to_owned(),
            reason: format!("hour {day_boundary_hour} is out of range 0..=23"),
        });
    }
    let batch_workers = parse_usize(
        "NUTRILOG_BATCH_WORKERS",
        &or_default("NUTRILOG_BATCH_WORKERS", "5"),
    )?;

    Ok(AppConfig {
        base_url,
        account,
        password,
        headless,
        data_dir,
        log_level,
        user_agent,
        request_timeout_secs,
        render_wait_secs,
        render_poll_ms,
        inter_page_delay_ms,
        session_max_age_hours,
        day_boundary_hour,
        batch_workers,
    })
}

fn parse_u64(var: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnvVar {
        var: var.to_owned(),
        reason: format!("expected an integer, got {value:?}"),
    })
}

fn parse_u32(var: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnvVar {
        var: var.to_owned(),
        reason: format!("expected an integer, got {value:?}"),
    })
}

fn parse_usize(var: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnvVar {
        var: var.to_owned(),
        reason: format!("expected an integer, got {value:?}"),
    })
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvVar {
            var: var.to_owned(),
            reason: format!("expected a boolean, got {value:?}"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
