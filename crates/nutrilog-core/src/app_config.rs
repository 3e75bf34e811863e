//! Runtime configuration shared by every binary in the workspace.

use std::fmt;
use std::path::PathBuf;

/// Everything the scraper and CLI need at runtime, resolved once from the
/// environment at startup.
///
/// Construct through [`crate::config::load_app_config`] (or
/// [`crate::config::build_app_config`] in tests) so defaults and validation
/// stay in one place.
#[derive(Clone)]
pub struct AppConfig {
    /// Origin of the diary service, e.g. `https://diary.example.jp`.
    pub base_url: String,
    /// Login account. Optional so attended runs can prompt instead.
    pub account: Option<String>,
    /// Login password. Optional so attended runs can prompt instead.
    pub password: Option<String>,
    /// Unattended mode: fail fast on missing credentials instead of
    /// prompting on the terminal.
    pub headless: bool,
    /// Root directory for the session snapshot, day payloads, and
    /// diagnostics.
    pub data_dir: PathBuf,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Total budget for waiting on late-rendering page content, in seconds.
    pub render_wait_secs: u64,
    /// Poll interval while waiting on late-rendering content, in
    /// milliseconds.
    pub render_poll_ms: u64,
    /// Politeness delay between successive page navigations within one day,
    /// in milliseconds.
    pub inter_page_delay_ms: u64,
    /// Age beyond which a persisted session snapshot is assumed stale, in
    /// hours.
    pub session_max_age_hours: u64,
    /// Local hour (0..=23) at which the diary day rolls over.
    pub day_boundary_hour: u32,
    /// Worker-pool width for backfill runs.
    pub batch_workers: usize,
}

impl AppConfig {
    /// Path of the persisted session snapshot.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    /// Directory that receives one JSON payload per scraped day.
    #[must_use]
    pub fn days_dir(&self) -> PathBuf {
        self.data_dir.join("days")
    }

    /// Directory that receives on-failure diagnostic artifacts.
    #[must_use]
    pub fn diagnostics_dir(&self) -> PathBuf {
        self.data_dir.join("diagnostics")
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("base_url", &self.base_url)
            .field("account", &self.account)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("headless", &self.headless)
            .field("data_dir", &self.data_dir)
            .field("log_level", &self.log_level)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("render_wait_secs", &self.render_wait_secs)
            .field("render_poll_ms", &self.render_poll_ms)
            .field("inter_page_delay_ms", &self.inter_page_delay_ms)
            .field("session_max_age_hours", &self.session_max_age_hours)
            .field("day_boundary_hour", &self.day_boundary_hour)
            .field("batch_workers", &self.batch_workers)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig {
            base_url: "https://diary.example.jp".to_owned(),
            account: Some("user@example.com".to_owned()),
            password: Some("secret".to_owned()),
            headless: true,
            data_dir: PathBuf::from("/tmp/nutrilog"),
            log_level: "info".to_owned(),
            user_agent: "nutrilog/0.1".to_owned(),
            request_timeout_secs: 30,
            render_wait_secs: 10,
            render_poll_ms: 500,
            inter_page_delay_ms: 500,
            session_max_age_hours: 12,
            day_boundary_hour: 3,
            batch_workers: 5,
        }
    }

    #[test]
    fn debug_redacts_password_but_not_account() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("[redacted]"));
        assert!(rendered.contains("user@example.com"));
    }

    #[test]
    fn derived_paths_live_under_data_dir() {
        let config = sample();
        assert_eq!(config.session_path(), PathBuf::from("/tmp/nutrilog/session.json"));
        assert_eq!(config.days_dir(), PathBuf::from("/tmp/nutrilog/days"));
        assert_eq!(
            config.diagnostics_dir(),
            PathBuf::from("/tmp/nutrilog/diagnostics")
        );
    }
}
