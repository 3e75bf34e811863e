//! Failure taxonomy for the scraping pipeline.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors surfaced by session handling, navigation, and scraping.
///
/// An advice page with no recognizable nutrients is not represented here:
/// empty extraction is a legitimate outcome, not a failure.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The login flow was rejected or never left the login page.
    #[error("authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    /// A data-page navigation under a previously accepted session came back
    /// as a redirect to the login page.
    #[error("session expired: {url} redirected to the login page")]
    SessionExpired { url: String },

    /// The single recovery attempt (re-login plus re-probe) also failed.
    #[error("session recovery failed for {date}: the re-login was not accepted")]
    SessionRecoveryFailed { date: NaiveDate },

    /// A navigation did not complete within the configured timeout.
    #[error("navigation to {url} timed out after {timeout_secs}s")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    /// A data page answered with a status the scraper has no use for.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// Redirect hops exceeded the sanity bound.
    #[error("redirect loop while navigating to {url}")]
    RedirectLoop { url: String },

    /// The configured base URL or a `Location` header did not form a valid
    /// absolute URL.
    #[error("invalid service URL {url:?}: {reason}")]
    InvalidServiceUrl { url: String, reason: String },

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading or writing the session snapshot failed at the I/O level.
    #[error("session store error at {}: {source}", path.display())]
    SessionStore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The session snapshot exists but does not parse.
    #[error("session snapshot at {} is not readable: {source}", path.display())]
    SessionDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Unattended run with no credentials in the environment.
    #[error("credentials are not configured: set NUTRILOG_ACCOUNT and NUTRILOG_PASSWORD")]
    MissingCredentials,
}
