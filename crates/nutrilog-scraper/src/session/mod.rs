//! Authenticated-session lifecycle.
//!
//! Every scrape runs under a session the service has accepted during this
//! run, and recovery costs at most one re-login per invocation. Only a
//! state whose warm-up navigation was accepted ever reaches disk.

mod state;

pub use state::SessionState;

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;

use nutrilog_core::AppConfig;

use crate::client::{day_path, DiaryClient, Navigation, LOGIN_PATH, MEMBER_HOME_PATH};
use crate::error::ScrapeError;
use state::ConfirmedSession;

/// Login credentials for the diary service.
#[derive(Clone)]
pub struct Credentials {
    pub account: String,
    pub password: String,
}

impl Credentials {
    /// Credentials from config, only when both halves are present.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        match (&config.account, &config.password) {
            (Some(account), Some(password)) => Some(Self {
                account: account.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Owns the login, freshness, probe, and recovery rules for one session
/// snapshot file.
pub struct SessionManager {
    client: Arc<DiaryClient>,
    session_path: PathBuf,
    max_age: Duration,
    credentials: Option<Credentials>,
}

impl SessionManager {
    #[must_use]
    pub fn new(
        client: Arc<DiaryClient>,
        session_path: PathBuf,
        max_age: Duration,
        credentials: Option<Credentials>,
    ) -> Self {
        Self {
            client,
            session_path,
            max_age,
            credentials,
        }
    }

    /// Manager with its own client, for use outside a pipeline.
    ///
    /// # Errors
    ///
    /// Propagates client construction failures.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScrapeError> {
        let client = Arc::new(DiaryClient::new(
            &config.base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?);
        Ok(Self::new(
            client,
            config.session_path(),
            Duration::from_secs(config.session_max_age_hours * 3600),
            Credentials::from_config(config),
        ))
    }

    /// Cheap local-only freshness check: the snapshot file exists and its
    /// mtime is within the staleness threshold. Says nothing about whether
    /// the service still accepts the session; that is [`Self::probe`]'s
    /// job.
    #[must_use]
    pub fn is_likely_fresh(&self) -> bool {
        let Ok(meta) = fs::metadata(&self.session_path) else {
            return false;
        };
        let Ok(modified) = meta.modified() else {
            return false;
        };
        match modified.elapsed() {
            Ok(age) => age < self.max_age,
            // An mtime in the future still counts as recent.
            Err(_) => true,
        }
    }

    /// Credential-driven login with confirmation.
    ///
    /// Seeds cookies from the login page (lifting a hidden CSRF token if the
    /// form carries one), posts the form, then confirms by navigating to a
    /// member page. Only the confirmed state is persisted and returned.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::MissingCredentials`] without configured credentials,
    /// [`ScrapeError::AuthenticationFailed`] when the service rejects the
    /// form or the confirmation bounces, plus transport and persistence
    /// errors.
    pub async fn login(&self) -> Result<SessionState, ScrapeError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(ScrapeError::MissingCredentials)?;
        tracing::info!(account = %credentials.account, "logging in to the diary service");

        let mut state = SessionState::default();
        let login_form = match self.client.fetch(&mut state, LOGIN_PATH).await? {
            Navigation::Page(page) => Some(page),
            Navigation::LoginRedirect { .. } => None,
        };

        let mut form = vec![
            ("account".to_owned(), credentials.account.clone()),
            ("password".to_owned(), credentials.password.clone()),
        ];
        if let Some(page) = &login_form {
            if let Some((name, token)) = csrf_token(&page.body) {
                form.push((name, token));
            }
        }

        if let Navigation::LoginRedirect { .. } =
            self.client.post_form(&mut state, LOGIN_PATH, &form).await?
        {
            return Err(ScrapeError::AuthenticationFailed {
                reason: "the login form was redirected back to the login page".to_owned(),
            });
        }

        let confirmed = self.confirm(state).await?;
        state::persist(&self.session_path, &confirmed)?;
        tracing::info!(
            path = %self.session_path.display(),
            "login confirmed; session snapshot persisted"
        );
        Ok(confirmed.into_inner())
    }

    /// Lightweight validity check: fetch `date`'s diary page under a copy
    /// of `state` and see whether it bounces. Transport failures count as
    /// "not accepted" rather than erroring, and nothing is persisted.
    pub async fn probe(&self, state: &SessionState, date: NaiveDate) -> bool {
        let mut scratch = state.clone();
        match self.client.fetch(&mut scratch, &day_path(date)).await {
            Ok(Navigation::Page(_)) => true,
            Ok(Navigation::LoginRedirect { url }) => {
                tracing::debug!(url, "session probe bounced to login");
                false
            }
            Err(err) => {
                tracing::warn!(error = %err, "session probe failed on transport");
                false
            }
        }
    }

    /// Produce a session the service currently accepts for `date`.
    ///
    /// Without a fresh snapshot this is a plain login (which carries its
    /// own confirmation, so no separate probe runs). A fresh snapshot is
    /// probed first; on rejection exactly one re-login and one re-probe are
    /// attempted before giving up.
    ///
    /// # Errors
    ///
    /// Login errors pass through;
    /// [`ScrapeError::SessionRecoveryFailed`] when the re-login's session
    /// is also rejected.
    pub async fn ensure_valid(&self, date: NaiveDate) -> Result<SessionState, ScrapeError> {
        if !self.is_likely_fresh() {
            tracing::info!("session snapshot absent or stale; logging in");
            return self.login().await;
        }

        let state = match state::load(&self.session_path) {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(error = %err, "session snapshot unreadable; logging in");
                return self.login().await;
            }
        };
        if self.probe(&state, date).await {
            tracing::debug!("persisted session accepted by probe");
            return Ok(state);
        }

        tracing::warn!("persisted session rejected; attempting the single re-login");
        let state = self.login().await?;
        if self.probe(&state, date).await {
            return Ok(state);
        }
        Err(ScrapeError::SessionRecoveryFailed { date })
    }

    async fn confirm(&self, mut state: SessionState) -> Result<ConfirmedSession, ScrapeError> {
        match self.client.fetch(&mut state, MEMBER_HOME_PATH).await? {
            Navigation::Page(_) => Ok(ConfirmedSession(state)),
            Navigation::LoginRedirect { .. } => Err(ScrapeError::AuthenticationFailed {
                reason: "the post-login warm-up navigation bounced to the login page".to_owned(),
            }),
        }
    }
}

/// Hidden CSRF input on the login form, as (field name, value). Both
/// attribute orders occur in the wild.
fn csrf_token(body: &str) -> Option<(String, String)> {
    const NAMES: &str = "_token|authenticity_token|csrf_token";
    let name_first = Regex::new(&format!(
        r#"(?is)<input[^>]+name\s*=\s*["']({NAMES})["'][^>]+value\s*=\s*["']([^"']*)["']"#
    ))
    .expect("valid csrf regex");
    if let Some(caps) = name_first.captures(body) {
        return Some((caps[1].to_owned(), caps[2].to_owned()));
    }
    let value_first = Regex::new(&format!(
        r#"(?is)<input[^>]+value\s*=\s*["']([^"']*)["'][^>]+name\s*=\s*["']({NAMES})["']"#
    ))
    .expect("valid csrf fallback regex");
    value_first
        .captures(body)
        .map(|caps| (caps[2].to_owned(), caps[1].to_owned()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
