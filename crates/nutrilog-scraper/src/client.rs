//! Authenticated HTTP navigation against the diary service.
//!
//! Redirects are never followed blindly. Every hop is inspected so a bounce
//! to the login page surfaces as a session signal instead of being silently
//! followed, and `Set-Cookie` headers on intermediate hops are folded into
//! the session state before the next request goes out.

use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{header, redirect, Client, Method, Url};

use crate::error::ScrapeError;
use crate::session::SessionState;

pub(crate) const LOGIN_PATH: &str = "/login";
pub(crate) const MEMBER_HOME_PATH: &str = "/mypage";

const MAX_REDIRECT_HOPS: usize = 5;

/// Path of the per-date diary overview page.
pub(crate) fn day_path(date: NaiveDate) -> String {
    format!("/diary/{date}")
}

/// Path of one advice page. `index` is the slot's fixed position in the
/// service's per-day content list.
pub(crate) fn advice_path(date: NaiveDate, index: u8) -> String {
    format!("/diary/{date}/advice/{index}")
}

/// A fetched page: the URL the navigation settled on plus the raw body.
#[derive(Debug, Clone)]
pub struct PageView {
    pub url: String,
    pub body: String,
}

/// Outcome of one navigation: either a page, or the observation that the
/// service bounced us to the login page. The bounce is the service's only
/// signal that a session is no longer accepted, so it is modeled as data
/// rather than an error at this layer.
#[derive(Debug)]
pub(crate) enum Navigation {
    Page(PageView),
    LoginRedirect { url: String },
}

/// How long to keep re-fetching a page whose content renders late.
#[derive(Debug, Clone, Copy)]
pub struct RenderWait {
    pub wait_secs: u64,
    pub poll_ms: u64,
}

/// HTTP client bound to one diary-service origin.
///
/// The client itself is stateless with respect to authentication; cookies
/// live in [`SessionState`] and are threaded through every call.
#[derive(Debug)]
pub struct DiaryClient {
    http: Client,
    base: Url,
    timeout_secs: u64,
    /// Most recently fetched page, kept for failure diagnostics.
    last_page: Mutex<Option<PageView>>,
}

impl DiaryClient {
    /// # Errors
    ///
    /// [`ScrapeError::InvalidServiceUrl`] when `base_url` is not an
    /// absolute URL, [`ScrapeError::Http`] when the underlying client
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ScrapeError> {
        let base = Url::parse(base_url).map_err(|err| ScrapeError::InvalidServiceUrl {
            url: base_url.to_owned(),
            reason: err.to_string(),
        })?;
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self {
            http,
            base,
            timeout_secs,
            last_page: Mutex::new(None),
        })
    }

    /// The page most recently fetched through this client, if any.
    pub(crate) fn last_page(&self) -> Option<PageView> {
        self.last_page.lock().ok().and_then(|guard| guard.clone())
    }

    /// GET `path` under `state`, following redirects manually.
    pub(crate) async fn fetch(
        &self,
        state: &mut SessionState,
        path: &str,
    ) -> Result<Navigation, ScrapeError> {
        self.navigate(state, Method::GET, path, None).await
    }

    /// POST an urlencoded form to `path`, then follow redirects as GETs.
    pub(crate) async fn post_form(
        &self,
        state: &mut SessionState,
        path: &str,
        form: &[(String, String)],
    ) -> Result<Navigation, ScrapeError> {
        self.navigate(state, Method::POST, path, Some(form)).await
    }

    /// Re-fetch `path` until any of `markers` appears in the body or the
    /// render budget elapses. The diary pages populate their tables after
    /// the initial document is served, so a first fetch can race an empty
    /// shell; when the budget runs out the last body is returned as-is and
    /// the caller decides what an unmarked page means.
    pub(crate) async fn fetch_until(
        &self,
        state: &mut SessionState,
        path: &str,
        markers: &[&str],
        wait: RenderWait,
    ) -> Result<Navigation, ScrapeError> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(wait.wait_secs);
        loop {
            match self.fetch(state, path).await? {
                Navigation::LoginRedirect { url } => {
                    return Ok(Navigation::LoginRedirect { url });
                }
                Navigation::Page(page) => {
                    let marked =
                        markers.is_empty() || markers.iter().any(|marker| page.body.contains(marker));
                    if marked {
                        return Ok(Navigation::Page(page));
                    }
                    if tokio::time::Instant::now() >= deadline {
                        tracing::debug!(path, "render wait elapsed without an expected marker");
                        return Ok(Navigation::Page(page));
                    }
                    tokio::time::sleep(Duration::from_millis(wait.poll_ms)).await;
                }
            }
        }
    }

    async fn navigate(
        &self,
        state: &mut SessionState,
        method: Method,
        path: &str,
        form: Option<&[(String, String)]>,
    ) -> Result<Navigation, ScrapeError> {
        let mut url = self.absolute(path)?;
        let mut method = method;
        let mut form = form;

        for _hop in 0..MAX_REDIRECT_HOPS {
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .header(header::ACCEPT, "text/html,application/xhtml+xml")
                .header(header::ACCEPT_LANGUAGE, "ja,en;q=0.8");
            if let Some(cookie) = state.cookie_header() {
                request = request.header(header::COOKIE, cookie);
            }
            if let Some(fields) = form {
                request = request.form(fields);
            }

            let response = request
                .send()
                .await
                .map_err(|err| self.transport_error(err, url.as_str()))?;
            let status = response.status();
            for set_cookie in response.headers().get_all(header::SET_COOKIE) {
                if let Ok(raw) = set_cookie.to_str() {
                    state.absorb_set_cookie(raw);
                }
            }

            if status.is_redirection() {
                let Some(location) = response
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|value| value.to_str().ok())
                else {
                    return Err(ScrapeError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                };
                if self.is_login_location(&url, location) {
                    tracing::debug!(from = %url, "navigation bounced to the login page");
                    return Ok(Navigation::LoginRedirect {
                        url: url.to_string(),
                    });
                }
                url = url.join(location).map_err(|err| ScrapeError::InvalidServiceUrl {
                    url: location.to_owned(),
                    reason: err.to_string(),
                })?;
                // Redirect targets are plain pages; the form never re-posts.
                method = Method::GET;
                form = None;
                continue;
            }

            if !status.is_success() {
                return Err(ScrapeError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let final_url = url.to_string();
            let body = response
                .text()
                .await
                .map_err(|err| self.transport_error(err, &final_url))?;
            let page = PageView {
                url: final_url,
                body,
            };
            if let Ok(mut guard) = self.last_page.lock() {
                *guard = Some(page.clone());
            }
            return Ok(Navigation::Page(page));
        }

        Err(ScrapeError::RedirectLoop {
            url: url.to_string(),
        })
    }

    fn absolute(&self, path: &str) -> Result<Url, ScrapeError> {
        self.base.join(path).map_err(|err| ScrapeError::InvalidServiceUrl {
            url: path.to_owned(),
            reason: err.to_string(),
        })
    }

    /// True when a redirect `Location` resolves onto the login page.
    fn is_login_location(&self, current: &Url, location: &str) -> bool {
        match current.join(location) {
            Ok(target) => target.path().starts_with(LOGIN_PATH),
            Err(_) => false,
        }
    }

    fn transport_error(&self, err: reqwest::Error, url: &str) -> ScrapeError {
        if err.is_timeout() {
            ScrapeError::NavigationTimeout {
                url: url.to_owned(),
                timeout_secs: self.timeout_secs,
            }
        } else {
            ScrapeError::Http(err)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DiaryClient {
        DiaryClient::new("https://diary.example.jp", 5, "nutrilog-test").unwrap()
    }

    #[test]
    fn diary_paths_are_date_scoped() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 20).unwrap();
        assert_eq!(day_path(date), "/diary/2026-08-20");
        assert_eq!(advice_path(date, 3), "/diary/2026-08-20/advice/3");
    }

    #[test]
    fn login_locations_are_recognized_in_relative_and_absolute_form() {
        let client = client();
        let current = Url::parse("https://diary.example.jp/diary/2026-08-20").unwrap();
        assert!(client.is_login_location(&current, "/login"));
        assert!(client.is_login_location(&current, "/login?return=%2Fdiary"));
        assert!(client.is_login_location(&current, "https://diary.example.jp/login"));
        assert!(!client.is_login_location(&current, "/mypage"));
        assert!(!client.is_login_location(&current, "settings"));
    }

    #[test]
    fn invalid_base_url_is_rejected_at_construction() {
        let err = DiaryClient::new("not a url", 5, "nutrilog-test").unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidServiceUrl { .. }));
    }
}
