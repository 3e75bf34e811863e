//! Persisted snapshot of an authenticated browsing context.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;

/// A single cookie captured from a `Set-Cookie` response header.
///
/// Only the fields the diary service actually varies are kept; expiry is
/// governed by the snapshot-file age threshold, not per-cookie attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// The authenticated state carried between navigations and runs.
///
/// The on-disk JSON shape is private to this crate; everything else treats
/// the session file as opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub(crate) cookies: Vec<SessionCookie>,
}

impl SessionState {
    /// Fold one `Set-Cookie` header value into the jar. A cookie with the
    /// same name is overwritten in place, preserving first-seen order.
    pub(crate) fn absorb_set_cookie(&mut self, header: &str) {
        let (pair, attributes) = header.split_once(';').unwrap_or((header, ""));
        let Some((name, value)) = pair.split_once('=') else {
            return;
        };
        let name = name.trim();
        if name.is_empty() {
            return;
        }

        let mut cookie = SessionCookie {
            name: name.to_owned(),
            value: value.trim().to_owned(),
            domain: None,
            path: None,
        };
        for attribute in attributes.split(';') {
            if let Some((key, val)) = attribute.split_once('=') {
                let key = key.trim();
                if key.eq_ignore_ascii_case("domain") {
                    cookie.domain = Some(val.trim().to_owned());
                } else if key.eq_ignore_ascii_case("path") {
                    cookie.path = Some(val.trim().to_owned());
                }
            }
        }

        if let Some(existing) = self.cookies.iter_mut().find(|c| c.name == cookie.name) {
            *existing = cookie;
        } else {
            self.cookies.push(cookie);
        }
    }

    /// `Cookie` request-header value for the next navigation, or `None`
    /// when the jar is empty.
    pub(crate) fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        Some(pairs.join("; "))
    }
}

/// A session whose warm-up navigation landed on a member page instead of
/// bouncing to login. Persisting goes through this type, so a state that
/// was never confirmed has no path onto disk.
#[derive(Debug, Clone)]
pub struct ConfirmedSession(pub(crate) SessionState);

impl ConfirmedSession {
    pub(crate) fn into_inner(self) -> SessionState {
        self.0
    }
}

/// Load a snapshot from `path`.
pub(crate) fn load(path: &Path) -> Result<SessionState, ScrapeError> {
    let raw = fs::read_to_string(path).map_err(|source| ScrapeError::SessionStore {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ScrapeError::SessionDecode {
        path: path.to_owned(),
        source,
    })
}

/// Persist a confirmed snapshot, creating parent directories as needed.
pub(crate) fn persist(path: &Path, session: &ConfirmedSession) -> Result<(), ScrapeError> {
    let store_err = |source: std::io::Error| ScrapeError::SessionStore {
        path: path.to_owned(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(store_err)?;
    }
    let json = serde_json::to_string_pretty(&session.0)
        .map_err(|err| store_err(std::io::Error::other(err)))?;
    fs::write(path, json).map_err(store_err)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_parses_value_and_attributes() {
        let mut state = SessionState::default();
        state.absorb_set_cookie("sess=abc123; Path=/; Domain=.example.jp; HttpOnly; Secure");
        assert_eq!(
            state.cookies,
            vec![SessionCookie {
                name: "sess".to_owned(),
                value: "abc123".to_owned(),
                domain: Some(".example.jp".to_owned()),
                path: Some("/".to_owned()),
            }]
        );
    }

    #[test]
    fn absorb_overwrites_cookie_with_same_name() {
        let mut state = SessionState::default();
        state.absorb_set_cookie("visit=1");
        state.absorb_set_cookie("sess=old");
        state.absorb_set_cookie("sess=new; Path=/");
        assert_eq!(state.cookies.len(), 2);
        assert_eq!(state.cookies[1].name, "sess");
        assert_eq!(state.cookies[1].value, "new");
    }

    #[test]
    fn absorb_ignores_nameless_headers() {
        let mut state = SessionState::default();
        state.absorb_set_cookie("=orphan");
        state.absorb_set_cookie("no-equals-sign");
        assert!(state.cookies.is_empty());
    }

    #[test]
    fn cookie_header_joins_pairs_in_first_seen_order() {
        let mut state = SessionState::default();
        assert_eq!(state.cookie_header(), None);
        state.absorb_set_cookie("visit=1");
        state.absorb_set_cookie("sess=abc");
        assert_eq!(state.cookie_header().as_deref(), Some("visit=1; sess=abc"));
    }

    #[test]
    fn persist_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut state = SessionState::default();
        state.absorb_set_cookie("sess=abc; Path=/");
        persist(&path, &ConfirmedSession(state.clone())).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn load_distinguishes_missing_file_from_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let missing = load(&path).unwrap_err();
        assert!(matches!(missing, ScrapeError::SessionStore { .. }));

        fs::write(&path, "not json").unwrap();
        let garbage = load(&path).unwrap_err();
        assert!(matches!(garbage, ScrapeError::SessionDecode { .. }));
    }
}
