//! On-failure artifacts for offline debugging.
//!
//! One fixed pair of files, overwritten on every failure: the raw HTML of
//! the page most recently fetched before things went wrong, and a text
//! summary (error, URL, stripped page text). Diagnostics never mask the
//! original error; write failures are logged and swallowed.

use std::fs;
use std::path::Path;

use crate::client::PageView;
use crate::error::ScrapeError;
use crate::html;

pub(crate) const FAILURE_HTML: &str = "last_failure.html";
pub(crate) const FAILURE_TEXT: &str = "last_failure.txt";

/// Write the failure artifacts for `err` into `dir`.
pub(crate) fn capture_failure(dir: &Path, err: &ScrapeError, last_page: Option<&PageView>) {
    if let Err(io_err) = fs::create_dir_all(dir) {
        tracing::warn!(dir = %dir.display(), error = %io_err, "cannot create diagnostics dir");
        return;
    }

    let html_path = dir.join(FAILURE_HTML);
    match last_page {
        Some(page) => {
            if let Err(io_err) = fs::write(&html_path, &page.body) {
                tracing::warn!(path = %html_path.display(), error = %io_err, "cannot write html dump");
            }
        }
        None => {
            // No page in hand; drop any stale dump so the pair always
            // describes the same failure.
            let _ = fs::remove_file(&html_path);
        }
    }

    let mut summary = format!(
        "captured: {}\nerror: {err}\n",
        chrono::Local::now().to_rfc3339()
    );
    match last_page {
        Some(page) => {
            summary.push_str(&format!(
                "last page: {}\n\n{}\n",
                page.url,
                html::strip_tags(&page.body)
            ));
        }
        None => summary.push_str("last page: (none fetched)\n"),
    }
    let text_path = dir.join(FAILURE_TEXT);
    if let Err(io_err) = fs::write(&text_path, summary) {
        tracing::warn!(path = %text_path.display(), error = %io_err, "cannot write failure summary");
    } else {
        tracing::info!(dir = %dir.display(), "failure diagnostics written");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
