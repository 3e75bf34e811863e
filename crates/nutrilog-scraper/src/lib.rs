//! Session-authenticated scraper for the meal-diary service.
//!
//! The service has no public API; everything here works against the
//! member-facing HTML pages. [`client`] does authenticated navigation and
//! treats a redirect to the login page as a first-class observation.
//! [`session`] owns the login/probe/recovery lifecycle on top of it. The
//! page scrapers ([`overview`], [`advice`]) turn fetched documents into
//! [`nutrilog_core`] domain types, and [`pipeline`] ties the layers
//! together for one diary day.

pub mod advice;
pub mod client;
mod diagnostics;
pub mod error;
pub mod extract;
mod html;
pub mod normalize;
pub mod overview;
pub mod pipeline;
pub mod session;

pub use client::{DiaryClient, PageView};
pub use error::ScrapeError;
pub use extract::NutrientExtractor;
pub use normalize::normalize_value;
pub use pipeline::{scrape_day, Pipeline};
pub use session::{Credentials, SessionManager, SessionState};
