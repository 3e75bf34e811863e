//! Per-date orchestration: session guarantee, overview, advice, assembly.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use nutrilog_core::{AppConfig, DayResult, MealNutrients, MealSlot};

use crate::advice;
use crate::client::{DiaryClient, RenderWait};
use crate::diagnostics;
use crate::error::ScrapeError;
use crate::extract::NutrientExtractor;
use crate::overview;
use crate::session::{Credentials, SessionManager};

/// Scrapes one diary day end to end.
///
/// Failure policy: session and overview problems are fatal for the date
/// (after writing diagnostics), while a failing advice page only costs that
/// meal its nutrient breakdown.
pub struct Pipeline {
    client: Arc<DiaryClient>,
    session: SessionManager,
    extractor: NutrientExtractor,
    overview_wait: RenderWait,
    advice_wait: RenderWait,
    inter_page_delay: Duration,
    diagnostics_dir: PathBuf,
}

impl Pipeline {
    /// # Errors
    ///
    /// Propagates client construction failures (malformed base URL).
    pub fn from_config(config: &AppConfig) -> Result<Self, ScrapeError> {
        let client = Arc::new(DiaryClient::new(
            &config.base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?);
        let session = SessionManager::new(
            Arc::clone(&client),
            config.session_path(),
            Duration::from_secs(config.session_max_age_hours * 3600),
            Credentials::from_config(config),
        );
        Ok(Self {
            client,
            session,
            extractor: NutrientExtractor::with_default_vocabulary(),
            overview_wait: RenderWait {
                wait_secs: config.render_wait_secs,
                poll_ms: config.render_poll_ms,
            },
            // Advice tables are served rendered far more often than the
            // overview, so a short slice of the budget suffices.
            advice_wait: RenderWait {
                wait_secs: config.render_wait_secs.min(3),
                poll_ms: config.render_poll_ms,
            },
            inter_page_delay: Duration::from_millis(config.inter_page_delay_ms),
            diagnostics_dir: config.diagnostics_dir(),
        })
    }

    /// Scrape `date` and assemble its [`DayResult`].
    ///
    /// # Errors
    ///
    /// Session establishment and overview errors, each after failure
    /// diagnostics are written. One mid-run session expiry during the
    /// overview is recovered through the session manager before giving up.
    pub async fn run(&self, date: NaiveDate) -> Result<DayResult, ScrapeError> {
        tracing::info!(%date, "scraping diary day");
        let mut state = self
            .session
            .ensure_valid(date)
            .await
            .map_err(|err| self.capture(err))?;

        let items = match overview::scrape_overview(&self.client, &mut state, date, self.overview_wait)
            .await
        {
            Ok(items) => items,
            Err(ScrapeError::SessionExpired { url }) => {
                // The service invalidated us between probe and fetch; one
                // pass back through the session manager, then one retry.
                tracing::warn!(url, "session expired during overview; re-validating");
                state = self
                    .session
                    .ensure_valid(date)
                    .await
                    .map_err(|err| self.capture(err))?;
                overview::scrape_overview(&self.client, &mut state, date, self.overview_wait)
                    .await
                    .map_err(|err| self.capture(err))?
            }
            Err(err) => return Err(self.capture(err)),
        };

        let mut nutrients = MealNutrients::default();
        for slot in MealSlot::advice_slots() {
            if !self.inter_page_delay.is_zero() {
                tokio::time::sleep(self.inter_page_delay).await;
            }
            match advice::scrape_advice(
                &self.client,
                &mut state,
                &self.extractor,
                date,
                slot,
                self.advice_wait,
            )
            .await
            {
                Ok(record) if record.is_empty() => {
                    tracing::debug!(%date, slot = %slot, "no recognized nutrients for slot");
                }
                Ok(record) => nutrients.set(slot, record),
                // A broken advice page costs the slot, never the day.
                Err(err) => {
                    tracing::warn!(%date, slot = %slot, error = %err, "advice scrape failed; slot left empty");
                }
            }
        }

        tracing::info!(
            %date,
            items = items.len(),
            meals_with_nutrients = u8::from(nutrients.breakfast.is_some())
                + u8::from(nutrients.lunch.is_some())
                + u8::from(nutrients.dinner.is_some()),
            "diary day scraped"
        );
        Ok(DayResult {
            date,
            items,
            nutrients,
        })
    }

    fn capture(&self, err: ScrapeError) -> ScrapeError {
        diagnostics::capture_failure(&self.diagnostics_dir, &err, self.client.last_page().as_ref());
        err
    }
}

/// Build a pipeline from `config` and scrape a single date.
///
/// # Errors
///
/// See [`Pipeline::from_config`] and [`Pipeline::run`].
pub async fn scrape_day(config: &AppConfig, date: NaiveDate) -> Result<DayResult, ScrapeError> {
    Pipeline::from_config(config)?.run(date).await
}
