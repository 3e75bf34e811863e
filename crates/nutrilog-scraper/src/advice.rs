//! Advice-page scraper: per-meal nutrient breakdowns.

use chrono::NaiveDate;
use nutrilog_core::{MealSlot, NutrientRecord};

use crate::client::{advice_path, DiaryClient, Navigation, RenderWait};
use crate::error::ScrapeError;
use crate::extract::NutrientExtractor;
use crate::html;
use crate::session::SessionState;

/// Scrape the nutrient breakdown for `slot` on `date`.
///
/// Advice pages carry more than one table (daily totals, targets, ads), so
/// every table is extracted and the most populated result wins; when no
/// table yields anything the whole page text gets one try. Snack slots have
/// no advice page and return an empty record immediately.
///
/// # Errors
///
/// [`ScrapeError::SessionExpired`] when the page bounces to login, plus
/// transport-level errors from navigation. A page with no recognizable
/// nutrients is not an error.
pub async fn scrape_advice(
    client: &DiaryClient,
    state: &mut SessionState,
    extractor: &NutrientExtractor,
    date: NaiveDate,
    slot: MealSlot,
    wait: RenderWait,
) -> Result<NutrientRecord, ScrapeError> {
    let Some(index) = slot.advice_content_index() else {
        return Ok(NutrientRecord::new());
    };
    let path = advice_path(date, index);
    let page = match client.fetch_until(state, &path, &["<table"], wait).await? {
        Navigation::Page(page) => page,
        Navigation::LoginRedirect { url } => return Err(ScrapeError::SessionExpired { url }),
    };
    let record = extract_from_page(extractor, &page.body);
    tracing::debug!(%date, slot = %slot, fields = record.len(), "advice page extracted");
    Ok(record)
}

/// Extract from every table on the page and keep the winner; fall back to
/// the page's whole visible text when no table produced a field.
pub(crate) fn extract_from_page(extractor: &NutrientExtractor, body: &str) -> NutrientRecord {
    let candidates: Vec<NutrientRecord> = html::table_texts(body)
        .iter()
        .map(|text| extractor.extract(text))
        .collect();
    if let Some(best) = pick_best_extraction(candidates) {
        return best;
    }
    extractor.extract(&html::strip_tags(body))
}

/// Disambiguation rule, kept separate so it can change without touching
/// extraction: among per-table extractions the one with the most recognized
/// fields wins; on a tie the later table wins. `None` means no table
/// produced any field at all.
fn pick_best_extraction(candidates: Vec<NutrientRecord>) -> Option<NutrientRecord> {
    candidates
        .into_iter()
        .filter(|record| !record.is_empty())
        .max_by_key(NutrientRecord::len)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entries: &[(&str, &str)]) -> NutrientRecord {
        let mut record = NutrientRecord::new();
        for (label, value) in entries {
            record.insert(label, value);
        }
        record
    }

    #[test]
    fn most_populated_table_wins() {
        let body = "\
            <table><tr><td>エネルギー</td><td>1662 kcal</td></tr></table>\
            <table>\
            <tr><td>エネルギー</td><td>300 kcal</td></tr>\
            <tr><td>たんぱく質</td><td>10 g</td></tr>\
            <tr><td>脂質</td><td>12.5 g</td></tr>\
            <tr><td>鉄</td><td>2 mg</td></tr>\
            </table>";
        let best = extract_from_page(&NutrientExtractor::with_default_vocabulary(), body);
        assert_eq!(
            best,
            record(&[
                ("エネルギー", "300kcal"),
                ("たんぱく質", "10g"),
                ("脂質", "12.5g"),
                ("鉄", "2mg"),
            ])
        );
    }

    #[test]
    fn whole_page_text_is_the_fallback_when_tables_say_nothing() {
        let body = "<table><tr><td>広告</td></tr></table>\
                    <p>エネルギー 450kcal たんぱく質 18g</p>";
        let best = extract_from_page(&NutrientExtractor::with_default_vocabulary(), body);
        assert_eq!(best, record(&[("エネルギー", "450kcal"), ("たんぱく質", "18g")]));
    }

    #[test]
    fn page_without_nutrients_yields_an_empty_record() {
        let body = "<html><body><p>本日のアドバイスはありません。</p></body></html>";
        let best = extract_from_page(&NutrientExtractor::with_default_vocabulary(), body);
        assert!(best.is_empty());
    }

    #[test]
    fn tie_goes_to_the_later_table() {
        let body = "\
            <table><tr><td>エネルギー 300kcal</td></tr></table>\
            <table><tr><td>エネルギー 500kcal</td></tr></table>";
        let best = extract_from_page(&NutrientExtractor::with_default_vocabulary(), body);
        assert_eq!(best.get("エネルギー"), Some("500kcal"));
    }
}
