//! Day-overview scraper: every food row logged for one date.

use chrono::NaiveDate;
use nutrilog_core::{MealSlot, ScrapedItem};
use regex::Regex;

use crate::client::{day_path, DiaryClient, Navigation, RenderWait};
use crate::error::ScrapeError;
use crate::html;
use crate::session::SessionState;

/// Container ids of the meal blocks on the overview page, in the order the
/// service lays them out. Accounts of different vintages render snacks
/// under either of the last two ids; both map to the snack slot.
const MEAL_BLOCKS: &[(&str, MealSlot)] = &[
    ("meal_breakfast", MealSlot::Breakfast),
    ("meal_lunch", MealSlot::Lunch),
    ("meal_dinner", MealSlot::Dinner),
    ("meal_snack", MealSlot::Snack),
    ("meal_other", MealSlot::Snack),
];

/// Scrape every food entry for `date`, concatenated across meal blocks in
/// page order.
///
/// A page with no recognizable blocks or rows yields an empty list; only
/// navigation-level problems are errors.
///
/// # Errors
///
/// [`ScrapeError::SessionExpired`] when the page bounces to login, plus
/// transport-level errors from navigation.
pub async fn scrape_overview(
    client: &DiaryClient,
    state: &mut SessionState,
    date: NaiveDate,
    wait: RenderWait,
) -> Result<Vec<ScrapedItem>, ScrapeError> {
    let path = day_path(date);
    let markers: Vec<&str> = MEAL_BLOCKS.iter().map(|(id, _)| *id).collect();
    let page = match client.fetch_until(state, &path, &markers, wait).await? {
        Navigation::Page(page) => page,
        Navigation::LoginRedirect { url } => return Err(ScrapeError::SessionExpired { url }),
    };
    let items = parse_overview(&page.body);
    if items.is_empty() {
        tracing::info!(%date, "overview page had no recognizable food rows");
    } else {
        tracing::debug!(%date, count = items.len(), "overview rows scraped");
    }
    Ok(items)
}

/// Pull items out of a fetched overview document, block by block.
pub(crate) fn parse_overview(body: &str) -> Vec<ScrapedItem> {
    let boundary_ids: Vec<&str> = MEAL_BLOCKS.iter().map(|(id, _)| *id).collect();
    let mut items = Vec::new();
    for (id, slot) in MEAL_BLOCKS {
        let Some(table) = html::table_after_id(body, id, &boundary_ids) else {
            continue;
        };
        for cells in html::table_rows(table) {
            if let Some(item) = parse_row(*slot, &cells) {
                items.push(item);
            }
        }
    }
    items
}

/// A row counts as a food entry only if it has at least three non-empty
/// cells and the third carries a `<number> kcal` value. Anything else is a
/// header, spacer, or promotional row and is skipped without complaint.
fn parse_row(slot: MealSlot, cells: &[String]) -> Option<ScrapedItem> {
    let filled: Vec<&String> = cells.iter().filter(|cell| !cell.is_empty()).collect();
    if filled.len() < 3 {
        return None;
    }
    let calories = parse_kcal(filled[2])?;
    Some(ScrapedItem {
        meal_type: slot,
        name: filled[0].clone(),
        amount: filled[1].clone(),
        calories,
    })
}

/// `"300 kcal"` or `"1,200kcal"` to integer kilocalories.
fn parse_kcal(cell: &str) -> Option<u32> {
    let kcal = Regex::new(r"([0-9][0-9,]*)\s*kcal").expect("valid kcal regex");
    let caps = kcal.captures(cell)?;
    caps.get(1)?.as_str().replace(',', "").parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
