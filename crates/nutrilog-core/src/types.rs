//! Domain types for one scraped diary day.
//!
//! Serialized field names follow the diary service's own vocabulary (meal
//! slots in Japanese, item fields in camelCase) so downstream consumers see
//! the labels they already key on.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One of the service's fixed eating-occasion categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MealSlot {
    #[serde(rename = "朝食")]
    Breakfast,
    #[serde(rename = "昼食")]
    Lunch,
    #[serde(rename = "夕食")]
    Dinner,
    #[serde(rename = "間食")]
    Snack,
}

impl MealSlot {
    /// The slots that have a per-meal advice page. Snacks never do.
    #[must_use]
    pub const fn advice_slots() -> [MealSlot; 3] {
        [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner]
    }

    /// Position of this slot's advice page in the service's per-day content
    /// list. The indices are dictated by the remote service and do not vary
    /// with the date.
    #[must_use]
    pub const fn advice_content_index(self) -> Option<u8> {
        match self {
            MealSlot::Breakfast => Some(3),
            MealSlot::Lunch => Some(4),
            MealSlot::Dinner => Some(5),
            MealSlot::Snack => None,
        }
    }

    /// Japanese display name, identical to the serialized form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "朝食",
            MealSlot::Lunch => "昼食",
            MealSlot::Dinner => "夕食",
            MealSlot::Snack => "間食",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single food entry scraped from the day-overview page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedItem {
    pub meal_type: MealSlot,
    pub name: String,
    /// Portion text exactly as displayed, e.g. `"1人前"` or `"2枚"`.
    pub amount: String,
    pub calories: u32,
}

/// Nutrient label to value-with-unit mapping, e.g. `"たんぱく質" -> "10g"`.
///
/// Keys are canonical labels from the extraction vocabulary; values keep
/// their unit suffix. `BTreeMap` keeps serialization order stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutrientRecord(BTreeMap<String, String>);

impl NutrientRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a canonical label and its normalized value. An existing entry
    /// for the same label is overwritten.
    pub fn insert(&mut self, label: &str, value: &str) {
        self.0.insert(label.to_owned(), value.to_owned());
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Per-meal nutrient breakdowns for one day. A missing slot means no
/// recognized nutrients were scraped for it; snacks have no advice page at
/// all and therefore no field here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealNutrients {
    #[serde(rename = "朝食", default, skip_serializing_if = "Option::is_none")]
    pub breakfast: Option<NutrientRecord>,
    #[serde(rename = "昼食", default, skip_serializing_if = "Option::is_none")]
    pub lunch: Option<NutrientRecord>,
    #[serde(rename = "夕食", default, skip_serializing_if = "Option::is_none")]
    pub dinner: Option<NutrientRecord>,
}

impl MealNutrients {
    /// Store `record` under `slot`. Snack records have nowhere to live and
    /// are dropped.
    pub fn set(&mut self, slot: MealSlot, record: NutrientRecord) {
        match slot {
            MealSlot::Breakfast => self.breakfast = Some(record),
            MealSlot::Lunch => self.lunch = Some(record),
            MealSlot::Dinner => self.dinner = Some(record),
            MealSlot::Snack => {}
        }
    }

    #[must_use]
    pub fn record_for(&self, slot: MealSlot) -> Option<&NutrientRecord> {
        match slot {
            MealSlot::Breakfast => self.breakfast.as_ref(),
            MealSlot::Lunch => self.lunch.as_ref(),
            MealSlot::Dinner => self.dinner.as_ref(),
            MealSlot::Snack => None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.breakfast.is_none() && self.lunch.is_none() && self.dinner.is_none()
    }
}

/// Everything scraped for one diary day: the flat item list from the
/// overview page plus per-meal nutrient breakdowns from the advice pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayResult {
    pub date: NaiveDate,
    pub items: Vec<ScrapedItem>,
    pub nutrients: MealNutrients,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> ScrapedItem {
        ScrapedItem {
            meal_type: MealSlot::Breakfast,
            name: "トースト".to_owned(),
            amount: "2枚".to_owned(),
            calories: 300,
        }
    }

    #[test]
    fn meal_slot_serializes_as_japanese_label() {
        let json = serde_json::to_string(&MealSlot::Breakfast).unwrap();
        assert_eq!(json, "\"朝食\"");
        let back: MealSlot = serde_json::from_str("\"間食\"").unwrap();
        assert_eq!(back, MealSlot::Snack);
    }

    #[test]
    fn advice_content_indices_are_fixed() {
        assert_eq!(MealSlot::Breakfast.advice_content_index(), Some(3));
        assert_eq!(MealSlot::Lunch.advice_content_index(), Some(4));
        assert_eq!(MealSlot::Dinner.advice_content_index(), Some(5));
        assert_eq!(MealSlot::Snack.advice_content_index(), None);
    }

    #[test]
    fn scraped_item_uses_camel_case_field_names() {
        let value = serde_json::to_value(sample_item()).unwrap();
        assert_eq!(value["mealType"], "朝食");
        assert_eq!(value["name"], "トースト");
        assert_eq!(value["amount"], "2枚");
        assert_eq!(value["calories"], 300);
    }

    #[test]
    fn nutrient_record_serializes_transparently() {
        let mut record = NutrientRecord::new();
        record.insert("エネルギー", "300kcal");
        record.insert("たんぱく質", "10g");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["エネルギー"], "300kcal");
        assert_eq!(value["たんぱく質"], "10g");
    }

    #[test]
    fn nutrient_record_overwrites_existing_label() {
        let mut record = NutrientRecord::new();
        record.insert("鉄", "2mg");
        record.insert("鉄", "3mg");
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("鉄"), Some("3mg"));
    }

    #[test]
    fn empty_meal_records_are_omitted_from_json() {
        let mut nutrients = MealNutrients::default();
        let mut breakfast = NutrientRecord::new();
        breakfast.insert("エネルギー", "300kcal");
        nutrients.set(MealSlot::Breakfast, breakfast);

        let value = serde_json::to_value(&nutrients).unwrap();
        let map = value.as_object().unwrap();
        assert!(map.contains_key("朝食"));
        assert!(!map.contains_key("昼食"));
        assert!(!map.contains_key("夕食"));
        assert!(!map.contains_key("間食"));
    }

    #[test]
    fn snack_records_have_no_slot_in_meal_nutrients() {
        let mut nutrients = MealNutrients::default();
        let mut record = NutrientRecord::new();
        record.insert("エネルギー", "150kcal");
        nutrients.set(MealSlot::Snack, record);
        assert!(nutrients.is_empty());
    }

    #[test]
    fn day_result_round_trips() {
        let mut nutrients = MealNutrients::default();
        let mut record = NutrientRecord::new();
        record.insert("脂質", "12.5g");
        nutrients.set(MealSlot::Dinner, record);
        let result = DayResult {
            date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
            items: vec![sample_item()],
            nutrients,
        };

        let json = serde_json::to_string(&result).unwrap();
        let back: DayResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
        assert!(json.contains("\"date\":\"2026-08-20\""));
    }
}
