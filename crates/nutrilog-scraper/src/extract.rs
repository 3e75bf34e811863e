//! Fixed-vocabulary nutrient extraction from page text.

use nutrilog_core::{LabelSpec, NutrientRecord, NUTRIENT_VOCABULARY, VALUE_UNITS};
use regex::Regex;

use crate::normalize::normalize_value;

/// Compiled matchers for one canonical label, one regex per spelling.
struct LabelMatcher {
    canonical: &'static str,
    spellings: Vec<Regex>,
}

/// Scans text for `label[:] <number> <unit>` occurrences drawn from a fixed
/// vocabulary.
///
/// Matching is deterministic: labels are tried in vocabulary order, each
/// canonical label records at most one value, and within a label the first
/// spelling with a hit wins (spelling order encodes precedence, e.g.
/// 炭水化物 over 糖質). Text the vocabulary does not cover is ignored, so
/// running the extractor over arbitrary page text is safe.
pub struct NutrientExtractor {
    matchers: Vec<LabelMatcher>,
}

impl NutrientExtractor {
    /// Compile matchers for `vocabulary`. The label is taken literally; the
    /// value part accepts an optional ASCII or full-width colon, a decimal
    /// number, and one of the known units in any letter case.
    #[must_use]
    pub fn new(vocabulary: &[LabelSpec]) -> Self {
        let unit_alternation = VALUE_UNITS.join("|");
        let matchers = vocabulary
            .iter()
            .map(|spec| LabelMatcher {
                canonical: spec.canonical,
                spellings: spec
                    .spellings
                    .iter()
                    .map(|spelling| {
                        Regex::new(&format!(
                            r"{}\s*[:：]?\s*([0-9]+(?:\.[0-9]+)?)\s*((?i:{unit_alternation}))",
                            regex::escape(spelling)
                        ))
                        .expect("valid nutrient label regex")
                    })
                    .collect(),
            })
            .collect();
        Self { matchers }
    }

    /// Extractor over [`NUTRIENT_VOCABULARY`].
    #[must_use]
    pub fn with_default_vocabulary() -> Self {
        Self::new(NUTRIENT_VOCABULARY)
    }

    /// One pass over `text`. Unmatched labels are simply absent from the
    /// result; an empty record is a normal outcome for text without
    /// nutrient content.
    #[must_use]
    pub fn extract(&self, text: &str) -> NutrientRecord {
        let mut record = NutrientRecord::new();
        for matcher in &self.matchers {
            for spelling in &matcher.spellings {
                if let Some(caps) = spelling.captures(text) {
                    let number = caps.get(1).map_or("", |m| m.as_str());
                    let unit = caps.get(2).map_or("", |m| m.as_str());
                    record.insert(matcher.canonical, &normalize_value(&format!("{number}{unit}")));
                    break;
                }
            }
        }
        record
    }
}

impl Default for NutrientExtractor {
    fn default() -> Self {
        Self::with_default_vocabulary()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> NutrientRecord {
        NutrientExtractor::with_default_vocabulary().extract(text)
    }

    #[test]
    fn label_colon_number_unit_is_recognized() {
        let record = extract("脂質: 12.5g");
        assert_eq!(record.get("脂質"), Some("12.5g"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn colon_is_optional_and_may_be_full_width() {
        assert_eq!(extract("エネルギー 300 kcal").get("エネルギー"), Some("300kcal"));
        assert_eq!(extract("エネルギー：300kcal").get("エネルギー"), Some("300kcal"));
    }

    #[test]
    fn alternate_spelling_maps_to_canonical_label() {
        let record = extract("蛋白質 10g");
        assert_eq!(record.get("たんぱく質"), Some("10g"));
        assert_eq!(record.get("蛋白質"), None);
    }

    #[test]
    fn preferred_spelling_wins_when_both_appear() {
        let record = extract("糖質 40g 炭水化物 55g");
        assert_eq!(record.get("炭水化物"), Some("55g"));
    }

    #[test]
    fn fallback_spelling_applies_when_preferred_is_absent() {
        let record = extract("糖質 40g");
        assert_eq!(record.get("炭水化物"), Some("40g"));
    }

    #[test]
    fn duplicate_occurrences_keep_the_first_match() {
        let record = extract("鉄 2mg 鉄 9mg");
        assert_eq!(record.get("鉄"), Some("2mg"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn vitamin_b1_does_not_swallow_b12_lines() {
        let record = extract("ビタミンB12 0.8μg ビタミンB1 1.2mg");
        assert_eq!(record.get("ビタミンB12"), Some("0.8μg"));
        assert_eq!(record.get("ビタミンB1"), Some("1.2mg"));
    }

    #[test]
    fn microgram_variants_normalize_in_extracted_values() {
        assert_eq!(extract("葉酸 240ug").get("葉酸"), Some("240μg"));
        assert_eq!(extract("ビタミンD 5.5µg").get("ビタミンD"), Some("5.5μg"));
    }

    #[test]
    fn unknown_labels_are_ignored() {
        let record = extract("コレステロール 30mg 脂質 10g");
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("脂質"), Some("10g"));
    }

    #[test]
    fn text_without_nutrients_yields_an_empty_record() {
        assert!(extract("本日のおすすめレシピをチェック！").is_empty());
    }

    #[test]
    fn extraction_is_deterministic_for_the_same_input() {
        let text = "エネルギー 1662kcal たんぱく質 60.1g 脂質 55g 食塩相当量 7.5g";
        assert_eq!(extract(text), extract(text));
    }
}
