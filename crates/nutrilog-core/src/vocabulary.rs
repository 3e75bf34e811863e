//! Fixed extraction vocabulary for the advice-page nutrient tables.
//!
//! The diary service renders nutrient names with some spelling drift
//! (kanji vs kana, marketing synonyms), so each canonical label carries the
//! spellings observed in the wild. Unrecognized labels are ignored by
//! design; widening coverage means adding entries here, not loosening the
//! matcher.

/// One canonical nutrient label plus every page spelling that maps to it.
///
/// Spelling order is match precedence: the first spelling that appears in
/// the page text wins, so preferred forms come first.
#[derive(Debug, Clone, Copy)]
pub struct LabelSpec {
    pub canonical: &'static str,
    pub spellings: &'static [&'static str],
}

const fn label(canonical: &'static str, spellings: &'static [&'static str]) -> LabelSpec {
    LabelSpec {
        canonical,
        spellings,
    }
}

/// Scan order for extraction. Order within the list does not change which
/// labels are found, only the order work happens in; keep it aligned with
/// the standard nutrition-panel layout for readability.
pub const NUTRIENT_VOCABULARY: &[LabelSpec] = &[
    label("エネルギー", &["エネルギー"]),
    label("たんぱく質", &["たんぱく質", "蛋白質"]),
    label("脂質", &["脂質"]),
    label("炭水化物", &["炭水化物", "糖質"]),
    label("食物繊維", &["食物繊維"]),
    label("食塩相当量", &["食塩相当量", "塩分相当量"]),
    label("ナトリウム", &["ナトリウム"]),
    label("カリウム", &["カリウム"]),
    label("カルシウム", &["カルシウム"]),
    label("鉄", &["鉄"]),
    label("ビタミンA", &["ビタミンA"]),
    // B1 also prefix-matches B12 text; the extractor's unit anchor right
    // after the number keeps the two apart.
    label("ビタミンB1", &["ビタミンB1"]),
    label("ビタミンB2", &["ビタミンB2"]),
    label("ビタミンB6", &["ビタミンB6"]),
    label("ビタミンB12", &["ビタミンB12"]),
    label("ビタミンC", &["ビタミンC"]),
    label("ビタミンD", &["ビタミンD"]),
    label("ビタミンE", &["ビタミンE"]),
    label("葉酸", &["葉酸"]),
];

/// Units a nutrient value may carry on the page. Matching is
/// case-insensitive; both the Greek mu and the Latin-1 micro sign occur in
/// served markup, plus a plain-ASCII `ug` fallback.
pub const VALUE_UNITS: &[&str] = &["kcal", "mg", "μg", "µg", "ug", "g"];

/// Canonical microgram spelling (Greek small mu, U+03BC). Every microgram
/// variant in [`VALUE_UNITS`] normalizes to this one.
pub const MICROGRAM_CANONICAL: &str = "μg";

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn canonical_labels_are_unique() {
        let labels: BTreeSet<&str> = NUTRIENT_VOCABULARY.iter().map(|s| s.canonical).collect();
        assert_eq!(labels.len(), NUTRIENT_VOCABULARY.len());
    }

    #[test]
    fn every_label_lists_itself_first() {
        for spec in NUTRIENT_VOCABULARY {
            assert_eq!(
                spec.spellings.first().copied(),
                Some(spec.canonical),
                "preferred spelling of {} must come first",
                spec.canonical
            );
        }
    }

    #[test]
    fn carbohydrate_accepts_sugar_phrasing_as_fallback() {
        let carbs = NUTRIENT_VOCABULARY
            .iter()
            .find(|s| s.canonical == "炭水化物")
            .unwrap();
        assert_eq!(carbs.spellings, &["炭水化物", "糖質"]);
    }

    #[test]
    fn microgram_variants_are_all_listed() {
        assert!(VALUE_UNITS.contains(&"μg"), "Greek mu");
        assert!(VALUE_UNITS.contains(&"µg"), "Latin-1 micro sign");
        assert!(VALUE_UNITS.contains(&"ug"), "ASCII fallback");
        assert!(VALUE_UNITS.contains(&MICROGRAM_CANONICAL));
    }
}
