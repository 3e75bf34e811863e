//! Canonical spelling for extracted nutrient values.

/// Normalize one extracted value-with-unit string.
///
/// Whitespace (including full-width spaces) is removed outright, and every
/// microgram spelling collapses to the Greek-mu form: `12.5 µg`, `12.5ug`
/// and `12.5μg` all come out as `12.5μg`. The function is idempotent, so
/// re-normalizing stored values is harmless.
#[must_use]
pub fn normalize_value(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let mut out = String::with_capacity(compact.len());
    let mut chars = compact.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            // ASCII "ug" only ever appears as the microgram unit.
            'u' | 'U' if matches!(chars.peek(), Some('g' | 'G')) => {
                chars.next();
                out.push_str("μg");
            }
            // Latin-1 micro sign (U+00B5) to Greek small mu (U+03BC).
            'µ' => out.push('μ'),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
