//! Regex-based HTML text helpers.
//!
//! The diary markup is not schema-stable, so scraping works on visible text
//! and coarse structure (tables, id-anchored blocks) instead of a parsed
//! DOM tree. All matching is case-insensitive and newline-tolerant.

use regex::Regex;

/// Strip tags and collapse whitespace, dropping script and style bodies
/// first so their code never leaks into visible text.
pub(crate) fn strip_tags(html: &str) -> String {
    let scripts = Regex::new(r"(?is)<(?:script|style)[^>]*>.*?</(?:script|style)>")
        .expect("valid script regex");
    let without_scripts = scripts.replace_all(html, " ");
    let tags = Regex::new(r"(?is)<[^>]+>").expect("valid tag regex");
    let text = tags.replace_all(&without_scripts, " ");
    decode_entities(&text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Visible text of every `<table>` on the page, one string per table, in
/// document order.
pub(crate) fn table_texts(html: &str) -> Vec<String> {
    let table = Regex::new(r"(?is)<table[^>]*>(.*?)</table>").expect("valid table regex");
    table
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| strip_tags(m.as_str()))
        .collect()
}

/// Raw HTML of the first `<table>` after the element carrying `id`, bounded
/// by the next element carrying any other id in `boundary_ids`. The bound
/// keeps a block that renders without its own table from stealing the next
/// block's table.
pub(crate) fn table_after_id<'a>(
    html: &'a str,
    id: &str,
    boundary_ids: &[&str],
) -> Option<&'a str> {
    let start = id_marker(id).find(html)?.end();
    let mut tail = &html[start..];
    for other in boundary_ids {
        if *other == id {
            continue;
        }
        if let Some(boundary) = id_marker(other).find(tail) {
            tail = &tail[..boundary.start()];
        }
    }
    let table = Regex::new(r"(?is)<table[^>]*>.*?</table>").expect("valid table regex");
    table.find(tail).map(|m| m.as_str())
}

/// Rows of one table's HTML, each row as its stripped cell texts. Empty
/// cells stay in place so column positions survive.
pub(crate) fn table_rows(table_html: &str) -> Vec<Vec<String>> {
    let row = Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("valid row regex");
    let cell = Regex::new(r"(?is)<t[dh][^>]*>(.*?)</t[dh]>").expect("valid cell regex");
    row.captures_iter(table_html)
        .filter_map(|caps| caps.get(1))
        .map(|row_html| {
            cell.captures_iter(row_html.as_str())
                .filter_map(|caps| caps.get(1))
                .map(|m| strip_tags(m.as_str()))
                .collect()
        })
        .collect()
}

fn id_marker(id: &str) -> Regex {
    Regex::new(&format!(r#"id\s*=\s*["']{}["']"#, regex::escape(id))).expect("valid id regex")
}

fn decode_entities(text: &str) -> String {
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    let numeric = Regex::new(r"&#(\d+);").expect("valid entity regex");
    let text = numeric.replace_all(&text, |caps: &regex::Captures<'_>| {
        caps[1]
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map_or_else(String::new, |c| c.to_string())
    });
    // Ampersand last so doubly escaped text does not decode twice.
    text.replace("&amp;", "&")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_tags_collapses_whitespace_and_drops_scripts() {
        let html = "<div>\n  朝食 <b>トースト</b>\n<script>var x = '<table>';</script></div>";
        assert_eq!(strip_tags(html), "朝食 トースト");
    }

    #[test]
    fn strip_tags_decodes_common_entities() {
        assert_eq!(strip_tags("A&amp;B&nbsp;&#12497;&#12531;"), "A&B パン");
    }

    #[test]
    fn table_texts_returns_one_string_per_table() {
        let html = "<table><tr><td>エネルギー 300kcal</td></tr></table>\
                    <p>間</p><table><tr><td>脂質 12.5g</td></tr></table>";
        let texts = table_texts(html);
        assert_eq!(texts, vec!["エネルギー 300kcal", "脂質 12.5g"]);
    }

    #[test]
    fn table_after_id_finds_the_blocks_own_table() {
        let html = r#"<div id="meal_breakfast"><table><tr><td>パン</td></tr></table></div>
                      <div id="meal_lunch"><table><tr><td>そば</td></tr></table></div>"#;
        let table = table_after_id(html, "meal_breakfast", &["meal_breakfast", "meal_lunch"]);
        assert!(table.unwrap().contains("パン"));
        let table = table_after_id(html, "meal_lunch", &["meal_breakfast", "meal_lunch"]);
        assert!(table.unwrap().contains("そば"));
    }

    #[test]
    fn table_after_id_does_not_steal_the_next_blocks_table() {
        let html = r#"<div id="meal_breakfast"></div>
                      <div id="meal_lunch"><table><tr><td>そば</td></tr></table></div>"#;
        let table = table_after_id(html, "meal_breakfast", &["meal_breakfast", "meal_lunch"]);
        assert_eq!(table, None);
    }

    #[test]
    fn table_after_id_handles_single_quoted_ids() {
        let html = "<div id='meal_dinner'><table><tr><td>鮭</td></tr></table></div>";
        let table = table_after_id(html, "meal_dinner", &["meal_dinner"]);
        assert!(table.unwrap().contains("鮭"));
    }

    #[test]
    fn table_rows_preserves_empty_cells() {
        let html = "<table>\
                    <tr><th>品名</th><th>量</th><th>カロリー</th></tr>\
                    <tr><td>パン</td><td></td><td>300 kcal</td></tr>\
                    </table>";
        let rows = table_rows(html);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["品名", "量", "カロリー"]);
        assert_eq!(rows[1], vec!["パン", "", "300 kcal"]);
    }
}
