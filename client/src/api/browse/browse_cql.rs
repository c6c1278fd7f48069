//! CQL builders for the two browse page shapes.

use std::sync::LazyLock;

use common::browse_query::PageDirection;
use regex::Regex;
use tracing::debug;


const COMPARISON: &str = r#"[\w.]+\s*(?:>=|<=|<>|==|=|>|<)\s*"(?:[^"\\]|\\.)*""#;

static STRUCTURED_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)^\s*(?:{COMPARISON}(?:\s+(?:and|or|not)\s+{COMPARISON})*|.*\S\s+(?:and|or|not)\s+\S.*)\s*$"
    );
    Regex::new(&pattern).expect("structured query pattern is valid")
});

/// True when the typed text is already a range or boolean expression rather
/// than a plain anchor. Gates both range expansion and `highlightMatch`.
pub fn is_structured_query(query: &str) -> bool {
    STRUCTURED_QUERY.is_match(query)
}

pub fn escape_quotes(text: &str) -> String {
    text.replace('"', "\\\"")
}

/// First page: a window centred on the typed anchor, unless the text is
/// already an expression, in which case it is used as is.
pub fn initial_page_query(query: &str, field: &str) -> String {
    if is_structured_query(query) {
        debug!(%query, "browse anchor sent as a CQL expression");
        return query.to_string();
    }
    let anchor = escape_quotes(query);
    [
        format!("{field}>=\"{anchor}\""),
        format!("{field}<\"{anchor}\""),
    ]
    .join(" or ")
}

/// Any later page: one comparison against the anchor the server handed back.
pub fn subsequent_page_query(field: &str, direction: PageDirection, anchor: &str) -> String {
    let op = if direction.is_prev() { "<" } else { ">" };
    format!("{field} {op} \"{}\"", escape_quotes(anchor))
}
