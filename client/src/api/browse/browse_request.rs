//! Turns filter state plus a page cursor into one browse GET request.

use common::{
    browse_config::BrowseConfig,
    browse_query::{FilterSet, PageCursor, PageDirection},
};
use serde::Serialize;

use crate::api::browse::browse_cql::{initial_page_query, is_structured_query, subsequent_page_query};
use crate::api::browse::compose::build_filter_query;
use crate::api::browse::normalize::normalize_filters;
use crate::error::{BrowseError, Result};


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseParams {
    pub highlight_match: bool,
    pub limit: u64,
    pub preceding_records_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_number_type: Option<String>,
    pub query: String,
}

impl BrowseParams {
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("highlightMatch".to_string(), self.highlight_match.to_string()),
            ("limit".to_string(), self.limit.to_string()),
            ("precedingRecordsCount".to_string(), self.preceding_records_count.to_string()),
        ];
        if let Some(call_number_type) = &self.call_number_type {
            pairs.push(("callNumberType".to_string(), call_number_type.clone()));
        }
        pairs.push(("query".to_string(), self.query.clone()));
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowseRequest {
    pub path: String,
    pub params: BrowseParams,
}


/// `Ok(None)` means there is nothing to ask the server: no search index, or
/// no active filter.
pub fn build_browse_request(
    filters: &FilterSet,
    cursor: &PageCursor,
    config: &BrowseConfig,
) -> Result<Option<BrowseRequest>> {
    let Some(qindex) = filters.qindex.as_deref() else {
        return Ok(None);
    };
    if !filters.has_active_filters() {
        return Ok(None);
    }

    let unknown = || BrowseError::UnknownSearchIndex(qindex.to_string());
    if !config.is_browsable(qindex) {
        return Err(unknown());
    }
    let path = config.path_for(qindex).ok_or_else(unknown)?;

    let normalized = normalize_filters(filters, config);
    let search_text = normalized.query.text();

    let query = if cursor.is_initial() {
        let field = config.initial_field(qindex).ok_or_else(unknown)?;
        // the "undefined" stand-in is windowed like any typed anchor
        build_filter_query(&normalized, |term| initial_page_query(term.as_str(), field))
    } else {
        let field = config.pagination_field(qindex).ok_or_else(unknown)?;
        let direction = cursor.direction.unwrap_or(PageDirection::Next);
        let anchor = cursor
            .anchor
            .as_deref()
            .ok_or(BrowseError::MissingAnchor(direction))?;
        build_filter_query(&normalized, |_term| subsequent_page_query(field, direction, anchor))
    };

    let call_number_type = search_text
        .filter(|_| config.uses_call_number_type(qindex))
        .map(|_| qindex.to_string());

    Ok(Some(BrowseRequest {
        path: path.to_string(),
        params: BrowseParams {
            highlight_match: search_text.is_some_and(|text| !is_structured_query(text)),
            limit: config.limit,
            preceding_records_count: config.preceding_records_count,
            call_number_type,
            query,
        },
    }))
}


#[cfg(test)]
mod tests {
    use super::*;

    fn request(filters: &FilterSet, cursor: &PageCursor) -> BrowseRequest {
        build_browse_request(filters, cursor, &BrowseConfig::default())
            .unwrap()
            .expect("request expected")
    }

    #[test]
    fn no_filter_no_request() {
        let config = BrowseConfig::default();
        let cursor = PageCursor::initial();
        assert_eq!(build_browse_request(&FilterSet::default(), &cursor, &config).unwrap(), None);
        assert_eq!(build_browse_request(&FilterSet::new("contributors"), &cursor, &config).unwrap(), None);

        let no_index = FilterSet::default().with_query("smith");
        assert_eq!(build_browse_request(&no_index, &cursor, &config).unwrap(), None);
    }

    #[test]
    fn initial_page_centres_on_anchor() {
        let filters = FilterSet::new("contributors").with_query("smith");
        let request = request(&filters, &PageCursor::initial());

        assert_eq!(request.path, "browse/contributors/instances");
        assert_eq!(request.params.query, r#"name>="smith" or name<"smith""#);
        assert!(request.params.highlight_match);
        assert_eq!(request.params.limit, 100);
        assert_eq!(request.params.preceding_records_count, 5);
        assert_eq!(request.params.call_number_type, None);
    }

    #[test]
    fn structured_query_is_not_highlighted() {
        let filters = FilterSet::new("browseSubjects").with_query("a and b");
        let request = request(&filters, &PageCursor::initial());
        assert_eq!(request.params.query, "a and b");
        assert!(!request.params.highlight_match);
    }

    #[test]
    fn later_pages_use_pagination_field_and_anchor() {
        let filters = FilterSet::new("lc").with_query("QA76");
        let cursor = PageCursor::initial().step(PageDirection::Next, r#"QA 76 "X""#);
        let request = request(&filters, &cursor);
        assert_eq!(request.params.query, r#"shelfKey > "QA 76 \"X\"""#);

        let cursor = cursor.step(PageDirection::Prev, "QA 70").step(PageDirection::Prev, "QA 60");
        assert_eq!(cursor.page_number, -1);
        assert_eq!(request_query(&filters, &cursor), r#"shelfKey < "QA 60""#);
    }

    fn request_query(filters: &FilterSet, cursor: &PageCursor) -> String {
        request(filters, cursor).params.query
    }

    #[test]
    fn call_number_type_only_for_allow_listed_index_with_query() {
        let typed = request(&FilterSet::new("dewey").with_query("595"), &PageCursor::initial());
        assert_eq!(typed.params.call_number_type.as_deref(), Some("dewey"));

        let all = request(&FilterSet::new("callNumbers").with_query("595"), &PageCursor::initial());
        assert_eq!(all.params.call_number_type, None);

        let facet_only = FilterSet::new("dewey").with_facet("effectiveLocation", ["loc-1"]);
        let facet_only = request(&facet_only, &PageCursor::initial());
        assert_eq!(facet_only.params.call_number_type, None);
        assert!(!facet_only.params.highlight_match);
    }

    #[test]
    fn facet_only_browse_pages_by_anchor() {
        let filters = FilterSet::new("contributors").with_facet("nameType", ["personal"]);

        let first = request(&filters, &PageCursor::initial());
        assert_eq!(
            first.params.query,
            r#"name>="undefined" or name<"undefined" and contributorNameTypeId=="personal""#
        );
        assert!(!first.params.highlight_match);

        let next = request(&filters, &PageCursor::initial().step(PageDirection::Next, "Doe"));
        assert_eq!(next.params.query, r#"name > "Doe" and contributorNameTypeId=="personal""#);
    }

    #[test]
    fn index_missing_from_any_table_is_an_error() {
        let mut config = BrowseConfig::default();
        config.pagination_fields.remove("contributors");
        let filters = FilterSet::new("contributors").with_query("x");
        let err = build_browse_request(&filters, &PageCursor::initial(), &config).unwrap_err();
        assert!(matches!(err, BrowseError::UnknownSearchIndex(index) if index == "contributors"));
    }

    #[test]
    fn unknown_index_is_an_error() {
        let filters = FilterSet::new("title").with_query("x");
        let err = build_browse_request(&filters, &PageCursor::initial(), &BrowseConfig::default()).unwrap_err();
        assert!(matches!(err, BrowseError::UnknownSearchIndex(index) if index == "title"));
    }

    #[test]
    fn query_pairs_keep_parameter_order() {
        let request = request(&FilterSet::new("lc").with_query("QA"), &PageCursor::initial());
        let keys = request.params.to_query_pairs().into_iter().map(|(k, _)| k).collect::<Vec<_>>();
        assert_eq!(keys, ["highlightMatch", "limit", "precedingRecordsCount", "callNumberType", "query"]);
    }
}
