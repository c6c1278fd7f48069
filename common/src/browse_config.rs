//! Lookup tables that map search indexes and facet keys onto the browse API.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::search_const::{BROWSE_RESULTS_COUNT, PRECEDING_RECORDS_COUNT};


pub const CALL_NUMBER_INDEXES: [&str; 7] = ["callNumbers", "dewey", "lc", "local", "nlm", "other", "sudoc"];
pub const CALL_NUMBER_TYPE_INDEXES: [&str; 6] = ["dewey", "lc", "local", "nlm", "other", "sudoc"];

const CALL_NUMBERS_PATH: &str = "browse/call-numbers/instances";
const CONTRIBUTORS_PATH: &str = "browse/contributors/instances";
const SUBJECTS_PATH: &str = "browse/subjects/instances";

const FACETS_TO_REQUEST: [(&str, &str); 13] = [
    ("effectiveLocation", "items.effectiveLocationId"),
    ("language", "languages"),
    ("resource", "instanceTypeId"),
    ("format", "instanceFormatIds"),
    ("mode", "modeOfIssuanceId"),
    ("natureOfContent", "natureOfContentTermIds"),
    ("staffSuppress", "staffSuppress"),
    ("discoverySuppress", "discoverySuppress"),
    ("statisticalCodeIds", "statisticalCodeIds"),
    ("materialType", "items.materialTypeId"),
    ("holdingsPermanentLocation", "holdings.permanentLocationId"),
    ("nameType", "contributorNameTypeId"),
    ("shared", "shared"),
];


/// Every index-dependent decision the query builder makes is a lookup in
/// one of these tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    pub facets_to_request: BTreeMap<String, String>,
    pub initial_fields: BTreeMap<String, String>,
    pub pagination_fields: BTreeMap<String, String>,
    pub paths: BTreeMap<String, String>,
    pub call_number_type_indexes: BTreeSet<String>,
    pub limit: u64,
    pub preceding_records_count: u64,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        let mut initial_fields = BTreeMap::new();
        let mut pagination_fields = BTreeMap::new();
        let mut paths = BTreeMap::new();

        for index in CALL_NUMBER_INDEXES {
            initial_fields.insert(index.to_string(), "callNumber".to_string());
            pagination_fields.insert(index.to_string(), "shelfKey".to_string());
            paths.insert(index.to_string(), CALL_NUMBERS_PATH.to_string());
        }
        for (index, field, path) in [
            ("contributors", "name", CONTRIBUTORS_PATH),
            ("browseSubjects", "value", SUBJECTS_PATH),
        ] {
            initial_fields.insert(index.to_string(), field.to_string());
            pagination_fields.insert(index.to_string(), field.to_string());
            paths.insert(index.to_string(), path.to_string());
        }

        BrowseConfig {
            facets_to_request: FACETS_TO_REQUEST
                .iter()
                .map(|(key, facet)| (key.to_string(), facet.to_string()))
                .collect(),
            initial_fields,
            pagination_fields,
            paths,
            call_number_type_indexes: CALL_NUMBER_TYPE_INDEXES.iter().map(|i| i.to_string()).collect(),
            limit: BROWSE_RESULTS_COUNT,
            preceding_records_count: PRECEDING_RECORDS_COUNT,
        }
    }
}

impl BrowseConfig {
    /// Server facet name for a UI facet key; unknown keys pass through.
    pub fn facet_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.facets_to_request.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn path_for(&self, qindex: &str) -> Option<&str> {
        self.paths.get(qindex).map(String::as_str)
    }

    pub fn initial_field(&self, qindex: &str) -> Option<&str> {
        self.initial_fields.get(qindex).map(String::as_str)
    }

    pub fn pagination_field(&self, qindex: &str) -> Option<&str> {
        self.pagination_fields.get(qindex).map(String::as_str)
    }

    pub fn uses_call_number_type(&self, qindex: &str) -> bool {
        self.call_number_type_indexes.contains(qindex)
    }

    /// An index can be browsed only when all three index tables know it.
    pub fn is_browsable(&self, qindex: &str) -> bool {
        self.path_for(qindex).is_some()
            && self.initial_field(qindex).is_some()
            && self.pagination_field(qindex).is_some()
    }
}
