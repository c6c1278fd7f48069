//! Fixed browse request constants.

pub const BROWSE_RESULTS_COUNT: u64 = 100;
pub const PRECEDING_RECORDS_COUNT: u64 = 5;

/// Stand-in for an empty free-text query, kept so the query clause is still
/// built when paging by anchor.
pub const UNDEFINED_AS_STRING: &str = "undefined";
