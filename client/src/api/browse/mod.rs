//! Browse query construction and paged fetch.

pub mod normalize;
pub mod browse_cql;
pub mod compose;

mod browse_request;
pub use browse_request::{BrowseParams, BrowseRequest, build_browse_request};

mod browse_for_results;
pub use browse_for_results::BrowseFetcher;
