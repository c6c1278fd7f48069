//! Inventory browse client: builds anchored range queries from browse
//! filters, fetches pages through a de-duplicating request cache and keeps
//! the forward/backward cursor.

pub mod api;
pub mod config;
pub mod error;
pub mod http_utils;
pub mod logging;
pub mod pagination;

pub use api::browse::{BrowseFetcher, BrowseRequest, build_browse_request};
pub use error::{BrowseError, Result};
pub use pagination::{BrowseSession, BrowseSnapshot, BrowseView, PaginationState};
