pub mod okapi_utils;
pub mod request_cache;
