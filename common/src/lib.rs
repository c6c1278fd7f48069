//! Browse models shared by everything that talks to the inventory browse API.

extern crate serde;


pub mod browse_query;
pub mod browse_result;
pub mod browse_config;
pub mod search_const;
pub mod url_param;
