//! HTTP access to the Okapi gateway that fronts the browse endpoints.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::config::OkapiConfig;
use crate::error::{BrowseError, Result};


/// GET with query-string serialization and JSON decoding. Kept behind a
/// trait so the fetch layer can run against something other than a live
/// gateway.
#[async_trait]
pub trait BrowseTransport: Send + Sync {
    async fn get_json(&self, path: &str, params: &[(String, String)]) -> Result<serde_json::Value>;
}


pub struct OkapiTransport {
    client: reqwest::Client,
    base_url: String,
}

impl OkapiTransport {
    pub fn new(config: &OkapiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(tenant) = &config.tenant {
            headers.insert("X-Okapi-Tenant", header_value(tenant)?);
        }
        if let Some(token) = &config.token {
            let mut value = header_value(token)?;
            value.set_sensitive(true);
            headers.insert("X-Okapi-Token", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(OkapiTransport {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| BrowseError::Config(format!("invalid header value: {e}")))
}

#[async_trait]
impl BrowseTransport for OkapiTransport {
    async fn get_json(&self, path: &str, params: &[(String, String)]) -> Result<serde_json::Value> {
        let url = self.url_for(path);
        let t0 = Instant::now();

        let response = self.client.get(&url).query(params).send().await?;
        let status = response.status();
        let response_txt = response.text().await?;
        if status.is_client_error() || status.is_server_error() {
            warn!(%url, status = status.as_u16(), "browse request rejected");
            return Err(BrowseError::Http {
                status: status.as_u16(),
                body: response_txt,
            });
        }

        debug!(%url, len = response_txt.len(), elapsed_ms = t0.elapsed().as_millis() as u64, "browse response");
        Ok(serde_json::from_str(&response_txt)?)
    }
}
