use crate::core::error::FetchError;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "preciodolar/1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// GETs `url` and decodes the JSON body.
///
/// Non-2xx responses and bodies that do not match `T` are reported as
/// distinct [`FetchError`] variants.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T, FetchError> {
    debug!("Requesting {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::transport(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let text = response
        .text()
        .await
        .map_err(|e| FetchError::transport(url, e))?;
    if text.trim().is_empty() {
        return Err(FetchError::malformed(url, "empty body"));
    }

    serde_json::from_str(&text).map_err(|e| FetchError::malformed(url, e.to_string()))
}
