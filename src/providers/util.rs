use crate::fetch::FetchError;
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = "sectorscope/0.1";
const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

/// Builds the HTTP client every provider uses: shared user agent and a
/// per-request timeout below the fetcher's overall deadline.
pub fn http_client() -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| FetchError::Unavailable(format!("failed to build HTTP client: {e}")))
}

/// GET a JSON document, classifying transport and decode failures.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Unavailable(format!("request error for {url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Unavailable(format!("HTTP {status} for {url}")));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| FetchError::Malformed(format!("failed to decode response from {url}: {e}")))
}

/// GET a plain-text document (the R&D dataset ships as CSV, not JSON).
pub async fn get_text(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Unavailable(format!("request error for {url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Unavailable(format!("HTTP {status} for {url}")));
    }

    response
        .text()
        .await
        .map_err(|e| FetchError::Malformed(format!("failed to read response from {url}: {e}")))
}
