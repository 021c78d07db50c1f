//! HTTP plumbing shared by the DNSPod calls

use ddns_core::{Error, Result, normalize_lookup_body};
use std::time::Duration;

/// HTTP timeout for every DNSPod request
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Build an HTTP client bounded by `timeout`
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("ddnsclient/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
}

/// Map a reqwest failure to a timeout or network error
pub(crate) fn request_error(service: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout(service, err.to_string())
    } else {
        Error::network(service, err.to_string())
    }
}

/// Send `request` and return its trimmed body; non-2xx is an error
pub(crate) async fn fetch_text(service: &str, request: reqwest::RequestBuilder) -> Result<String> {
    let response = request.send().await.map_err(|e| request_error(service, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::http_status(service, status.as_u16()));
    }

    let body = response.text().await.map_err(|e| request_error(service, e))?;
    Ok(normalize_lookup_body(&body))
}
