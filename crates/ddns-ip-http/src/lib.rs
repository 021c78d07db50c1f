// # HTTP IP Resolver
//
// This crate provides the public IP resolver for the DDNS client.
//
// ## Architecture
//
// Fetches the current public IP from an external plain-text lookup service
// (by default members.3322.org). One GET per call, bounded by a 5 second timeout,
// no retry and no caching: the poll loop asks again on its next tick.

use ddns_core::traits::IpResolver;
use ddns_core::{Error, Result, normalize_lookup_body};

use std::net::Ipv4Addr;
use std::time::Duration;

/// HTTP timeout for every lookup
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Name used in errors and logs
const SERVICE: &str = "public-ip";

/// Build the HTTP client shared by all lookups
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("ddnsclient/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
}

/// Map a reqwest failure to a timeout or network error
fn request_error(service: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout(service, err.to_string())
    } else {
        Error::network(service, err.to_string())
    }
}

/// GET `request` and return its trimmed body; non-2xx is an error
async fn fetch_text(service: &str, request: reqwest::RequestBuilder) -> Result<String> {
    let response = request.send().await.map_err(|e| request_error(service, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::http_status(service, status.as_u16()));
    }

    let body = response.text().await.map_err(|e| request_error(service, e))?;

    Ok(normalize_lookup_body(&body))
}

/// Public IP resolver backed by a plain-text HTTP lookup service
#[derive(Debug, Clone)]
pub struct HttpIpResolver {
    /// URL to fetch the IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Create a resolver for `url` with the default 5 second timeout
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(url, build_client(DEFAULT_HTTP_TIMEOUT)?))
    }

    /// Create a resolver that reuses an existing client
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// The lookup URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpResolver for HttpIpResolver {
    async fn current_ip(&self) -> Result<String> {
        let ip = fetch_text(SERVICE, self.client.get(&self.url)).await?;

        // An A record can only hold an IPv4 address
        if ip.parse::<Ipv4Addr>().is_err() {
            return Err(Error::invalid_response(
                SERVICE,
                format!("not an IPv4 address: {:?}", ip),
            ));
        }

        tracing::debug!(%ip, url = %self.url, "Resolved public ip");
        Ok(ip)
    }
}
