// # DNSPod DNS Provider
//
// This crate provides the DNSPod record reader and updater for the DDNS client.
//
// ## Operations
//
// - Read the published IP through DNSPod's HTTP-DNS resolver: GET `/d?dn=<fqdn>`
// - List records of a domain: POST `/Record.List`
// - Modify an A record: POST `/Record.Modify`
//
// Every call is a single request bounded by a 5 second timeout. Nothing is retried,
// cached or created here; the poll loop owns all of that.
//
// ## Security Requirements
//
// - The login token NEVER appears in logs or Debug output
//
// ## API Reference
//
// - Legacy API: https://docs.dnspod.cn/api/
// - HTTP-DNS: https://docs.dnspod.cn/httpdns/

mod http;

use async_trait::async_trait;
use ddns_core::config::Endpoints;
use ddns_core::traits::{RecordReader, RecordUpdater};
use ddns_core::{Error, Result};

use crate::http::{fetch_text, request_error};
pub use crate::http::{DEFAULT_HTTP_TIMEOUT, build_client};

/// Marker the API puts in the reply of a successful modification
const SUCCESS_MARKER: &str = "successful";

/// Record type written on every update
const RECORD_TYPE: &str = "A";

/// Default route ("默认" line)
const DEFAULT_LINE_ID: &str = "0";

/// DNSPod client
///
/// Implements both [`RecordReader`] and [`RecordUpdater`]; share one instance behind
/// an `Arc` for both roles.
pub struct DnspodClient {
    /// DNSPod login token, `<id>,<token>`
    /// ⚠️ NEVER log this value
    login_token: String,

    /// HTTP-DNS resolver URL
    record_ip_url: String,

    /// API base, without trailing slash
    api_base: String,

    /// HTTP client for all requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the login token
impl std::fmt::Debug for DnspodClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnspodClient")
            .field("login_token", &"<REDACTED>")
            .field("record_ip_url", &self.record_ip_url)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl DnspodClient {
    /// Create a client with the default 5 second timeout
    ///
    /// # Parameters
    ///
    /// - `login_token`: DNSPod login token (`<id>,<token>`)
    /// - `endpoints`: HTTP-DNS URL and API base (public IP URL is unused here)
    pub fn new(login_token: impl Into<String>, endpoints: &Endpoints) -> Result<Self> {
        Self::with_client(login_token, endpoints, build_client(DEFAULT_HTTP_TIMEOUT)?)
    }

    /// Create a client that reuses an existing HTTP client
    pub fn with_client(
        login_token: impl Into<String>,
        endpoints: &Endpoints,
        client: reqwest::Client,
    ) -> Result<Self> {
        let login_token = login_token.into();
        if login_token.is_empty() {
            return Err(Error::config("DNSPod login token cannot be empty"));
        }

        Ok(Self {
            login_token,
            record_ip_url: endpoints.record_ip_url.clone(),
            api_base: endpoints.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn api_url(&self, action: &str) -> String {
        format!("{}/{}", self.api_base, action)
    }

    /// POST a form to an API action and return the raw reply body
    ///
    /// The API answers 200 with a status block even for failures, so the status
    /// line is not inspected; callers judge the body.
    async fn post_form(&self, action: &str, form: &[(&str, &str)]) -> Result<String> {
        let service = format!("dnspod {}", action);
        tracing::debug!(action, "POST DNSPod API");

        let response = self
            .client
            .post(self.api_url(action))
            .form(form)
            .send()
            .await
            .map_err(|e| request_error(&service, e))?;

        tracing::debug!(action, status = response.status().as_u16(), "DNSPod API replied");

        response.text().await.map_err(|e| request_error(&service, e))
    }
}

#[async_trait]
impl RecordReader for DnspodClient {
    async fn record_ip(&self, record: &str, domain: &str) -> Result<String> {
        let fqdn = format!("{}.{}", record, domain);
        let request = self
            .client
            .get(&self.record_ip_url)
            .query(&[("dn", fqdn.as_str())]);

        let ip = fetch_text("record-ip", request).await?;
        tracing::debug!(%fqdn, %ip, "Resolved record ip");
        Ok(ip)
    }

    async fn list_records(&self, domain: &str) -> Result<String> {
        self.post_form(
            "Record.List",
            &[
                ("login_token", self.login_token.as_str()),
                ("domain", domain),
                ("format", "json"),
            ],
        )
        .await
    }
}

#[async_trait]
impl RecordUpdater for DnspodClient {
    async fn update(
        &self,
        record: &str,
        domain: &str,
        record_id: &str,
        new_ip: &str,
    ) -> Result<()> {
        let body = self
            .post_form(
                "Record.Modify",
                &[
                    ("login_token", self.login_token.as_str()),
                    ("sub_domain", record),
                    ("domain", domain),
                    ("record_id", record_id),
                    ("value", new_ip),
                    ("record_type", RECORD_TYPE),
                    ("format", "json"),
                    ("record_line_id", DEFAULT_LINE_ID),
                ],
            )
            .await?;

        // The reply is JSON, but only the marker decides success
        if body.contains(SUCCESS_MARKER) {
            Ok(())
        } else {
            Err(Error::update_rejected(body))
        }
    }
}
