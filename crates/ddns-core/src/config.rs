//! Configuration types for the DDNS client
//!
//! Everything here is set once at startup and read-only afterwards.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public IP lookup service (plain-text body)
pub const DEFAULT_PUBLIC_IP_URL: &str = "http://members.3322.org/dyndns/getip";

/// DNSPod HTTP-DNS resolver, queried with `?dn=<record>.<domain>`
pub const DEFAULT_RECORD_IP_URL: &str = "http://119.29.29.29/d";

/// DNSPod legacy API base
pub const DEFAULT_API_BASE: &str = "https://dnsapi.cn";

/// Default polling interval in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Longest accepted polling interval (one day)
pub const MAX_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Main polling configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Managed domain (e.g. "example.com")
    pub domain: String,

    /// Record label kept in sync (e.g. "home" for home.example.com)
    pub record: String,

    /// DNSPod login token, `<id>,<token>`
    /// ⚠️ NEVER log this value
    pub token: String,

    /// Seconds between ticks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// What to do when a tick is due while the previous one is still running
    #[serde(default)]
    pub overlap: OverlapPolicy,

    /// Lookup and API endpoints
    #[serde(default)]
    pub endpoints: Endpoints,
}

// Custom Debug implementation that hides the login token
impl std::fmt::Debug for PollConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollConfig")
            .field("domain", &self.domain)
            .field("record", &self.record)
            .field("token", &"<REDACTED>")
            .field("interval_secs", &self.interval_secs)
            .field("overlap", &self.overlap)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl PollConfig {
    /// Create a configuration with default interval, overlap policy and endpoints
    pub fn new(
        domain: impl Into<String>,
        record: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            record: record.into(),
            token: token.into(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            overlap: OverlapPolicy::default(),
            endpoints: Endpoints::default(),
        }
    }

    /// Set the polling interval
    pub fn with_interval_secs(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    /// Set the overlap policy
    pub fn with_overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    /// Replace the endpoints
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Polling interval as a `Duration`
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Fully qualified name of the managed record
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.record, self.domain)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interval_secs == 0 {
            return Err(crate::Error::config("interval must be > 0 seconds"));
        }
        if self.interval_secs > MAX_INTERVAL_SECS {
            return Err(crate::Error::config(format!(
                "interval must be at most {} seconds. Got: {}",
                MAX_INTERVAL_SECS, self.interval_secs
            )));
        }

        validate_domain_name(&self.domain)?;
        validate_record_label(&self.record)?;

        match self.token.split_once(',') {
            Some((id, secret)) if !id.trim().is_empty() && !secret.trim().is_empty() => {}
            _ => {
                return Err(crate::Error::config(
                    "token must have the form <id>,<token> (a DNSPod login token)",
                ));
            }
        }

        self.endpoints.validate()
    }
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

/// Overlap handling for ticks dispatched while a previous tick is still in flight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Skip the new tick
    #[default]
    Skip,
    /// Run it anyway; ticks may race on the update call
    Allow,
}

/// Endpoints used by the resolver, reader and updater
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Public IP lookup URL
    pub public_ip_url: String,
    /// HTTP-DNS URL used to read the published record IP
    pub record_ip_url: String,
    /// Provider API base; `Record.List` and `Record.Modify` are appended
    pub api_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            public_ip_url: DEFAULT_PUBLIC_IP_URL.to_string(),
            record_ip_url: DEFAULT_RECORD_IP_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Endpoints {
    /// Validate that every endpoint is an http(s) URL
    pub fn validate(&self) -> Result<(), crate::Error> {
        for (name, url) in [
            ("public IP URL", &self.public_ip_url),
            ("record IP URL", &self.record_ip_url),
            ("API base", &self.api_base),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(crate::Error::config(format!(
                    "{} must use HTTP or HTTPS scheme. Got: {}",
                    name, url
                )));
            }
        }
        Ok(())
    }
}

/// Basic DNS domain name validation per RFC 1035
fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("domain cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "domain too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    for label in domain.split('.') {
        validate_label(label, domain)?;
    }

    Ok(())
}

/// The record is looked up as `<record>.<domain>`, so apex (`@`) and wildcard
/// (`*`) labels cannot be kept in sync
fn validate_record_label(record: &str) -> Result<(), crate::Error> {
    if record.is_empty() {
        return Err(crate::Error::config("record cannot be empty"));
    }

    if record.split('.').any(|label| label == "@" || label == "*") {
        return Err(crate::Error::config(format!(
            "apex and wildcard records are not supported. Got: '{}'",
            record
        )));
    }

    for label in record.split('.') {
        validate_label(label, record)?;
    }

    Ok(())
}

fn validate_label(label: &str, whole: &str) -> Result<(), crate::Error> {
    if label.is_empty() {
        return Err(crate::Error::config(format!(
            "name has empty label: '{}'",
            whole
        )));
    }

    if label.len() > 63 {
        return Err(crate::Error::config(format!(
            "label too long: {} chars (max 63). Label: '{}'",
            label.len(),
            label
        )));
    }

    if !label.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
        return Err(crate::Error::config(format!(
            "label contains invalid characters. Label: '{}'",
            label
        )));
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err(crate::Error::config(format!(
            "label cannot start or end with hyphen. Label: '{}'",
            label
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> PollConfig {
        PollConfig::new("example.com", "test.ddns", "12345,abcdef")
    }

    #[test]
    fn defaults_match_cli_defaults() {
        let config = valid();
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.overlap, OverlapPolicy::Skip);
        assert_eq!(config.endpoints.api_base, "https://dnsapi.cn");
        assert_eq!(config.fqdn(), "test.ddns.example.com");
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid().validate().is_ok());
        assert!(
            PollConfig::new("example.com", "home", "1,a")
                .with_interval_secs(MAX_INTERVAL_SECS)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn oversized_interval_rejected() {
        for secs in [MAX_INTERVAL_SECS + 1, u64::MAX] {
            let err = valid().with_interval_secs(secs).validate().unwrap_err();
            assert!(matches!(err, crate::Error::Config(_)), "interval {} accepted", secs);
        }
    }

    #[test]
    fn apex_and_wildcard_records_rejected() {
        for record in ["@", "*", "*.home", "home.*"] {
            let err = PollConfig::new("example.com", record, "1,a")
                .validate()
                .unwrap_err();
            assert!(err.to_string().contains("not supported"), "record {:?}", record);
        }
    }

    #[test]
    fn zero_interval_rejected() {
        let err = valid().with_interval_secs(0).validate().unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn malformed_token_rejected() {
        for token in ["", "no-comma", ",secret", "id,"] {
            let config = PollConfig::new("example.com", "test", token);
            assert!(config.validate().is_err(), "token {:?} should be rejected", token);
        }
    }

    #[test]
    fn bad_names_rejected() {
        assert!(PollConfig::new("", "test", "1,a").validate().is_err());
        assert!(PollConfig::new("example..com", "test", "1,a").validate().is_err());
        assert!(PollConfig::new("example.com", "-bad", "1,a").validate().is_err());
        assert!(PollConfig::new("example.com", "has space", "1,a").validate().is_err());
    }

    #[test]
    fn non_http_endpoint_rejected() {
        let endpoints = Endpoints {
            api_base: "ftp://dnsapi.cn".to_string(),
            ..Endpoints::default()
        };
        assert!(valid().with_endpoints(endpoints).validate().is_err());
    }

    #[test]
    fn token_not_exposed_in_debug() {
        let debug = format!("{:?}", valid());
        assert!(!debug.contains("abcdef"));
        assert!(debug.contains("<REDACTED>"));
    }
}
