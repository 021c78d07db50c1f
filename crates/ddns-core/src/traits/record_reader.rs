// # Record Reader Trait
//
// Defines the interface for reading what the provider currently publishes.
//
// ## Implementations
//
// - DNSPod: `ddns-provider-dnspod` crate

use async_trait::async_trait;

use crate::record::RecordList;

/// Trait for reading DNS records
///
/// The auth token is held by the implementation, never passed per call.
#[async_trait]
pub trait RecordReader: Send + Sync {
    /// Get the IP currently published for `<record>.<domain>`
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The published value, whitespace trimmed
    /// - `Err(Error)`: Network error or timeout
    async fn record_ip(&self, record: &str, domain: &str) -> Result<String, crate::Error>;

    /// List every record under `domain`
    ///
    /// # Returns
    ///
    /// The raw, undecoded reply body
    async fn list_records(&self, domain: &str) -> Result<String, crate::Error>;

    /// Resolve the provider identifier of the A record `record` on `domain`
    ///
    /// Lists the domain once and scans the listing in provider order. The first entry
    /// whose name matches decides the outcome.
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The record identifier
    /// - `Err(Error::RecordTypeMismatch)`: The first match is not an A record
    /// - `Err(Error::RecordNotFound)`: Nothing matches; the record must be created by hand
    async fn resolve_record_id(&self, record: &str, domain: &str) -> Result<String, crate::Error> {
        let raw = self.list_records(domain).await?;
        let listing = RecordList::from_json(&raw)?;
        tracing::debug!(
            domain,
            count = listing.records.len(),
            "Listed domain records"
        );
        listing.find_record_id(record, domain)
    }
}
