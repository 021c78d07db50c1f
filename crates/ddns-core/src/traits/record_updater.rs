// # Record Updater Trait
//
// Defines the interface for pushing a new IP value to the DNS provider.
//
// ## Implementations
//
// - DNSPod: `ddns-provider-dnspod` crate

use async_trait::async_trait;

/// Trait for updating an existing A record
///
/// Updaters are single-shot: one API call per invocation, no retry, no creation of
/// missing records. Deciding whether an update is needed belongs to the poll loop.
#[async_trait]
pub trait RecordUpdater: Send + Sync {
    /// Set the A record `record_id` (label `record` on `domain`) to `new_ip`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider acknowledged the change
    /// - `Err(Error::UpdateRejected)`: The provider replied without acknowledging;
    ///   the error displays the raw reply
    /// - `Err(Error)`: Network error or timeout
    async fn update(
        &self,
        record: &str,
        domain: &str,
        record_id: &str,
        new_ip: &str,
    ) -> Result<(), crate::Error>;
}
