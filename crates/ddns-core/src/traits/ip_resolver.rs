// # IP Resolver Trait
//
// Defines the interface for discovering the host's current public IP address.
//
// ## Implementations
//
// - HTTP lookup service: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* IpResolver implementation */;
//     let ip = resolver.current_ip().await?;
//     println!("public ip: {ip}");
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for public IP discovery
///
/// Implementations must be thread-safe: ticks may run on separate tasks.
///
/// Resolvers are single-shot. They perform one lookup per call, never retry and
/// never cache; the poll loop owns scheduling and tries again on the next tick.
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Get the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The IP, with surrounding whitespace trimmed
    /// - `Err(Error)`: Network error, timeout, or an unusable response
    async fn current_ip(&self) -> Result<String, crate::Error>;
}
