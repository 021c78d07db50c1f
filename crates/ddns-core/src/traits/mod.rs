//! Core traits for the DDNS client
//!
//! This module defines the three collaborators the poll loop depends on.
//!
//! - [`IpResolver`]: Discover the host's current public IP
//! - [`RecordReader`]: Read the published record IP, list records, resolve identifiers
//! - [`RecordUpdater`]: Push a new IP to the provider

pub mod ip_resolver;
pub mod record_reader;
pub mod record_updater;

pub use ip_resolver::IpResolver;
pub use record_reader::RecordReader;
pub use record_updater::RecordUpdater;
