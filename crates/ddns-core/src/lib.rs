// # ddns-core
//
// Core library for the DNSPod dynamic DNS client.
//
// ## Architecture Overview
//
// This library provides everything except the HTTP plumbing and the binary:
// - **IpResolver**: Trait for discovering the host's current public IP
// - **RecordReader**: Trait for reading the published record IP and listing records
// - **RecordUpdater**: Trait for pushing a new IP to the provider
// - **Poller**: Polling loop that compares both IPs and updates on divergence
// - **PollService**: Start/stop shim suitable for an OS service manager
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from the HTTP implementations
// 2. **No Persistent State**: Only the record identifier is cached, for the process lifetime
// 3. **Log and Move On**: A failed tick is logged and retried on the next interval, never inline
// 4. **Library-First**: All core functionality can be used as a library

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod poller;
pub mod record;
pub mod traits;

// Re-export core types for convenience
pub use config::{Endpoints, OverlapPolicy, PollConfig};
pub use error::{Error, Result};
pub use lifecycle::{Lifecycle, PollService};
pub use poller::{LookupStage, PollComponents, PollEvent, Poller, TickOutcome};
pub use record::{DnsRecord, RecordList, normalize_lookup_body};
pub use traits::{IpResolver, RecordReader, RecordUpdater};
