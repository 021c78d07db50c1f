//! Polling loop
//!
//! The Poller is responsible for:
//! - Resolving the host's public IP via IpResolver
//! - Reading the published record IP via RecordReader
//! - Updating the record via RecordUpdater when the two diverge
//! - Dispatching one tick immediately, then one per interval, until stopped
//!
//! ## Architecture
//!
//! ```text
//!        ┌──────────────┐   interval / stop   ┌──────────────┐
//!        │  run() loop  │────── dispatch ────▶│ tick (spawn) │
//!        └──────────────┘                     └──────────────┘
//!                                                    │
//!         ┌──────────────────────────┬───────────────┴───────────┐
//!         ▼                          ▼                           ▼
//! ┌──────────────┐          ┌──────────────┐            ┌──────────────┐
//! │ IpResolver   │          │ RecordReader │            │ RecordUpdater│
//! │ (public ip)  │          │ (record ip)  │            │ (on change)  │
//! └──────────────┘          └──────────────┘            └──────────────┘
//! ```
//!
//! ## Tick Flow
//!
//! 1. Resolve the public IP; on failure abort the tick
//! 2. Resolve the record IP; on failure abort the tick
//! 3. Equal: nothing to do
//! 4. Different: one update call with the cached record identifier
//! 5. Emit the outcome for monitoring/testing
//!
//! Nothing is retried inline. The next attempt is the next scheduled tick.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::{OverlapPolicy, PollConfig};
use crate::error::{Error, Result};
use crate::record::normalize_lookup_body;
use crate::traits::{IpResolver, RecordReader, RecordUpdater};

/// Which lookup failed during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStage {
    /// Public IP lookup
    PublicIp,
    /// Published record IP lookup
    RecordIp,
}

impl fmt::Display for LookupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupStage::PublicIp => f.write_str("public ip"),
            LookupStage::RecordIp => f.write_str("record ip"),
        }
    }
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Record already carries the public IP
    Unchanged { ip: String },

    /// Record was updated
    Updated {
        previous: String,
        current: String,
    },

    /// The provider did not accept the update
    UpdateFailed {
        current: String,
        record_ip: String,
        error: String,
    },

    /// One of the two lookups failed, nothing was compared
    LookupFailed {
        stage: LookupStage,
        error: String,
    },

    /// The previous tick was still in flight, this one did not run
    Overlapped,
}

impl TickOutcome {
    fn lookup_failed(stage: LookupStage, error: &Error) -> Self {
        TickOutcome::LookupFailed {
            stage,
            error: error.to_string(),
        }
    }

    /// Whether an update call was made during this tick
    pub fn attempted_update(&self) -> bool {
        matches!(
            self,
            TickOutcome::Updated { .. } | TickOutcome::UpdateFailed { .. }
        )
    }
}

/// Events emitted by the Poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// Scheduling started
    Started {
        fqdn: String,
        record_id: String,
    },

    /// A tick finished (or was skipped)
    Tick(TickOutcome),

    /// Scheduling stopped; ticks already in flight may still report
    Stopped,
}

/// The three collaborators a Poller drives
#[derive(Clone)]
pub struct PollComponents {
    pub ip_resolver: Arc<dyn IpResolver>,
    pub record_reader: Arc<dyn RecordReader>,
    pub record_updater: Arc<dyn RecordUpdater>,
}

impl PollComponents {
    /// Bundle the collaborators
    pub fn new(
        ip_resolver: Arc<dyn IpResolver>,
        record_reader: Arc<dyn RecordReader>,
        record_updater: Arc<dyn RecordUpdater>,
    ) -> Self {
        Self {
            ip_resolver,
            record_reader,
            record_updater,
        }
    }
}

/// Core polling loop
///
/// Holds the read-only configuration and the record identifier resolved at startup.
/// Ticks run on their own tasks, so a Poller is shared behind an `Arc`.
///
/// ## Lifecycle
///
/// 1. Create with [`Poller::bootstrap()`] (resolves the record identifier) or
///    [`Poller::new()`] when the identifier is already known
/// 2. Optionally subscribe with [`Poller::with_events()`]
/// 3. Run with [`Poller::run()`] until the stop signal fires
///
/// ## Overlapping ticks
///
/// Dispatch is fire-and-forget. With [`OverlapPolicy::Skip`] a tick that comes due
/// while the previous one is still running is skipped; with [`OverlapPolicy::Allow`]
/// both run and may race on the update call.
pub struct Poller {
    /// Public IP discovery
    ip_resolver: Arc<dyn IpResolver>,

    /// Published record IP
    record_reader: Arc<dyn RecordReader>,

    /// Record updates
    record_updater: Arc<dyn RecordUpdater>,

    /// Read-only configuration
    config: PollConfig,

    /// Record identifier, resolved once per process
    record_id: String,

    /// Set while a guarded tick is running
    in_flight: Arc<AtomicBool>,

    /// Event sender for external monitoring
    event_tx: Option<mpsc::Sender<PollEvent>>,
}

impl Poller {
    /// Create a poller for an already-resolved record identifier
    pub fn new(
        config: PollConfig,
        record_id: impl Into<String>,
        components: PollComponents,
    ) -> Result<Self> {
        config.validate()?;

        let record_id = record_id.into();
        if record_id.is_empty() {
            return Err(Error::config("record id cannot be empty"));
        }

        Ok(Self {
            ip_resolver: components.ip_resolver,
            record_reader: components.record_reader,
            record_updater: components.record_updater,
            config,
            record_id,
            in_flight: Arc::new(AtomicBool::new(false)),
            event_tx: None,
        })
    }

    /// Validate the configuration, resolve the record identifier and build the poller
    ///
    /// Any error here is fatal: without a valid identifier there is nothing to update.
    pub async fn bootstrap(config: PollConfig, components: PollComponents) -> Result<Self> {
        config.validate()?;

        let record_id = components
            .record_reader
            .resolve_record_id(&config.record, &config.domain)
            .await?;
        info!(fqdn = %config.fqdn(), %record_id, "Getting record id");

        Self::new(config, record_id, components)
    }

    /// Attach a bounded event channel
    ///
    /// When the channel is full, events are dropped with a warning.
    pub fn with_events(mut self, capacity: usize) -> (Self, mpsc::Receiver<PollEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.event_tx = Some(tx);
        (self, rx)
    }

    /// The record identifier every update targets
    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    /// Run a single tick and report what happened
    pub async fn run_once(&self) -> TickOutcome {
        let current_ip = match self.ip_resolver.current_ip().await {
            Ok(ip) => normalize_lookup_body(&ip),
            Err(e) => {
                error!(error = %e, "Failed to get current public ip");
                return TickOutcome::lookup_failed(LookupStage::PublicIp, &e);
            }
        };

        let record_ip = match self
            .record_reader
            .record_ip(&self.config.record, &self.config.domain)
            .await
        {
            Ok(ip) => normalize_lookup_body(&ip),
            Err(e) => {
                error!(error = %e, "Failed to get current domain record ip");
                return TickOutcome::lookup_failed(LookupStage::RecordIp, &e);
            }
        };

        info!(%current_ip, %record_ip, "Got current public ip and record ip");

        if current_ip == record_ip {
            info!("Current public ip same as the record ip, no update needed");
            return TickOutcome::Unchanged { ip: current_ip };
        }

        info!(%current_ip, "Current public ip changed, updating record");

        match self
            .record_updater
            .update(
                &self.config.record,
                &self.config.domain,
                &self.record_id,
                &current_ip,
            )
            .await
        {
            Ok(()) => {
                info!(
                    fqdn = %self.config.fqdn(),
                    previous = %record_ip,
                    current = %current_ip,
                    "Update record ip successful"
                );
                TickOutcome::Updated {
                    previous: record_ip,
                    current: current_ip,
                }
            }
            Err(e) => {
                error!(error = %e, "Update record ip failed");
                TickOutcome::UpdateFailed {
                    current: current_ip,
                    record_ip,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Run the polling loop until `shutdown` fires or its sender is dropped
    ///
    /// One tick is dispatched immediately, then one every interval. Stopping ends
    /// scheduling only; ticks already dispatched run to completion.
    pub async fn run(self: Arc<Self>, mut shutdown: oneshot::Receiver<()>) {
        let period = self.config.interval();
        info!(
            fqdn = %self.config.fqdn(),
            interval_secs = self.config.interval_secs,
            overlap = ?self.config.overlap,
            "Poll loop started"
        );
        self.emit(PollEvent::Started {
            fqdn: self.config.fqdn(),
            record_id: self.record_id.clone(),
        });

        self.dispatch();

        let Some(first_deadline) = Instant::now().checked_add(period) else {
            error!(interval_secs = self.config.interval_secs, "Interval out of range");
            self.emit(PollEvent::Stopped);
            return;
        };
        let mut ticker = tokio::time::interval_at(first_deadline, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Exiting...");
                    break;
                }

                _ = ticker.tick() => self.dispatch(),
            }
        }

        self.emit(PollEvent::Stopped);
        info!("Exited");
    }

    /// Launch one tick on its own task without waiting for it
    fn dispatch(self: &Arc<Self>) {
        let guard = match self.config.overlap {
            OverlapPolicy::Skip => match InFlightGuard::try_acquire(&self.in_flight) {
                Some(guard) => Some(guard),
                None => {
                    warn!("Previous tick still running, skipping this one");
                    self.emit(PollEvent::Tick(TickOutcome::Overlapped));
                    return;
                }
            },
            OverlapPolicy::Allow => None,
        };

        let poller = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = poller.run_once().await;
            drop(guard);
            poller.emit(PollEvent::Tick(outcome));
        });
    }

    /// Emit a poll event
    fn emit(&self, event: PollEvent) {
        let Some(tx) = &self.event_tx else {
            return;
        };

        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event");
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Event receiver dropped");
            }
        }
    }
}

/// Clears the in-flight flag when the tick ends, including by panic
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(Arc::clone(flag)))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_is_exclusive_and_released_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));

        let first = InFlightGuard::try_acquire(&flag);
        assert!(first.is_some());
        assert!(InFlightGuard::try_acquire(&flag).is_none());

        drop(first);
        assert!(!flag.load(Ordering::Acquire));
        assert!(InFlightGuard::try_acquire(&flag).is_some());
    }

    #[test]
    fn attempted_update_only_for_update_outcomes() {
        let updated = TickOutcome::Updated {
            previous: "1.1.1.1".to_string(),
            current: "5.5.5.5".to_string(),
        };
        let unchanged = TickOutcome::Unchanged {
            ip: "5.5.5.5".to_string(),
        };

        assert!(updated.attempted_update());
        assert!(!unchanged.attempted_update());
        assert!(!TickOutcome::Overlapped.attempted_update());
    }

    #[test]
    fn lookup_stage_display() {
        assert_eq!(LookupStage::PublicIp.to_string(), "public ip");
        assert_eq!(LookupStage::RecordIp.to_string(), "record ip");
    }
}
