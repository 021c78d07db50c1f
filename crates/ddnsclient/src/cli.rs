//! Command-line flags
//!
//! Flags are the only configuration source: no file, no environment variables.

use clap::{Parser, ValueEnum};
use ddns_core::config::{
    DEFAULT_API_BASE, DEFAULT_INTERVAL_SECS, DEFAULT_PUBLIC_IP_URL, DEFAULT_RECORD_IP_URL,
};
use ddns_core::{Endpoints, OverlapPolicy, PollConfig};
use tracing::Level;

/// Flags consumed by the service manager itself, never forwarded to the service
const SERVICE_FLAGS: &[&str] = &["--install", "--uninstall"];

// No Debug derive: the struct carries the login token
#[derive(Parser)]
#[command(
    name = "ddnsclient",
    version,
    about = "DDNS client for dnspod: watches the public IP and keeps a domain A record in sync"
)]
pub struct Cli {
    /// dnspod token for api auth, as <id>,<token>
    #[arg(long, default_value = "id,token")]
    pub token: String,

    /// Interval in seconds for checking whether the public ip changed
    #[arg(long, default_value_t = DEFAULT_INTERVAL_SECS)]
    pub interval: u64,

    /// DDNS domain
    #[arg(long, default_value = "example.com")]
    pub domain: String,

    /// DDNS domain record to update
    #[arg(long, default_value = "test.ddns")]
    pub record: String,

    /// Install as system service
    #[arg(long, conflicts_with = "uninstall")]
    pub install: bool,

    /// Remove it from system services
    #[arg(long)]
    pub uninstall: bool,

    /// Start a tick even if the previous one is still running
    #[arg(long)]
    pub allow_overlap: bool,

    /// Log verbosity
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Public IP lookup service
    #[arg(long, default_value = DEFAULT_PUBLIC_IP_URL)]
    pub public_ip_url: String,

    /// HTTP-DNS resolver used to read the published record IP
    #[arg(long, default_value = DEFAULT_RECORD_IP_URL)]
    pub record_ip_url: String,

    /// DNSPod API base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,
}

impl Cli {
    /// Build the poll configuration these flags describe
    pub fn poll_config(&self) -> PollConfig {
        let overlap = if self.allow_overlap {
            OverlapPolicy::Allow
        } else {
            OverlapPolicy::Skip
        };

        PollConfig::new(&self.domain, &self.record, &self.token)
            .with_interval_secs(self.interval)
            .with_overlap(overlap)
            .with_endpoints(Endpoints {
                public_ip_url: self.public_ip_url.clone(),
                record_ip_url: self.record_ip_url.clone(),
                api_base: self.api_base.clone(),
            })
    }

    /// Build the poll configuration and reject it if it cannot run
    ///
    /// Checked before `--install` too, so a service never gets registered with flags
    /// it would fail on at every restart.
    pub fn validated_config(&self) -> ddns_core::Result<PollConfig> {
        let config = self.poll_config();
        config.validate()?;
        Ok(config)
    }
}

/// Log verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Arguments the installed service should be started with
///
/// Everything after the program name, minus the install/uninstall flags.
pub fn service_arguments<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .filter(|arg| {
            !SERVICE_FLAGS
                .iter()
                .any(|flag| arg == flag || arg.starts_with(&format!("{flag}=")))
        })
        .collect()
}
