// # ddnsclient - DDNS client daemon for DNSPod
//
// This is a thin integration layer. All polling and update logic lives in ddns-core.
//
// The daemon is responsible for:
// 1. Parsing command-line flags
// 2. Installing or removing the system service, when asked to
// 3. Resolving the record identifier (fatal if it cannot be found)
// 4. Running the poll loop until SIGTERM/SIGINT
//
// ## Example
//
// ```bash
// ddnsclient --token 12345,abcdef --domain example.com --record home --interval 60
//
// # register with systemd, forwarding every other flag
// sudo ddnsclient --install --token 12345,abcdef --domain example.com --record home
// ```

mod cli;
mod service;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use ddns_core::{Lifecycle, PollComponents, PollConfig, PollService, Poller};
use ddns_ip_http::HttpIpResolver;
use ddns_provider_dnspod::DnspodClient;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Cli, service_arguments};
use crate::service::{SERVICE_NAME, ServiceManager};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
/// - 3: Service install/uninstall failed
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
    /// Could not (un)register the system service
    ServiceError = 3,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::from(cli.log_level))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    if cli.uninstall {
        return manage_service(&cli).into();
    }

    let config = match cli.validated_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration validation error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    if cli.install {
        return manage_service(&cli).into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let poller = match bootstrap(config).await {
            Ok(poller) => poller,
            Err(e) => {
                error!("Erroring load config: {}", e);
                return DdnsExitCode::ConfigError;
            }
        };

        if let Err(e) = run_daemon(poller).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Install or uninstall the system service
fn manage_service(cli: &Cli) -> DdnsExitCode {
    let outcome = service::native_manager().and_then(|manager| {
        if cli.install {
            let program = std::env::current_exe()?;
            let args = service_arguments(std::env::args().skip(1));
            manager.install(&program, &args)
        } else {
            manager.uninstall()
        }
    });

    match outcome {
        Ok(()) => {
            info!(service = SERVICE_NAME, "Service registration updated");
            DdnsExitCode::CleanShutdown
        }
        Err(e) if cli.install => {
            error!("Erroring install as service: {:#}", e);
            DdnsExitCode::ServiceError
        }
        Err(e) => {
            error!("Erroring uninstall ddns service: {:#}", e);
            DdnsExitCode::ServiceError
        }
    }
}

/// Build the HTTP collaborators and resolve the record identifier
async fn bootstrap(config: PollConfig) -> ddns_core::Result<Poller> {
    let resolver = HttpIpResolver::new(&config.endpoints.public_ip_url)?;
    let dnspod = Arc::new(DnspodClient::new(&config.token, &config.endpoints)?);

    info!(fqdn = %config.fqdn(), "Resolving record id");
    let components = PollComponents::new(Arc::new(resolver), dnspod.clone(), dnspod);
    Poller::bootstrap(config, components).await
}

/// Run the poll loop as a service until a shutdown signal arrives
async fn run_daemon(poller: Poller) -> Result<()> {
    let mut service = PollService::new(poller);
    service.on_start().await?;

    let signal = wait_for_shutdown().await?;
    info!("Received shutdown signal: {}", signal);

    service.on_stop().await?;
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
