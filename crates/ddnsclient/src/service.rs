//! OS service registration
//!
//! Installing writes a systemd unit that starts this binary with the forwarded flags;
//! uninstalling disables and removes it. Starting and stopping the installed service
//! is left to systemd, which delivers SIGTERM to stop it.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Service (and unit) name
pub const SERVICE_NAME: &str = "ddnsclient";

/// Human-readable service description
pub const SERVICE_DESCRIPTION: &str =
    "DDNS client service for watch ip changed and update dnspod managed domain A record.";

/// Default directory for system units
const SYSTEMD_UNIT_DIR: &str = "/etc/systemd/system";

/// Registration with the platform's service manager
pub trait ServiceManager {
    /// Register `program args...` to start at boot
    fn install(&self, program: &Path, args: &[String]) -> Result<()>;

    /// Remove a previous registration
    fn uninstall(&self) -> Result<()>;
}

/// The service manager for this platform
pub fn native_manager() -> Result<Box<dyn ServiceManager>> {
    if cfg!(target_os = "linux") && Path::new("/run/systemd/system").exists() {
        Ok(Box::new(SystemdManager::new(SERVICE_NAME)))
    } else {
        bail!("service installation is only supported on systemd-based Linux")
    }
}

/// systemd unit-file registration
#[derive(Debug, Clone)]
pub struct SystemdManager {
    name: String,
    unit_dir: PathBuf,
    systemctl: PathBuf,
}

impl SystemdManager {
    /// Manage `<name>.service` in the system unit directory
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_paths(name, SYSTEMD_UNIT_DIR, "systemctl")
    }

    /// Manage `<name>.service` in `unit_dir`, driving the given `systemctl` program
    pub fn with_paths(
        name: impl Into<String>,
        unit_dir: impl Into<PathBuf>,
        systemctl: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            unit_dir: unit_dir.into(),
            systemctl: systemctl.into(),
        }
    }

    fn unit_name(&self) -> String {
        format!("{}.service", self.name)
    }

    /// Where the unit file lives
    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(self.unit_name())
    }

    /// Unit file contents for `program args...`
    pub fn render_unit(&self, program: &Path, args: &[String]) -> String {
        let program = program.display().to_string();
        let exec_start = std::iter::once(program.as_str())
            .chain(args.iter().map(String::as_str))
            .map(quote_exec_arg)
            .collect::<Vec<_>>()
            .join(" ");

        format!(
            "[Unit]\n\
             Description={description}\n\
             ConditionFileIsExecutable={program}\n\
             After=network-online.target\n\
             Wants=network-online.target\n\
             \n\
             [Service]\n\
             StartLimitInterval=5\n\
             StartLimitBurst=10\n\
             ExecStart={exec_start}\n\
             Restart=always\n\
             RestartSec=120\n\
             \n\
             [Install]\n\
             WantedBy=multi-user.target\n",
            description = SERVICE_DESCRIPTION,
        )
    }

    fn systemctl(&self, args: &[&str]) -> Result<()> {
        debug!(?args, "Running systemctl");
        let status = Command::new(&self.systemctl)
            .args(args)
            .status()
            .with_context(|| format!("failed to run {}", self.systemctl.display()))?;

        if !status.success() {
            bail!("systemctl {} exited with {}", args.join(" "), status);
        }
        Ok(())
    }
}

impl ServiceManager for SystemdManager {
    fn install(&self, program: &Path, args: &[String]) -> Result<()> {
        let path = self.unit_path();
        if path.exists() {
            bail!("Init already exists: {}", path.display());
        }

        std::fs::write(&path, self.render_unit(program, args))
            .with_context(|| format!("failed to write {}", path.display()))?;

        // The unit carries the login token on its command line
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640))
                .with_context(|| format!("failed to restrict {}", path.display()))?;
        }

        let unit = self.unit_name();
        self.systemctl(&["daemon-reload"])?;
        self.systemctl(&["enable", unit.as_str()])?;

        info!(unit = %path.display(), "Installed service");
        Ok(())
    }

    fn uninstall(&self) -> Result<()> {
        let path = self.unit_path();
        if !path.exists() {
            bail!("Service is not installed: {}", path.display());
        }

        let unit = self.unit_name();
        self.systemctl(&["disable", unit.as_str()])?;
        std::fs::remove_file(&path)
            .with_context(|| format!("failed to remove {}", path.display()))?;
        self.systemctl(&["daemon-reload"])?;

        info!(unit = %path.display(), "Uninstalled service");
        Ok(())
    }
}

/// Quote one ExecStart word so systemd passes it through verbatim
fn quote_exec_arg(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '%' => quoted.push_str("%%"),
            '$' => quoted.push_str("$$"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
