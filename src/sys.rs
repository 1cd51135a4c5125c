//! Host platform detection

use std::fmt;

/// Operating system family of the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOs {
    /// Linux (dummy devices and iproute2 available)
    Linux,
    /// Anything else, by `std::env::consts::OS` name
    Other(String),
}

impl HostOs {
    /// Detect the OS this binary was built for
    pub fn detect() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "linux" => HostOs::Linux,
            other => HostOs::Other(other.to_string()),
        }
    }

    /// Whether dummy interface provisioning can work on this host
    pub fn supports_dummy_interfaces(&self) -> bool {
        matches!(self, HostOs::Linux)
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostOs::Linux => write!(f, "linux"),
            HostOs::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Whether the process runs with root privileges
#[cfg(unix)]
pub fn is_privileged() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(not(unix))]
pub fn is_privileged() -> bool {
    false
}
