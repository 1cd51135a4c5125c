//! Dummy interface provisioning
//!
//! Each candidate address gets its own Linux dummy device:
//! `ip link add` → `ifconfig hw ether` → `ip addr add` → `ip link set up`.
//! The first non-zero exit aborts the attempt. Nothing is rolled back; a
//! half-configured device stays on the host.

use crate::network::mac::MacAddr;
use crate::network::runner::{CommandRunner, HostCommand};
use rand::Rng;
use std::net::Ipv4Addr;
use tracing::{debug, warn};

/// Outcome of provisioning one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionAttempt {
    /// Device name (`<prefix><index>`)
    pub device: String,
    /// Hardware address assigned (or attempted)
    pub mac: MacAddr,
    /// Candidate address
    pub address: Ipv4Addr,
    /// Whether all four steps exited with status 0
    pub success: bool,
}

/// Creates dummy devices named `<prefix><index>`
pub struct DummyProvisioner<'a, R: CommandRunner + ?Sized> {
    runner: &'a mut R,
    prefix: String,
}

impl<'a, R: CommandRunner + ?Sized> DummyProvisioner<'a, R> {
    pub fn new(runner: &'a mut R, prefix: &str) -> Self {
        Self {
            runner,
            prefix: prefix.to_string(),
        }
    }

    /// Device name for a zero-based index
    pub fn device_name(&self, index: u64) -> String {
        format!("{}{}", self.prefix, index)
    }

    /// The four host commands that bring up one device
    pub fn commands(device: &str, mac: &MacAddr, address: Ipv4Addr) -> [HostCommand; 4] {
        let mac = mac.to_string();
        let address = address.to_string();
        [
            HostCommand::new("ip").args(["link", "add", device, "type", "dummy"]),
            HostCommand::new("ifconfig").args([device, "hw", "ether", mac.as_str()]),
            HostCommand::new("ip").args(["addr", "add", address.as_str(), "dev", device]),
            HostCommand::new("ip").args(["link", "set", device, "up"]),
        ]
    }

    /// Provision one device for `address`
    pub fn provision<G: Rng + ?Sized>(
        &mut self,
        index: u64,
        address: Ipv4Addr,
        rng: &mut G,
    ) -> ProvisionAttempt {
        let device = self.device_name(index);
        let mac = MacAddr::random_local(rng);

        let mut success = true;
        for command in Self::commands(&device, &mac, address) {
            debug!(%command, "running");
            match self.runner.run(&command) {
                Ok(Some(0)) => {}
                Ok(Some(code)) => {
                    warn!(%device, %address, %command, code, "command exited non-zero");
                    success = false;
                    break;
                }
                Ok(None) => {
                    warn!(%device, %address, %command, "command terminated by signal");
                    success = false;
                    break;
                }
                Err(e) => {
                    warn!(%device, %address, %command, error = %e, "failed to spawn command");
                    success = false;
                    break;
                }
            }
        }

        ProvisionAttempt {
            device,
            mac,
            address,
            success,
        }
    }
}
