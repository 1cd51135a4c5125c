//! Test interface setup
//!
//! Ties the pieces together: expand the subnet, provision one dummy device
//! per address (strictly one after another), then write the listing of the
//! addresses that came up.

use crate::error::Result;
use crate::network::dummy::{DummyProvisioner, ProvisionAttempt};
use crate::network::listing::{AddressListing, ListingFormat};
use crate::network::runner::CommandRunner;
use crate::network::subnet::Subnet;
use crate::sys::HostOs;
use rand::Rng;
use std::path::PathBuf;
use tracing::{info, warn};

/// Settings for one `ips` run
#[derive(Debug, Clone)]
pub struct IpsOptions {
    /// Subnet to expand
    pub subnet: Subnet,
    /// Listing output path
    pub file: PathBuf,
    /// Device name prefix
    pub dev_prefix: String,
    /// Listing format
    pub format: ListingFormat,
    /// Print commands instead of running them and skip the file write
    pub dry_run: bool,
}

/// What an `ips` run did
#[derive(Debug)]
pub enum IpsOutcome {
    /// Host cannot have dummy devices; nothing was touched
    UnsupportedPlatform(HostOs),
    /// Dry run; nothing was written
    DryRun {
        listing: AddressListing,
        rendered: String,
    },
    /// Listing written to disk
    Written {
        path: PathBuf,
        listing: AddressListing,
        attempted: usize,
    },
}

/// Provision every address of `subnet`, index counting up from zero
///
/// The index advances for every address, failed or not, so device names
/// stay aligned with enumeration order.
pub fn provision_all<R, G>(
    subnet: &Subnet,
    dev_prefix: &str,
    runner: &mut R,
    rng: &mut G,
) -> Vec<ProvisionAttempt>
where
    R: CommandRunner + ?Sized,
    G: Rng + ?Sized,
{
    let mut provisioner = DummyProvisioner::new(runner, dev_prefix);
    subnet
        .addresses()
        .zip(0u64..)
        .map(|(address, index)| {
            let attempt = provisioner.provision(index, address, rng);
            if attempt.success {
                info!(device = %attempt.device, mac = %attempt.mac, %address, "interface up");
            }
            attempt
        })
        .collect()
}

/// Run the whole `ips` procedure against `host` using `runner`
pub fn run<R, G>(
    options: &IpsOptions,
    host: &HostOs,
    runner: &mut R,
    rng: &mut G,
) -> Result<IpsOutcome>
where
    R: CommandRunner + ?Sized,
    G: Rng + ?Sized,
{
    if !host.supports_dummy_interfaces() {
        return Ok(IpsOutcome::UnsupportedPlatform(host.clone()));
    }

    info!(
        subnet = %options.subnet,
        addresses = options.subnet.address_count(),
        prefix = %options.dev_prefix,
        "provisioning dummy interfaces"
    );

    let attempts = provision_all(&options.subnet, &options.dev_prefix, runner, rng);
    let listing = AddressListing::from_attempts(&attempts);

    if listing.is_empty() {
        warn!(subnet = %options.subnet, "no interface could be provisioned, listing is empty");
    } else {
        info!(
            provisioned = listing.addresses().len(),
            attempted = attempts.len(),
            "provisioning finished"
        );
    }

    if options.dry_run {
        let rendered = listing.render(options.format)?;
        return Ok(IpsOutcome::DryRun { listing, rendered });
    }

    listing.write(&options.file, options.format)?;

    Ok(IpsOutcome::Written {
        path: options.file.clone(),
        listing,
        attempted: attempts.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::dummy::tests::FakeHost;
    use crate::network::runner::DryRunRunner;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::fs;
    use std::net::Ipv4Addr;

    fn options(subnet: &str, file: PathBuf, prefix: &str) -> IpsOptions {
        IpsOptions {
            subnet: Subnet::parse(subnet).unwrap(),
            file,
            dev_prefix: prefix.to_string(),
            format: ListingFormat::Rust,
            dry_run: false,
        }
    }

    #[test]
    fn test_all_succeeding_run_writes_every_address() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("ips.rs");
        let opts = options("10.0.0.0/30", file.clone(), "foo");
        let mut host = FakeHost::default();
        let mut rng = StdRng::seed_from_u64(42);

        let outcome = run(&opts, &HostOs::Linux, &mut host, &mut rng).unwrap();

        let IpsOutcome::Written { listing, attempted, .. } = outcome else {
            panic!("expected a written listing");
        };
        assert_eq!(attempted, 4);
        assert_eq!(listing.addresses().len(), 4);

        let created: Vec<String> = host
            .calls
            .iter()
            .filter(|c| c.arguments().starts_with(&["link".to_string(), "add".to_string()]))
            .map(|c| c.arguments()[2].clone())
            .collect();
        assert_eq!(created, ["foo0", "foo1", "foo2", "foo3"]);

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "pub const IPS: &'static [&'static str] = &[ \n\
             \t\"10.0.0.0\",\n\
             \t\"10.0.0.1\",\n\
             \t\"10.0.0.2\",\n\
             \t\"10.0.0.3\",\n\
             ];\n\n"
        );
    }

    #[test]
    fn test_failed_addresses_are_skipped_and_names_do_not_shift() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("ips.rs");
        let opts = options("1.1.1.0/29", file, "test_eth");
        // Odd addresses fail at the address assignment step
        let mut host = FakeHost::failing(|c| {
            c.arguments().first().map(String::as_str) == Some("addr")
                && c.arguments()[2]
                    .parse::<Ipv4Addr>()
                    .map(|a| a.octets()[3] % 2 == 1)
                    .unwrap_or(false)
        });
        let mut rng = StdRng::seed_from_u64(7);

        let attempts = provision_all(&opts.subnet, &opts.dev_prefix, &mut host, &mut rng);

        let names: Vec<&str> = attempts.iter().map(|a| a.device.as_str()).collect();
        assert_eq!(
            names,
            ["test_eth0", "test_eth1", "test_eth2", "test_eth3", "test_eth4", "test_eth5", "test_eth6", "test_eth7"]
        );

        let listing = AddressListing::from_attempts(&attempts);
        let enumerated: Vec<Ipv4Addr> = opts.subnet.addresses().collect();
        let mut cursor = enumerated.iter();
        for addr in listing.addresses() {
            assert!(cursor.any(|e| e == addr), "{addr} out of order or not enumerated");
        }
        assert_eq!(listing.addresses().len(), 4);
    }

    #[test]
    fn test_unsupported_platform_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("ips.rs");
        let opts = options("1.1.1.0/28", file.clone(), "test_eth");
        let mut host = FakeHost::default();
        let mut rng = StdRng::seed_from_u64(0);

        let outcome = run(&opts, &HostOs::from_name("macos"), &mut host, &mut rng).unwrap();

        assert!(matches!(outcome, IpsOutcome::UnsupportedPlatform(_)));
        assert!(host.calls.is_empty());
        assert!(!file.exists());
    }

    #[test]
    fn test_zero_successes_still_writes_listing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("ips.rs");
        let opts = options("1.1.1.0/30", file.clone(), "test_eth");
        let mut host = FakeHost::failing(|_| true);
        let mut rng = StdRng::seed_from_u64(0);

        let outcome = run(&opts, &HostOs::Linux, &mut host, &mut rng).unwrap();

        assert!(matches!(outcome, IpsOutcome::Written { ref listing, .. } if listing.is_empty()));
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "pub const IPS: &'static [&'static str] = &[ \n];\n\n"
        );
        // One failed `ip link add` per address, nothing after it
        assert_eq!(host.calls.len(), 4);
    }

    #[test]
    fn test_dry_run_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("ips.json");
        let mut opts = options("10.1.0.0/31", file.clone(), "dry");
        opts.dry_run = true;
        opts.format = ListingFormat::Json;
        let mut rng = StdRng::seed_from_u64(0);

        let outcome = run(&opts, &HostOs::Linux, &mut DryRunRunner, &mut rng).unwrap();

        let IpsOutcome::DryRun { listing, rendered } = outcome else {
            panic!("expected a dry run");
        };
        assert_eq!(listing.addresses().len(), 2);
        assert!(rendered.contains("10.1.0.1"));
        assert!(!file.exists());
    }
}
