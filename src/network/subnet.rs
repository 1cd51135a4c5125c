//! Subnet expansion for interface provisioning
//!
//! Provides:
//! - Strict IPv4 CIDR parsing (host bits must be clear), with the prefix
//!   given as a length, a netmask or a hostmask
//! - Ascending enumeration of every address in the subnet, network and
//!   broadcast addresses included

use crate::error::{Error, Result};
use ipnet::{Ipv4AddrRange, Ipv4Net};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// An IPv4 subnet to expand into candidate addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subnet {
    net: Ipv4Net,
}

impl Subnet {
    /// Parse a subnet specification such as `1.1.1.0/28`
    ///
    /// The part after `/` may also be a netmask (`255.255.255.240`) or a
    /// hostmask (`0.0.0.15`). A bare address is treated as a `/32`.
    /// Addresses with host bits set (e.g. `10.0.0.1/30`) are rejected rather
    /// than silently truncated. Surrounding whitespace is not accepted.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidSubnet {
            input: input.to_string(),
            reason,
        };

        let net = match input.split_once('/') {
            Some((addr, mask)) if mask.contains('.') => {
                let addr = Ipv4Addr::from_str(addr).map_err(|e| invalid(e.to_string()))?;
                let mask = Ipv4Addr::from_str(mask).map_err(|e| invalid(e.to_string()))?;
                let prefix = prefix_from_mask(mask)
                    .ok_or_else(|| invalid(format!("{} is not a valid netmask or hostmask", mask)))?;
                Ipv4Net::new(addr, prefix).map_err(|e| invalid(e.to_string()))?
            }
            Some(_) => Ipv4Net::from_str(input).map_err(|e| invalid(e.to_string()))?,
            None => {
                let addr = Ipv4Addr::from_str(input).map_err(|e| invalid(e.to_string()))?;
                Ipv4Net::new(addr, 32).map_err(|e| invalid(e.to_string()))?
            }
        };

        if net.trunc() != net {
            return Err(invalid(format!("has host bits set (network is {})", net.trunc())));
        }

        Ok(Self { net })
    }

    /// Iterate every address of the subnet in ascending order
    pub fn addresses(&self) -> Ipv4AddrRange {
        Ipv4AddrRange::new(self.net.network(), self.net.broadcast())
    }

    /// Number of addresses `addresses()` yields
    pub fn address_count(&self) -> u64 {
        1u64 << (32 - u32::from(self.net.prefix_len()))
    }
}

/// Prefix length for a contiguous netmask, else for a contiguous hostmask
///
/// The netmask reading wins, so `0.0.0.0` is `/0` and `255.255.255.255` is
/// `/32`.
fn prefix_from_mask(mask: Ipv4Addr) -> Option<u8> {
    let bits = u32::from(mask);
    let contiguous = |bits: u32| bits.leading_ones() + bits.trailing_zeros() == 32;

    if contiguous(bits) {
        u8::try_from(bits.leading_ones()).ok()
    } else if contiguous(!bits) {
        u8::try_from((!bits).leading_ones()).ok()
    } else {
        None
    }
}

impl FromStr for Subnet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_subnet_expands_to_sixteen() {
        let subnet = Subnet::parse("1.1.1.0/28").unwrap();
        let addrs: Vec<Ipv4Addr> = subnet.addresses().collect();

        assert_eq!(addrs.len(), 16);
        assert_eq!(subnet.address_count(), 16);
        assert_eq!(addrs.first(), Some(&Ipv4Addr::new(1, 1, 1, 0)));
        assert_eq!(addrs.last(), Some(&Ipv4Addr::new(1, 1, 1, 15)));
    }

    #[test]
    fn test_netmask_and_hostmask_forms() {
        let by_len = Subnet::parse("1.1.1.0/28").unwrap();
        assert_eq!(Subnet::parse("1.1.1.0/255.255.255.240").unwrap(), by_len);
        assert_eq!(Subnet::parse("1.1.1.0/0.0.0.15").unwrap(), by_len);

        let addrs: Vec<Ipv4Addr> = Subnet::parse("1.1.1.0/0.0.0.15").unwrap().addresses().collect();
        assert_eq!(addrs.len(), 16);

        assert_eq!(Subnet::parse("10.0.0.0/255.255.255.255").unwrap().address_count(), 1);
        assert_eq!(Subnet::parse("0.0.0.0/0.0.0.0").unwrap().to_string(), "0.0.0.0/0");
    }

    #[test]
    fn test_small_subnets_keep_network_and_broadcast() {
        let addrs: Vec<String> = Subnet::parse("10.0.0.0/30")
            .unwrap()
            .addresses()
            .map(|a| a.to_string())
            .collect();
        assert_eq!(addrs, ["10.0.0.0", "10.0.0.1", "10.0.0.2", "10.0.0.3"]);

        let single: Vec<Ipv4Addr> = Subnet::parse("192.168.7.9/32").unwrap().addresses().collect();
        assert_eq!(single, [Ipv4Addr::new(192, 168, 7, 9)]);
    }

    #[test]
    fn test_bare_address_is_host_route() {
        let subnet = Subnet::parse("172.16.0.5").unwrap();
        assert_eq!(subnet.address_count(), 1);
        assert_eq!(subnet.to_string(), "172.16.0.5/32");
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in [
            "",
            "1.1.1.0/33",
            "1.1.1/28",
            "fe80::/64",
            "banana",
            "10.0.0.1/30",
            "1.1.1.0/255.0.255.0",
            "1.1.1.0/255.255.255.256",
            "10.0.0.1/255.255.255.252",
            " 1.1.1.0/28 ",
        ] {
            assert!(
                matches!(Subnet::parse(bad), Err(Error::InvalidSubnet { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    proptest! {
        #[test]
        fn enumeration_is_complete_and_ascending(raw in any::<u32>(), prefix in 20u8..=32) {
            let net = Ipv4Net::new(Ipv4Addr::from(raw), prefix).unwrap().trunc();
            let subnet = Subnet::parse(&net.to_string()).unwrap();
            let addrs: Vec<u32> = subnet.addresses().map(u32::from).collect();

            prop_assert_eq!(addrs.len() as u64, 1u64 << (32 - u32::from(prefix)));
            prop_assert!(addrs.windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(addrs[0], u32::from(net.network()));
        }
    }
}
