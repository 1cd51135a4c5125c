//! Hardware address generation for dummy interfaces

use rand::Rng;
use std::fmt;

/// A 48-bit Ethernet hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    /// Generate a random locally administered unicast address
    ///
    /// Format: `02:00:00:xx:xx:xx`. Uniqueness is not checked.
    pub fn random_local<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let tail: [u8; 3] = rng.random();
        Self([0x02, 0x00, 0x00, tail[0], tail[1], tail[2]])
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}
