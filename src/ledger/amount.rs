//! XRP amounts

use std::fmt;

/// Drops per XRP
pub const DROPS_PER_XRP: u64 = 1_000_000;

/// An XRP amount in drops
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Drops(pub u64);

impl Drops {
    /// Parse the decimal drops string the ledger uses in JSON
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok().map(Drops)
    }

    /// Render as XRP without trailing zeros (`5000`, `0.000012`, `1.5`)
    pub fn to_xrp_string(&self) -> String {
        let whole = self.0 / DROPS_PER_XRP;
        let frac = self.0 % DROPS_PER_XRP;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{:06}", frac);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }
}

/// Displays the drops value, which is what goes on the wire
impl fmt::Display for Drops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
