//! Dummy interface provisioning for testnet nodes
//!
//! Provides:
//! - Subnet expansion into candidate addresses
//! - Dummy device creation with random locally administered MACs
//! - Host command execution behind a swappable runner
//! - Listing of the addresses that came up, as Rust or JSON

pub mod dummy;
pub mod listing;
pub mod mac;
pub mod runner;
pub mod setup;
pub mod subnet;

pub use listing::ListingFormat;
pub use runner::{DryRunRunner, SystemRunner};
pub use setup::{IpsOptions, IpsOutcome};
pub use subnet::Subnet;
