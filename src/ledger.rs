//! Ledger node interaction over JSON-RPC
//!
//! Provides:
//! - A JSON-RPC client with a pluggable transport
//! - Account information polling
//! - Payment submission with confirmation

pub mod account;
pub mod amount;
pub mod payment;
pub mod rpc;

pub use account::AccountWatcher;
pub use amount::Drops;
pub use payment::{Payment, ReliableSubmitter};
pub use rpc::RpcClient;
