//! Configuration file parsing for Rigging
//!
//! Parses the optional `rigging.toml` using serde. Every section and field
//! is optional; missing values fall back to the testnet defaults.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "rigging.toml";

/// Load configuration from a file
pub fn load(path: &Path) -> Result<RiggingConfig> {
    let content = fs::read_to_string(path).map_err(|e| Error::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: RiggingConfig = toml::from_str(&content)?;
    config.validate()?;

    Ok(config)
}

/// Load the explicit config, else `rigging.toml` if present, else defaults
pub fn load_or_default(explicit: Option<&Path>) -> Result<RiggingConfig> {
    match explicit {
        Some(path) => load(path),
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.is_file() {
                load(fallback)
            } else {
                Ok(RiggingConfig::default())
            }
        }
    }
}

/// Root configuration structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiggingConfig {
    /// JSON-RPC endpoint
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Well-known testnet accounts
    #[serde(default)]
    pub accounts: AccountsConfig,

    /// Polling behaviour for account-info and reliable submission
    #[serde(default)]
    pub poll: PollConfig,

    /// Payment defaults
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Dummy interface defaults
    #[serde(default)]
    pub interfaces: InterfacesConfig,
}

impl RiggingConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = &self.rpc.url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::ConfigValidation(format!(
                "rpc.url must be an http(s) URL, got '{}'",
                url
            )));
        }

        if self.poll.interval_ms == 0 {
            return Err(Error::ConfigValidation(
                "poll.interval_ms must be greater than zero".to_string(),
            ));
        }

        if self.transfer.amount_drops == 0 {
            return Err(Error::ConfigValidation(
                "transfer.amount_drops must be greater than zero".to_string(),
            ));
        }

        if self.interfaces.dev_prefix.is_empty() {
            return Err(Error::ConfigValidation(
                "interfaces.dev_prefix must not be empty".to_string(),
            ));
        }

        for (field, value) in [
            ("accounts.genesis", &self.accounts.genesis),
            ("accounts.genesis_secret", &self.accounts.genesis_secret),
            ("accounts.test", &self.accounts.test),
        ] {
            if value.trim().is_empty() {
                return Err(Error::ConfigValidation(format!("{} must not be empty", field)));
            }
        }

        Ok(())
    }
}

/// JSON-RPC endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    /// Node admin RPC URL
    #[serde(default = "default_rpc_url")]
    pub url: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
        }
    }
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:5005".into()
}

/// Testnet accounts
///
/// The genesis account holds the whole initial supply of a blank testnet;
/// the test account does not exist until it receives a payment.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountsConfig {
    #[serde(default = "default_genesis_account")]
    pub genesis: String,

    /// Secret used by the node to sign payments from the genesis account
    #[serde(default = "default_genesis_secret")]
    pub genesis_secret: String,

    #[serde(default = "default_test_account")]
    pub test: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            genesis: default_genesis_account(),
            genesis_secret: default_genesis_secret(),
            test: default_test_account(),
        }
    }
}

fn default_genesis_account() -> String {
    "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh".into()
}

fn default_genesis_secret() -> String {
    "snoPBrXtMTXEGtEd9jTw93BrFmjB7".into()
}

fn default_test_account() -> String {
    "rNGknFCRBZguXcPqC63k6xTZnonSe6ZuWt".into()
}

/// Fixed-delay polling
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Delay between attempts in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    1000
}

/// Payment defaults
#[derive(Debug, Clone, Deserialize)]
pub struct TransferConfig {
    /// Amount to send, in drops (5000 XRP)
    #[serde(default = "default_amount_drops")]
    pub amount_drops: u64,

    /// Ledgers the transaction may wait before it expires
    #[serde(default = "default_ledger_offset")]
    pub ledger_offset: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            amount_drops: default_amount_drops(),
            ledger_offset: default_ledger_offset(),
        }
    }
}

fn default_amount_drops() -> u64 {
    5_000_000_000
}

fn default_ledger_offset() -> u32 {
    20
}

/// Dummy interface defaults
#[derive(Debug, Clone, Deserialize)]
pub struct InterfacesConfig {
    #[serde(default = "default_subnet")]
    pub subnet: String,

    #[serde(default = "default_listing_file")]
    pub file: PathBuf,

    #[serde(default = "default_dev_prefix")]
    pub dev_prefix: String,
}

impl Default for InterfacesConfig {
    fn default() -> Self {
        Self {
            subnet: default_subnet(),
            file: default_listing_file(),
            dev_prefix: default_dev_prefix(),
        }
    }
}

fn default_subnet() -> String {
    "1.1.1.0/28".into()
}

fn default_listing_file() -> PathBuf {
    PathBuf::from("ips.rs")
}

fn default_dev_prefix() -> String {
    "test_eth".into()
}
