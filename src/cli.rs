//! Command-line interface for Rigging
//!
//! Uses clap with derive for type-safe CLI parsing

use crate::network::ListingFormat;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Rigging - private ledger testnet tooling
#[derive(Parser)]
#[command(name = "rigging")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path (default: ./rigging.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON-RPC URL of the node (overrides rpc.url)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create dummy interfaces for a subnet and write the usable addresses
    ///
    /// Linux only, needs root.
    Ips {
        /// Subnet to generate (default: 1.1.1.0/28)
        #[arg(long)]
        subnet: Option<String>,

        /// Output file with IPs (default: ips.rs)
        #[arg(long)]
        file: Option<PathBuf>,

        /// How to prefix dummy devs (default: test_eth)
        #[arg(long = "dev_prefix", visible_alias = "dev-prefix")]
        dev_prefix: Option<String>,

        /// Listing format
        #[arg(long, value_enum, default_value = "rust")]
        format: ListingFormat,

        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
    },

    /// Poll account information until every account answers
    AccountInfo {
        /// Accounts to wait for, in order (default: genesis, then test account)
        accounts: Vec<String>,

        /// Give up after this many seconds per account
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Send a funded payment and wait for it to validate
    Transfer {
        /// Sending account (default: genesis account)
        #[arg(long)]
        from: Option<String>,

        /// Secret of the sending account
        #[arg(long)]
        secret: Option<String>,

        /// Receiving account (default: test account)
        #[arg(long)]
        to: Option<String>,

        /// Amount in drops (default: 5000 XRP)
        #[arg(long)]
        amount: Option<u64>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Generate shell completion scripts
    pub fn generate_completion(shell: Shell) {
        let mut cmd = Self::command();
        clap_complete::generate(shell, &mut cmd, "rigging", &mut std::io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ips_flags() {
        let cli = Cli::try_parse_from([
            "rigging",
            "ips",
            "--subnet",
            "10.0.0.0/30",
            "--dev_prefix",
            "foo",
            "--file",
            "out.rs",
        ])
        .unwrap();

        let Commands::Ips {
            subnet,
            file,
            dev_prefix,
            format,
            dry_run,
        } = cli.command
        else {
            panic!("expected ips");
        };
        assert_eq!(subnet.as_deref(), Some("10.0.0.0/30"));
        assert_eq!(file, Some(PathBuf::from("out.rs")));
        assert_eq!(dev_prefix.as_deref(), Some("foo"));
        assert_eq!(format, ListingFormat::Rust);
        assert!(!dry_run);
    }

    #[test]
    fn test_ips_defaults_and_alias() {
        let cli = Cli::try_parse_from(["rigging", "ips", "--dev-prefix", "bar", "--format", "json"]).unwrap();
        let Commands::Ips {
            subnet,
            dev_prefix,
            format,
            ..
        } = cli.command
        else {
            panic!("expected ips");
        };
        assert_eq!(subnet, None);
        assert_eq!(dev_prefix.as_deref(), Some("bar"));
        assert_eq!(format, ListingFormat::Json);
    }

    #[test]
    fn test_account_info_positional_accounts() {
        let cli = Cli::try_parse_from(["rigging", "account-info", "rA", "rB", "-v"]).unwrap();
        assert!(cli.verbose);
        let Commands::AccountInfo { accounts, timeout } = cli.command else {
            panic!("expected account-info");
        };
        assert_eq!(accounts, ["rA", "rB"]);
        assert_eq!(timeout, None);
    }

    #[test]
    fn test_transfer_rejects_non_numeric_amount() {
        assert!(Cli::try_parse_from(["rigging", "transfer", "--amount", "lots"]).is_err());
    }
}
