//! Rigging - private ledger testnet tooling
//!
//! Sets up dummy interfaces for testnet nodes, waits for accounts to show up
//! over JSON-RPC and funds the test account.

mod cli;
mod error;
mod ledger;
mod manifest;
mod network;
mod sys;

use cli::{Cli, Commands};
use error::{Error, Result};
use ledger::payment::outcome_lines;
use ledger::rpc::to_pretty_json;
use ledger::{AccountWatcher, Drops, Payment, ReliableSubmitter, RpcClient};
use manifest::RiggingConfig;
use network::{DryRunRunner, IpsOptions, IpsOutcome, ListingFormat, Subnet, SystemRunner};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use sys::HostOs;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    if let Err(e) = run() {
        match e {
            Error::SubmitFailed(_) => eprintln!("{}", e),
            _ => eprintln!("Error: {}", e),
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("rigging=debug")
        } else {
            EnvFilter::new("rigging=info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();

    if let Commands::Completion { shell } = &cli.command {
        Cli::generate_completion(*shell);
        return Ok(());
    }

    init_tracing(cli.verbose);

    let config = manifest::load_or_default(cli.config.as_deref())?;
    let rpc_url = cli.rpc_url.unwrap_or_else(|| config.rpc.url.clone());

    match cli.command {
        Commands::Ips {
            subnet,
            file,
            dev_prefix,
            format,
            dry_run,
        } => ips(&config, subnet, file, dev_prefix, format, dry_run),

        Commands::AccountInfo { accounts, timeout } => {
            let accounts = if accounts.is_empty() {
                vec![config.accounts.genesis.clone(), config.accounts.test.clone()]
            } else {
                accounts
            };

            let client = RpcClient::connect(&rpc_url);
            AccountWatcher::new(&client, config.poll.interval())
                .timeout(timeout.map(Duration::from_secs))
                .wait_for_all(&accounts, &mut io::stdout().lock())?;
            Ok(())
        }

        Commands::Transfer {
            from,
            secret,
            to,
            amount,
        } => {
            let amount = amount.unwrap_or(config.transfer.amount_drops);
            if amount == 0 {
                return Err(Error::ConfigValidation(
                    "--amount must be greater than zero".to_string(),
                ));
            }

            let payment = Payment::new(
                from.as_deref().unwrap_or(&config.accounts.genesis),
                to.as_deref().unwrap_or(&config.accounts.test),
                Drops(amount),
            );
            let secret = secret.unwrap_or_else(|| config.accounts.genesis_secret.clone());

            let client = RpcClient::connect(&rpc_url);
            let result = ReliableSubmitter::new(
                &client,
                config.poll.interval(),
                config.transfer.ledger_offset,
            )
            .send(&payment, &secret)?;

            println!("{}", to_pretty_json(&result)?);
            for line in outcome_lines(&result) {
                println!("{}", line);
            }
            Ok(())
        }

        Commands::Completion { .. } => Ok(()),
    }
}

fn ips(
    config: &RiggingConfig,
    subnet: Option<String>,
    file: Option<PathBuf>,
    dev_prefix: Option<String>,
    format: ListingFormat,
    dry_run: bool,
) -> Result<()> {
    // Parse before the platform check so bad input fails everywhere
    let subnet = Subnet::parse(subnet.as_deref().unwrap_or(&config.interfaces.subnet))?;
    let dev_prefix = dev_prefix.unwrap_or_else(|| config.interfaces.dev_prefix.clone());
    if dev_prefix.is_empty() {
        return Err(Error::ConfigValidation(
            "--dev_prefix must not be empty".to_string(),
        ));
    }

    let options = IpsOptions {
        subnet,
        file: file.unwrap_or_else(|| config.interfaces.file.clone()),
        dev_prefix,
        format,
        dry_run,
    };

    let host = HostOs::detect();
    if host.supports_dummy_interfaces() && !dry_run && !sys::is_privileged() {
        warn!("not running as root, interface creation will most likely fail");
    }

    let mut rng = rand::rng();
    let outcome = if dry_run {
        network::setup::run(&options, &host, &mut DryRunRunner, &mut rng)?
    } else {
        network::setup::run(&options, &host, &mut SystemRunner, &mut rng)?
    };

    match outcome {
        IpsOutcome::UnsupportedPlatform(os) => {
            println!(
                "Setting virtual interfaces can be done only on Linux (this host runs {})",
                os
            );
        }
        IpsOutcome::DryRun { listing, rendered } => {
            println!(
                "Would write {} addresses to {}:",
                listing.addresses().len(),
                options.file.display()
            );
            print!("{}", rendered);
        }
        IpsOutcome::Written {
            path,
            listing,
            attempted,
        } => {
            println!(
                "Wrote {} of {} addresses to {}",
                listing.addresses().len(),
                attempted,
                path.display()
            );
        }
    }

    Ok(())
}
