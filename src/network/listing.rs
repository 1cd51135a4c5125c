//! Address listing output
//!
//! Renders the successfully provisioned addresses either as a Rust constant
//! (`pub const IPS: &'static [&'static str]`) or as the `{"nodes": [...]}`
//! JSON document the test harness reads.

use crate::error::{Error, Result};
use crate::network::dummy::ProvisionAttempt;
use clap::ValueEnum;
use serde::Serialize;
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

/// Output format for the address listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ListingFormat {
    /// Rust source with a static string slice constant
    #[default]
    Rust,
    /// JSON object with a `nodes` array
    Json,
}

#[derive(Serialize)]
struct NodeList<'a> {
    nodes: &'a [String],
}

/// Addresses whose provisioning succeeded, in enumeration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressListing {
    addresses: Vec<Ipv4Addr>,
}

impl AddressListing {
    /// Keep only successful attempts, preserving their order
    pub fn from_attempts<'a, I>(attempts: I) -> Self
    where
        I: IntoIterator<Item = &'a ProvisionAttempt>,
    {
        Self {
            addresses: attempts
                .into_iter()
                .filter(|a| a.success)
                .map(|a| a.address)
                .collect(),
        }
    }

    pub fn addresses(&self) -> &[Ipv4Addr] {
        &self.addresses
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Render the listing in the requested format
    pub fn render(&self, format: ListingFormat) -> Result<String> {
        match format {
            ListingFormat::Rust => Ok(self.render_rust()),
            ListingFormat::Json => {
                let nodes: Vec<String> = self.addresses.iter().map(|a| a.to_string()).collect();
                let mut out = serde_json::to_string_pretty(&NodeList { nodes: &nodes })?;
                out.push('\n');
                Ok(out)
            }
        }
    }

    fn render_rust(&self) -> String {
        let mut out = String::from("pub const IPS: &'static [&'static str] = &[ \n");
        for addr in &self.addresses {
            out.push_str(&format!("\t\"{}\",\n", addr));
        }
        out.push_str("];\n\n");
        out
    }

    /// Overwrite `path` with the rendered listing
    pub fn write(&self, path: &Path, format: ListingFormat) -> Result<()> {
        let content = self.render(format)?;
        fs::write(path, content).map_err(|e| Error::ListingWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
