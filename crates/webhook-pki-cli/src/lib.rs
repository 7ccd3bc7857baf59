//! webhook-pki CLI library

pub mod commands;
pub mod error;

pub use error::{Error, Result};

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use webhook_pki::PkiConfig;

/// Environment variable naming the PKI config file
pub const CONFIG_ENV: &str = "WEBHOOK_PKI_CONFIG";

/// webhook-pki - serving certificates for in-cluster webhooks
#[derive(Parser, Debug)]
#[command(name = "webhook-pki")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// YAML file overriding key size, signer groups, usages and reserve window
    #[arg(long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a private key and print the CertificateSigningRequest for it
    Request(commands::request::RequestArgs),
    /// Check whether a certificate is due for rotation
    Check(commands::check::CheckArgs),
}

impl Cli {
    /// Run the CLI command
    pub fn run(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        match self.command {
            Commands::Request(args) => commands::request::run(args, &config),
            Commands::Check(args) => commands::check::run(args, &config),
        }
    }
}

/// Load the config file if one was given, defaults otherwise
pub fn load_config(path: Option<&std::path::Path>) -> Result<PkiConfig> {
    match path {
        Some(path) => Ok(PkiConfig::from_file(path)?),
        None => Ok(PkiConfig::default()),
    }
}
