//! `webhook-pki request`: new key plus CertificateSigningRequest

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use tracing::info;
use webhook_pki::{CertificateManager, PkiConfig, ServiceIdentity};

use crate::{Error, Result};

/// Rendering of the submission object
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Short service name
    #[arg(long)]
    pub service: String,

    /// Namespace the service lives in
    #[arg(long)]
    pub namespace: String,

    /// IP or DNS name of the API server that must trust the certificate
    #[arg(long)]
    pub api_server_host: String,

    /// Use <service>.<namespace>.svc as the subject common name
    #[arg(long)]
    pub fqdn_common_name: bool,

    /// Where to write the PEM private key
    #[arg(long)]
    pub key_out: PathBuf,

    /// Output format for the CertificateSigningRequest
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub output: OutputFormat,
}

pub fn run(args: RequestArgs, config: &PkiConfig) -> Result<()> {
    let rendered = execute(&args, config)?;
    print!("{rendered}");
    Ok(())
}

/// Generate the key, write it out and render the submission object
pub fn execute(args: &RequestArgs, config: &PkiConfig) -> Result<String> {
    let identity = ServiceIdentity::new(&args.service, &args.namespace, &args.api_server_host)?;

    let mut config = config.clone();
    config.use_fqdn_as_common_name |= args.fqdn_common_name;
    let manager = CertificateManager::new(config)?;

    let pending = manager.prepare_renewal(&identity)?;
    write_private_key(&args.key_out, pending.private_key_pem())?;
    info!(
        path = %args.key_out.display(),
        resource = pending.request().resource_name(),
        "wrote private key"
    );

    let submission = pending.request().to_submission();
    let rendered = match args.output {
        OutputFormat::Yaml => serde_yaml::to_string(&submission)?,
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(&submission)?),
    };
    Ok(rendered)
}

/// Write key PEM readable by the owner only
fn write_private_key(path: &Path, pem: &[u8]) -> Result<()> {
    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(write_err)?;
    // mode() only applies on create; tighten an existing file too
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .map_err(write_err)?;
    }
    file.write_all(pem).map_err(write_err)?;
    Ok(())
}
