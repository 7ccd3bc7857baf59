//! `webhook-pki check`: rotation decision for a certificate on disk

use std::io::ErrorKind;
use std::path::PathBuf;

use clap::Args;
use time::OffsetDateTime;
use webhook_pki::{CertPemPair, CertificateInfo, PkiConfig};

use crate::{Error, Result};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// PEM certificate to inspect; a missing file means nothing is provisioned
    #[arg(long)]
    pub cert: PathBuf,
}

/// Outcome of a check
#[derive(Debug)]
pub struct CheckReport {
    /// Whether the pair must be renewed
    pub rotate: bool,
    /// Parsed certificate, if one was readable
    pub info: Option<CertificateInfo>,
}

pub fn run(args: CheckArgs, config: &PkiConfig) -> Result<()> {
    let now = OffsetDateTime::now_utc();
    let report = evaluate(&args, config, now)?;

    match &report.info {
        Some(info) => {
            println!("subject:        {}", info.common_name);
            println!("not after:      {}", info.not_after);
            println!("remaining days: {}", info.remaining(now).whole_days());
        }
        None => println!("no readable certificate at {}", args.cert.display()),
    }

    if report.rotate {
        return Err(Error::rotation_required(format!(
            "less than {} days of validity left",
            config.reserve_window_days
        )));
    }
    println!("certificate is valid, no rotation needed");
    Ok(())
}

/// Evaluate the pair at `args` against the configured policy at `now`
pub fn evaluate(args: &CheckArgs, config: &PkiConfig, now: OffsetDateTime) -> Result<CheckReport> {
    let pair = read_pair(args)?;
    let rotate = config.rotation_policy().should_rotate(pair.as_ref(), now);
    let info = pair
        .as_ref()
        .and_then(|p| CertificateInfo::from_pem(&p.certificate).ok());
    Ok(CheckReport { rotate, info })
}

fn read_pair(args: &CheckArgs) -> Result<Option<CertPemPair>> {
    let certificate = match std::fs::read(&args.cert) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    // Only the certificate decides rotation
    Ok(Some(CertPemPair::new(certificate, Vec::<u8>::new())))
}
