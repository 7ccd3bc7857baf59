//! Expiry policy for webhook serving certificates
//!
//! A certificate is renewed once less than the reserve window of validity
//! remains. The window defaults to 180 days, half of the one-year lifetime
//! issued certificates are assumed to have, so a long-running controller never
//! serves with an expired certificate.
//!
//! The evaluator is a pure predicate over `(pair, now)`. Anything that cannot
//! be read as a certificate counts as needing rotation.

use ::time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use x509_parser::prelude::{FromDer, X509Certificate};
use zeroize::Zeroizing;

use crate::codec::decode_certificate;
use crate::config::DEFAULT_RESERVE_WINDOW_DAYS;
use crate::error::{PkiError, Result};

/// A certificate and its private key, both PEM-encoded
#[derive(Clone)]
pub struct CertPemPair {
    /// PEM `CERTIFICATE` block
    pub certificate: Vec<u8>,
    /// PEM `PRIVATE KEY` block (zeroized on drop)
    pub private_key: Zeroizing<Vec<u8>>,
}

impl CertPemPair {
    /// Create a pair from PEM bytes
    pub fn new(certificate: Vec<u8>, private_key: impl Into<Vec<u8>>) -> Self {
        Self {
            certificate,
            private_key: Zeroizing::new(private_key.into()),
        }
    }
}

impl std::fmt::Debug for CertPemPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertPemPair")
            .field("certificate_len", &self.certificate.len())
            .finish_non_exhaustive()
    }
}

/// Validity window and subject of a certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    /// When the certificate becomes valid
    pub not_before: OffsetDateTime,
    /// When the certificate expires
    pub not_after: OffsetDateTime,
    /// Subject common name, empty if absent
    pub common_name: String,
}

impl CertificateInfo {
    /// Parse certificate info from a PEM `CERTIFICATE` block
    pub fn from_pem(pem_data: &[u8]) -> Result<Self> {
        let der = decode_certificate(pem_data)?;
        Self::from_der(&der)
    }

    /// Parse certificate info from DER
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let (_, cert) = X509Certificate::from_der(der)
            .map_err(|e| PkiError::CertParseFailed(format!("failed to parse certificate: {}", e)))?;

        let common_name = cert
            .subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .unwrap_or("")
            .to_string();

        Ok(Self {
            not_before: cert.validity().not_before.to_datetime(),
            not_after: cert.validity().not_after.to_datetime(),
            common_name,
        })
    }

    /// Validity remaining at `now` (negative once expired)
    pub fn remaining(&self, now: OffsetDateTime) -> Duration {
        self.not_after - now
    }

    /// Check if the certificate has expired at `now`
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.remaining(now) <= Duration::ZERO
    }
}

/// When to renew a certificate ahead of its expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    reserve_window: Duration,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self::new(Duration::days(DEFAULT_RESERVE_WINDOW_DAYS))
    }
}

impl RotationPolicy {
    /// Policy renewing once less than `reserve_window` of validity remains
    pub fn new(reserve_window: Duration) -> Self {
        Self { reserve_window }
    }

    /// The configured reserve window
    pub fn reserve_window(&self) -> Duration {
        self.reserve_window
    }

    /// Whether `pair` must be (re)provisioned at `now`
    ///
    /// `None` means nothing has been provisioned yet. A certificate that
    /// fails to decode or parse is treated like an expired one.
    pub fn should_rotate(&self, pair: Option<&CertPemPair>, now: OffsetDateTime) -> bool {
        let Some(pair) = pair else {
            debug!("no certificate provisioned, rotation required");
            return true;
        };

        let info = match CertificateInfo::from_pem(&pair.certificate) {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "unreadable certificate, treating as expired");
                return true;
            }
        };

        let remaining = info.remaining(now);
        let rotate = remaining < self.reserve_window;
        debug!(
            common_name = %info.common_name,
            remaining_days = remaining.whole_days(),
            reserve_days = self.reserve_window.whole_days(),
            rotate,
            "evaluated certificate expiry"
        );
        rotate
    }
}

/// [`RotationPolicy::should_rotate`] with the default 180 day window
pub fn should_rotate(pair: Option<&CertPemPair>, now: OffsetDateTime) -> bool {
    RotationPolicy::default().should_rotate(pair, now)
}
