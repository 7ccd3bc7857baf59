//! Entry point for the controller that owns the webhook certificate
//!
//! The controller asks [`CertificateManager::should_rotate`] on each
//! reconcile. When it answers `true` the controller calls
//! [`CertificateManager::prepare_renewal`], submits the request, and once the
//! signed certificate comes back turns the [`PendingRenewal`] into the
//! [`CertPemPair`] it persists and swaps in atomically.

use time::OffsetDateTime;
use zeroize::Zeroizing;

use crate::config::PkiConfig;
use crate::csr::{build_signing_request_with, SigningRequest};
use crate::error::Result;
use crate::identity::ServiceIdentity;
use crate::keys::generate_private_key;
use crate::rotation::{CertPemPair, RotationPolicy};

/// Stateless facade over key generation, CSR building and the expiry policy
#[derive(Debug, Clone, Default)]
pub struct CertificateManager {
    config: PkiConfig,
    policy: RotationPolicy,
}

impl CertificateManager {
    /// Create a manager from validated configuration
    pub fn new(config: PkiConfig) -> Result<Self> {
        config.validate()?;
        let policy = config.rotation_policy();
        Ok(Self { config, policy })
    }

    /// Configuration in use
    pub fn config(&self) -> &PkiConfig {
        &self.config
    }

    /// Expiry policy in use
    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// Whether the current pair must be replaced at `now`
    pub fn should_rotate(&self, pair: Option<&CertPemPair>, now: OffsetDateTime) -> bool {
        self.policy.should_rotate(pair, now)
    }

    /// Generate a new key and the signing request for `identity`
    pub fn prepare_renewal(&self, identity: &ServiceIdentity) -> Result<PendingRenewal> {
        let key = generate_private_key(self.config.key_bits)?;
        let request = build_signing_request_with(&key, identity, &self.config)?;
        Ok(PendingRenewal {
            private_key_pem: key.to_pem(),
            request,
        })
    }
}

/// A generated key waiting for its signed certificate
pub struct PendingRenewal {
    private_key_pem: Zeroizing<Vec<u8>>,
    request: SigningRequest,
}

impl std::fmt::Debug for PendingRenewal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRenewal")
            .field("request", &self.request.resource_name())
            .finish_non_exhaustive()
    }
}

impl PendingRenewal {
    /// The request to submit for signing
    pub fn request(&self) -> &SigningRequest {
        &self.request
    }

    /// PEM-encoded private key matching the request
    pub fn private_key_pem(&self) -> &[u8] {
        &self.private_key_pem
    }

    /// Pair the signed certificate with the generated key
    pub fn complete(self, certificate_pem: Vec<u8>) -> CertPemPair {
        CertPemPair {
            certificate: certificate_pem,
            private_key: self.private_key_pem,
        }
    }
}
