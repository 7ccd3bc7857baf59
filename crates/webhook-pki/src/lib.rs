//! Serving certificate lifecycle for in-cluster admission webhooks
//!
//! This crate builds what a webhook controller needs to obtain and keep a
//! TLS serving certificate:
//!
//! - **Keys**: RSA private keys and their PEM encoding
//! - **CSR**: signing requests naming the service and the API server host
//! - **Rotation**: the expiry policy deciding when a pair must be renewed
//!
//! Submitting the request, approving it and storing the resulting secret are
//! the controller's job. Everything here is synchronous and holds no shared
//! state, so it can be called from any number of reconcilers at once.
//!
//! # Public API
//!
//! - [`CertificateManager`]: facade combining the pieces below
//! - [`ServiceIdentity`], [`HostSpecifier`]: who the certificate is for
//! - [`generate_private_key`], [`key_to_pem`]: key material
//! - [`build_signing_request`]: CSR and submission metadata
//! - [`should_rotate`], [`RotationPolicy`]: expiry policy
//! - [`PkiConfig`]: configurable defaults
//! - [`PkiError`]: error type

#![deny(missing_docs)]

pub mod codec;
pub mod config;
pub mod csr;
pub mod error;
pub mod identity;
pub mod keys;
pub mod manager;
pub mod request;
pub mod rotation;

pub use config::PkiConfig;
pub use csr::{build_signing_request, build_signing_request_with, SigningRequest};
pub use error::{PkiError, Result};
pub use identity::{HostSpecifier, ServiceIdentity};
pub use keys::{generate_private_key, key_to_pem, KeyMaterial, DEFAULT_KEY_BITS};
pub use manager::{CertificateManager, PendingRenewal};
pub use request::{CertificateSigningRequest, KeyUsage};
pub use rotation::{should_rotate, CertPemPair, CertificateInfo, RotationPolicy};
