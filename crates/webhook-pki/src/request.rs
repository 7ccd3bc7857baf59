//! CertificateSigningRequest submission object
//!
//! Mirrors `certificates.k8s.io/v1beta1` closely enough for the signing
//! subsystem to accept it. The request bytes are a `ByteString`, so JSON and
//! YAML renderings carry them base64-encoded as the API server expects.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use serde::{Deserialize, Serialize};

use crate::error::{PkiError, Result};

/// API version of the submission object
pub const CSR_API_VERSION: &str = "certificates.k8s.io/v1beta1";

/// Kind of the submission object
pub const CSR_KIND: &str = "CertificateSigningRequest";

/// Key usage requested for the issued certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyUsage {
    /// digitalSignature key usage
    #[serde(rename = "digital signature")]
    DigitalSignature,
    /// keyEncipherment key usage
    #[serde(rename = "key encipherment")]
    KeyEncipherment,
    /// TLS web server authentication
    #[serde(rename = "server auth")]
    ServerAuth,
    /// TLS web client authentication
    #[serde(rename = "client auth")]
    ClientAuth,
}

impl KeyUsage {
    /// Usages requested for webhook serving certificates
    pub const DEFAULTS: [KeyUsage; 4] = [
        KeyUsage::DigitalSignature,
        KeyUsage::KeyEncipherment,
        KeyUsage::ServerAuth,
        KeyUsage::ClientAuth,
    ];

    /// Wire name of the usage
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyUsage::DigitalSignature => "digital signature",
            KeyUsage::KeyEncipherment => "key encipherment",
            KeyUsage::ServerAuth => "server auth",
            KeyUsage::ClientAuth => "client auth",
        }
    }
}

impl std::fmt::Display for KeyUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spec of a CertificateSigningRequest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSigningRequestSpec {
    /// PEM-encoded PKCS#10 request
    pub request: ByteString,
    /// Groups the request is made on behalf of
    pub groups: Vec<String>,
    /// Requested key usages
    pub usages: Vec<KeyUsage>,
}

/// CertificateSigningRequest handed to the external signing subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSigningRequest {
    /// Always [`CSR_API_VERSION`]
    pub api_version: String,
    /// Always [`CSR_KIND`]
    pub kind: String,
    /// Object metadata, only the name is set
    pub metadata: ObjectMeta,
    /// Request payload
    pub spec: CertificateSigningRequestSpec,
}

impl CertificateSigningRequest {
    /// Create a submission object for the given resource name and PEM request
    pub fn new(
        name: impl Into<String>,
        request_pem: Vec<u8>,
        groups: Vec<String>,
        usages: Vec<KeyUsage>,
    ) -> Self {
        Self {
            api_version: CSR_API_VERSION.to_string(),
            kind: CSR_KIND.to_string(),
            metadata: ObjectMeta {
                name: Some(name.into()),
                ..Default::default()
            },
            spec: CertificateSigningRequestSpec {
                request: ByteString(request_pem),
                groups,
                usages,
            },
        }
    }

    /// Resource name, `<service>.<namespace>.cert-request`
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| PkiError::Serialization(format!("failed to render CSR as YAML: {}", e)))
    }

    /// Render as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PkiError::Serialization(format!("failed to render CSR as JSON: {}", e)))
    }
}
