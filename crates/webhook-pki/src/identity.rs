//! Service identity a webhook serving certificate is issued for

use std::fmt;
use std::net::IpAddr;

use crate::error::{PkiError, Result};

/// Suffix of the in-cluster service DNS name
const SERVICE_DOMAIN_SUFFIX: &str = "svc";

/// Suffix of the generated CertificateSigningRequest resource name
const CERT_REQUEST_SUFFIX: &str = "cert-request";

/// How the API server host is addressed in the certificate
///
/// Parsed once from the configured host so the IP and DNS SAN assembly
/// steps agree on the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostSpecifier {
    /// Literal IPv4/IPv6 address, goes into the IP SAN set
    IpAddress(IpAddr),
    /// Anything else, goes into the DNS SAN set
    DnsName(String),
}

impl HostSpecifier {
    /// Classify a host string. Returns `None` for an empty host.
    pub fn parse(host: &str) -> Option<Self> {
        let host = host.trim();
        if host.is_empty() {
            return None;
        }
        Some(match host.parse::<IpAddr>() {
            Ok(ip) => Self::IpAddress(ip),
            Err(_) => Self::DnsName(host.to_string()),
        })
    }

    /// The IP address, if this host is an IP literal
    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            Self::IpAddress(ip) => Some(*ip),
            Self::DnsName(_) => None,
        }
    }

    /// The DNS name, if this host is not an IP literal
    pub fn dns_name(&self) -> Option<&str> {
        match self {
            Self::IpAddress(_) => None,
            Self::DnsName(name) => Some(name),
        }
    }
}

impl fmt::Display for HostSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IpAddress(ip) => write!(f, "{ip}"),
            Self::DnsName(name) => f.write_str(name),
        }
    }
}

/// Identity of the in-cluster service that will serve with the certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    service: String,
    namespace: String,
    api_server_host: Option<HostSpecifier>,
}

impl ServiceIdentity {
    /// Create an identity, rejecting an empty service or namespace
    ///
    /// Surrounding whitespace is stripped from every component.
    pub fn new(
        service: impl AsRef<str>,
        namespace: impl AsRef<str>,
        api_server_host: impl AsRef<str>,
    ) -> Result<Self> {
        let service = service.as_ref().trim();
        let namespace = namespace.as_ref().trim();

        if service.is_empty() {
            return Err(PkiError::invalid_identity("service must not be empty"));
        }
        if namespace.is_empty() {
            return Err(PkiError::invalid_identity("namespace must not be empty"));
        }

        Ok(Self {
            service: service.to_string(),
            namespace: namespace.to_string(),
            api_server_host: HostSpecifier::parse(api_server_host.as_ref()),
        })
    }

    /// Short service name
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Namespace the service lives in
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The classified API server host, if one was given
    pub fn api_server_host(&self) -> Option<&HostSpecifier> {
        self.api_server_host.as_ref()
    }

    /// `<service>.<namespace>`
    pub fn namespaced_name(&self) -> String {
        format!("{}.{}", self.service, self.namespace)
    }

    /// Fully-qualified in-cluster name, `<service>.<namespace>.svc`
    pub fn in_cluster_name(&self) -> String {
        format!("{}.{}", self.namespaced_name(), SERVICE_DOMAIN_SUFFIX)
    }

    /// Name of the CertificateSigningRequest resource for this service
    pub fn cert_request_name(&self) -> String {
        format!("{}.{}", self.namespaced_name(), CERT_REQUEST_SUFFIX)
    }
}
