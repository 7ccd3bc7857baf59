//! Signing request construction for webhook serving certificates
//!
//! The request names the service three ways (`svc`, `svc.ns`, `svc.ns.svc`)
//! and adds the API server host to either the IP or DNS SAN set depending on
//! whether it is an IP literal.

use std::net::IpAddr;

use rcgen::{string::Ia5String, CertificateParams, DistinguishedName, DnType, DnValue, SanType};
use tracing::debug;

use crate::codec::{encode_block, CERTIFICATE_REQUEST_TAG};
use crate::config::PkiConfig;
use crate::error::{PkiError, Result};
use crate::identity::{HostSpecifier, ServiceIdentity};
use crate::keys::KeyMaterial;
use crate::request::{CertificateSigningRequest, KeyUsage};

/// A built signing request and the subject metadata it was built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRequest {
    csr_pem: Vec<u8>,
    common_name: String,
    dns_names: Vec<String>,
    ip_addresses: Vec<IpAddr>,
    usages: Vec<KeyUsage>,
    groups: Vec<String>,
    resource_name: String,
}

impl SigningRequest {
    /// PEM-encoded `CERTIFICATE REQUEST` block
    pub fn csr_pem(&self) -> &[u8] {
        &self.csr_pem
    }

    /// Subject common name
    pub fn common_name(&self) -> &str {
        &self.common_name
    }

    /// DNS subject alternative names, in request order
    pub fn dns_names(&self) -> &[String] {
        &self.dns_names
    }

    /// IP subject alternative names
    pub fn ip_addresses(&self) -> &[IpAddr] {
        &self.ip_addresses
    }

    /// Requested key usages
    pub fn usages(&self) -> &[KeyUsage] {
        &self.usages
    }

    /// Requested signer groups
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Name of the submission resource
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// Wrap into the object submitted to the signing subsystem
    pub fn to_submission(&self) -> CertificateSigningRequest {
        CertificateSigningRequest::new(
            self.resource_name.clone(),
            self.csr_pem.clone(),
            self.groups.clone(),
            self.usages.clone(),
        )
    }
}

/// DNS SANs: the service name forms, plus the API server host if it is not an IP
pub fn dns_names(identity: &ServiceIdentity) -> Vec<String> {
    let mut names = vec![
        identity.service().to_string(),
        identity.namespaced_name(),
        identity.in_cluster_name(),
    ];
    if let Some(name) = identity.api_server_host().and_then(HostSpecifier::dns_name) {
        names.push(name.to_string());
    }
    names
}

/// IP SANs: the API server host if it is an IP literal
pub fn ip_addresses(identity: &ServiceIdentity) -> Vec<IpAddr> {
    identity
        .api_server_host()
        .and_then(HostSpecifier::ip)
        .into_iter()
        .collect()
}

/// Build a signing request with default signer groups and usages
pub fn build_signing_request(
    key: &KeyMaterial,
    identity: &ServiceIdentity,
    use_fqdn_as_common_name: bool,
) -> Result<SigningRequest> {
    let config = PkiConfig {
        use_fqdn_as_common_name,
        ..Default::default()
    };
    build_signing_request_with(key, identity, &config)
}

/// Build a signing request using groups, usages and CN policy from `config`
pub fn build_signing_request_with(
    key: &KeyMaterial,
    identity: &ServiceIdentity,
    config: &PkiConfig,
) -> Result<SigningRequest> {
    let common_name = if config.use_fqdn_as_common_name {
        identity.in_cluster_name()
    } else {
        identity.service().to_string()
    };
    let dns_names = dns_names(identity);
    let ip_addresses = ip_addresses(identity);

    let mut params = CertificateParams::default();

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, DnValue::Utf8String(common_name.clone()));
    params.distinguished_name = dn;

    let mut sans = Vec::with_capacity(dns_names.len() + ip_addresses.len());
    for name in &dns_names {
        let ia5 = Ia5String::try_from(name.clone())
            .map_err(|e| PkiError::csr(format!("invalid DNS name '{}': {}", name, e)))?;
        sans.push(SanType::DnsName(ia5));
    }
    sans.extend(ip_addresses.iter().copied().map(SanType::IpAddress));
    params.subject_alt_names = sans;

    let signing_key = key.signing_key()?;
    let csr = params
        .serialize_request(&signing_key)
        .map_err(|e| PkiError::csr(format!("failed to create CSR: {}", e)))?;
    let der: &[u8] = csr.der();
    let csr_pem = encode_block(CERTIFICATE_REQUEST_TAG, der).into_bytes();

    debug!(
        service = identity.service(),
        namespace = identity.namespace(),
        common_name = %common_name,
        dns_sans = dns_names.len(),
        ip_sans = ip_addresses.len(),
        "built certificate signing request"
    );

    Ok(SigningRequest {
        csr_pem,
        common_name,
        dns_names,
        ip_addresses,
        usages: config.usages.clone(),
        groups: config.signer_groups.clone(),
        resource_name: identity.cert_request_name(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::tests::shared_key;
    use x509_parser::prelude::{FromDer, GeneralName, ParsedExtension, X509CertificationRequest};

    /// Subject and SANs as read back out of the DER request
    struct ParsedRequest {
        common_name: String,
        dns_names: Vec<String>,
        ip_addresses: Vec<IpAddr>,
        signature_oid: String,
    }

    fn parse_request(request: &SigningRequest) -> ParsedRequest {
        let block = ::pem::parse(request.csr_pem()).expect("CSR PEM should parse");
        assert_eq!(block.tag(), "CERTIFICATE REQUEST");

        let (_, csr) = X509CertificationRequest::from_der(block.contents())
            .expect("CSR DER should parse");
        csr.verify_signature()
            .expect("CSR should be self-signed by the key");

        let common_name = csr
            .certification_request_info
            .subject
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .unwrap_or("")
            .to_string();

        let mut dns_names = Vec::new();
        let mut ip_addresses = Vec::new();
        for ext in csr.requested_extensions().into_iter().flatten() {
            if let ParsedExtension::SubjectAlternativeName(san) = ext {
                for name in &san.general_names {
                    match name {
                        GeneralName::DNSName(dns) => dns_names.push(dns.to_string()),
                        GeneralName::IPAddress(bytes) => ip_addresses.push(match bytes.len() {
                            4 => IpAddr::from(<[u8; 4]>::try_from(*bytes).expect("IPv4 bytes")),
                            16 => IpAddr::from(<[u8; 16]>::try_from(*bytes).expect("IPv6 bytes")),
                            n => panic!("unexpected IP SAN length {n}"),
                        }),
                        _ => {}
                    }
                }
            }
        }

        ParsedRequest {
            common_name,
            dns_names,
            ip_addresses,
            signature_oid: csr.signature_algorithm.algorithm.to_id_string(),
        }
    }

    fn identity(host: &str) -> ServiceIdentity {
        ServiceIdentity::new("webhook", "kube-system", host).expect("identity should be valid")
    }

    /// Story: the webhook in kube-system requests a serving certificate that
    /// the API server at 10.0.0.1 can also validate
    #[test]
    fn story_webhook_in_kube_system() {
        let request = build_signing_request(shared_key(), &identity("10.0.0.1"), false)
            .expect("CSR build should succeed");

        assert_eq!(
            request.dns_names(),
            ["webhook", "webhook.kube-system", "webhook.kube-system.svc"]
        );
        assert_eq!(request.ip_addresses(), ["10.0.0.1".parse::<IpAddr>().expect("valid IP")]);
        assert_eq!(request.common_name(), "webhook");
        assert_eq!(request.resource_name(), "webhook.kube-system.cert-request");
        assert_eq!(request.usages(), KeyUsage::DEFAULTS);
        assert_eq!(request.groups(), ["system:masters", "system:authenticated"]);

        // The DER request carries the same subject
        let parsed = parse_request(&request);
        assert_eq!(parsed.common_name, "webhook");
        assert_eq!(parsed.dns_names, request.dns_names());
        assert_eq!(parsed.ip_addresses, request.ip_addresses());
    }

    #[test]
    fn request_is_signed_with_sha256_rsa() {
        let request = build_signing_request(shared_key(), &identity("10.0.0.1"), false)
            .expect("CSR build should succeed");
        assert_eq!(parse_request(&request).signature_oid, "1.2.840.113549.1.1.11");
    }

    #[test]
    fn fqdn_common_name_when_requested() {
        let request = build_signing_request(shared_key(), &identity("10.0.0.1"), true)
            .expect("CSR build should succeed");
        assert_eq!(request.common_name(), "webhook.kube-system.svc");
        assert_eq!(parse_request(&request).common_name, "webhook.kube-system.svc");
    }

    #[test]
    fn hostname_goes_to_dns_sans_only() {
        let request =
            build_signing_request(shared_key(), &identity("api.cluster.local"), false)
                .expect("CSR build should succeed");

        assert_eq!(request.dns_names().last().map(String::as_str), Some("api.cluster.local"));
        assert!(request.ip_addresses().is_empty());

        let parsed = parse_request(&request);
        assert!(parsed.dns_names.contains(&"api.cluster.local".to_string()));
        assert!(parsed.ip_addresses.is_empty());
    }

    #[test]
    fn ipv6_host_goes_to_ip_sans_only() {
        let request = build_signing_request(shared_key(), &identity("fd00::1"), false)
            .expect("CSR build should succeed");

        let ip: IpAddr = "fd00::1".parse().expect("valid IP");
        assert_eq!(request.ip_addresses(), [ip]);
        assert!(!request.dns_names().iter().any(|n| n == "fd00::1"));
        assert_eq!(parse_request(&request).ip_addresses, vec![ip]);
    }

    #[test]
    fn service_name_forms_always_present() {
        for (service, namespace) in [("a", "b"), ("policy-webhook", "policy-system")] {
            let id = ServiceIdentity::new(service, namespace, "").expect("identity should be valid");
            let names = dns_names(&id);
            assert!(names.contains(&service.to_string()));
            assert!(names.contains(&format!("{service}.{namespace}")));
            assert!(names.contains(&format!("{service}.{namespace}.svc")));
            assert_eq!(names.len(), 3);
            assert!(ip_addresses(&id).is_empty());
        }
    }

    #[test]
    fn padded_names_yield_clean_sans() {
        let id = ServiceIdentity::new("webhook ", " kube-system", "10.0.0.1")
            .expect("identity should be valid");
        let request = build_signing_request(shared_key(), &id, false)
            .expect("CSR build should succeed");
        assert_eq!(
            parse_request(&request).dns_names,
            ["webhook", "webhook.kube-system", "webhook.kube-system.svc"]
        );
        assert_eq!(request.resource_name(), "webhook.kube-system.cert-request");
    }

    #[test]
    fn non_ascii_service_fails_build() {
        let id = ServiceIdentity::new("wébhook", "default", "10.0.0.1")
            .expect("identity should be valid");
        assert!(matches!(
            build_signing_request(shared_key(), &id, false),
            Err(PkiError::CsrBuildFailed(_))
        ));
    }

    #[test]
    fn config_controls_groups_and_usages() {
        let config = PkiConfig {
            signer_groups: vec!["system:nodes".to_string()],
            usages: vec![KeyUsage::ServerAuth],
            ..Default::default()
        };
        let request = build_signing_request_with(shared_key(), &identity("10.0.0.1"), &config)
            .expect("CSR build should succeed");
        assert_eq!(request.groups(), ["system:nodes"]);
        assert_eq!(request.usages(), [KeyUsage::ServerAuth]);
    }

    #[test]
    fn submission_wraps_pem_request() {
        let request = build_signing_request(shared_key(), &identity("10.0.0.1"), false)
            .expect("CSR build should succeed");
        let submission = request.to_submission();

        assert_eq!(submission.name(), "webhook.kube-system.cert-request");
        assert_eq!(submission.spec.request.0, request.csr_pem());
        assert_eq!(submission.spec.groups, request.groups());
        assert_eq!(submission.spec.usages, request.usages());
    }
}
