//! Configuration for key generation, signing requests and rotation
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```yaml
//! keyBits: 2048
//! signerGroups: ["system:masters", "system:authenticated"]
//! usages: ["digital signature", "key encipherment", "server auth", "client auth"]
//! reserveWindowDays: 180
//! useFqdnAsCommonName: false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PkiError, Result};
use crate::keys::DEFAULT_KEY_BITS;
use crate::request::KeyUsage;
use crate::rotation::RotationPolicy;

/// Group identifiers the signing request is made on behalf of
pub const DEFAULT_SIGNER_GROUPS: [&str; 2] = ["system:masters", "system:authenticated"];

/// Renew when less than this many days of validity remain.
///
/// Half of the assumed one-year certificate lifetime.
pub const DEFAULT_RESERVE_WINDOW_DAYS: i64 = 180;

/// Largest reserve window accepted in configuration, ten years
pub const MAX_RESERVE_WINDOW_DAYS: i64 = 3650;

/// Smallest RSA modulus accepted in configuration
pub const MIN_KEY_BITS: usize = 2048;

/// PKI settings with documented defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PkiConfig {
    /// RSA modulus size for generated keys
    pub key_bits: usize,
    /// Groups placed in the submission object
    pub signer_groups: Vec<String>,
    /// Key usages requested for the certificate
    pub usages: Vec<KeyUsage>,
    /// Renewal threshold before `notAfter`, in days
    pub reserve_window_days: i64,
    /// Use `<service>.<namespace>.svc` as the subject common name
    /// for validators that ignore SANs
    pub use_fqdn_as_common_name: bool,
}

impl Default for PkiConfig {
    fn default() -> Self {
        Self {
            key_bits: DEFAULT_KEY_BITS,
            signer_groups: DEFAULT_SIGNER_GROUPS.iter().map(|g| g.to_string()).collect(),
            usages: KeyUsage::DEFAULTS.to_vec(),
            reserve_window_days: DEFAULT_RESERVE_WINDOW_DAYS,
            use_fqdn_as_common_name: false,
        }
    }
}

impl PkiConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| PkiError::config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            PkiError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&data)
    }

    /// Check values against the minimums the core relies on
    pub fn validate(&self) -> Result<()> {
        if self.key_bits < MIN_KEY_BITS {
            return Err(PkiError::config(format!(
                "keyBits must be at least {}, got {}",
                MIN_KEY_BITS, self.key_bits
            )));
        }
        if !(1..=MAX_RESERVE_WINDOW_DAYS).contains(&self.reserve_window_days) {
            return Err(PkiError::config(format!(
                "reserveWindowDays must be between 1 and {}, got {}",
                MAX_RESERVE_WINDOW_DAYS, self.reserve_window_days
            )));
        }
        if self.signer_groups.iter().any(|g| g.trim().is_empty()) {
            return Err(PkiError::config("signerGroups must not contain empty entries"));
        }
        if self.usages.is_empty() {
            return Err(PkiError::config("usages must not be empty"));
        }
        Ok(())
    }

    /// Rotation policy derived from the reserve window
    ///
    /// Expects a validated config; an out-of-range window is clamped.
    pub fn rotation_policy(&self) -> RotationPolicy {
        let days = self
            .reserve_window_days
            .clamp(1, MAX_RESERVE_WINDOW_DAYS);
        RotationPolicy::new(time::Duration::days(days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = PkiConfig::default();
        assert_eq!(config.key_bits, 2048);
        assert_eq!(
            config.signer_groups,
            vec!["system:masters", "system:authenticated"]
        );
        assert_eq!(config.usages, KeyUsage::DEFAULTS.to_vec());
        assert_eq!(config.reserve_window_days, 180);
        assert!(!config.use_fqdn_as_common_name);
        config.validate().expect("defaults should validate");
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = PkiConfig::from_yaml_str("{}").expect("empty config should parse");
        assert_eq!(config, PkiConfig::default());
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = PkiConfig::from_yaml_str(
            "reserveWindowDays: 30\nuseFqdnAsCommonName: true\nusages: [\"server auth\"]\n",
        )
        .expect("config should parse");
        assert_eq!(config.reserve_window_days, 30);
        assert!(config.use_fqdn_as_common_name);
        assert_eq!(config.usages, vec![KeyUsage::ServerAuth]);
        assert_eq!(config.key_bits, 2048);
        assert_eq!(
            config.rotation_policy().reserve_window(),
            time::Duration::days(30)
        );
    }

    #[test]
    fn small_keys_are_rejected() {
        match PkiConfig::from_yaml_str("keyBits: 1024") {
            Err(PkiError::Config(msg)) => assert!(msg.contains("keyBits")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn non_positive_reserve_window_is_rejected() {
        assert!(matches!(
            PkiConfig::from_yaml_str("reserveWindowDays: 0"),
            Err(PkiError::Config(_))
        ));
    }

    #[test]
    fn oversized_reserve_window_is_rejected() {
        match PkiConfig::from_yaml_str("reserveWindowDays: 9223372036854775807") {
            Err(PkiError::Config(msg)) => assert!(msg.contains("reserveWindowDays")),
            other => panic!("expected Config error, got {other:?}"),
        }
        assert!(matches!(
            PkiConfig::from_yaml_str("reserveWindowDays: 3651"),
            Err(PkiError::Config(_))
        ));
        let config =
            PkiConfig::from_yaml_str("reserveWindowDays: 3650").expect("ten years should be accepted");
        assert_eq!(
            config.rotation_policy().reserve_window(),
            time::Duration::days(3650)
        );
    }

    #[test]
    fn unvalidated_window_does_not_panic() {
        let config = PkiConfig {
            reserve_window_days: i64::MAX,
            ..Default::default()
        };
        assert_eq!(
            config.rotation_policy().reserve_window(),
            time::Duration::days(MAX_RESERVE_WINDOW_DAYS)
        );
    }

    #[test]
    fn unknown_usage_is_a_parse_error() {
        assert!(matches!(
            PkiConfig::from_yaml_str("usages: [\"code signing\"]"),
            Err(PkiError::Config(_))
        ));
    }

    #[test]
    fn config_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file should be created");
        writeln!(file, "signerGroups: [\"system:nodes\"]").expect("write should succeed");

        let config = PkiConfig::from_file(file.path()).expect("config should load");
        assert_eq!(config.signer_groups, vec!["system:nodes"]);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        assert!(matches!(
            PkiConfig::from_file(dir.path().join("absent.yaml")),
            Err(PkiError::Config(_))
        ));
    }
}
