//! PEM framing for keys, signing requests and certificates
//!
//! Output is byte-stable across platforms: 64-column base64 body, LF line
//! endings and a trailing newline after the footer.

use ::pem::{EncodeConfig, LineEnding, Pem};

use crate::error::{PkiError, Result};

/// PEM block type for private keys
pub const PRIVATE_KEY_TAG: &str = "PRIVATE KEY";

/// PEM block type for certificate signing requests
pub const CERTIFICATE_REQUEST_TAG: &str = "CERTIFICATE REQUEST";

/// PEM block type for certificates
pub const CERTIFICATE_TAG: &str = "CERTIFICATE";

const ENCODE_CONFIG: EncodeConfig = EncodeConfig::new().set_line_ending(LineEnding::LF);

/// Frame DER bytes as a single PEM block with the given tag
pub fn encode_block(tag: &str, der: &[u8]) -> String {
    ::pem::encode_config(&Pem::new(tag, der.to_vec()), ENCODE_CONFIG)
}

/// Decode the first PEM block and return its DER payload if it is a certificate
pub fn decode_certificate(pem_data: &[u8]) -> Result<Vec<u8>> {
    let block = ::pem::parse(pem_data)
        .map_err(|e| PkiError::CertDecodeFailed(format!("failed to parse PEM: {}", e)))?;

    if block.tag() != CERTIFICATE_TAG {
        return Err(PkiError::CertDecodeFailed(format!(
            "expected {} block, found {}",
            CERTIFICATE_TAG,
            block.tag()
        )));
    }

    Ok(block.into_contents())
}
