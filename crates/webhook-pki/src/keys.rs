//! RSA key generation and serialization

use rand::rngs::OsRng;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use zeroize::Zeroizing;

use crate::codec::{encode_block, PRIVATE_KEY_TAG};
use crate::error::{PkiError, Result};

/// Default RSA modulus size in bits
pub const DEFAULT_KEY_BITS: usize = 2048;

/// An RSA private key owned by the caller
#[derive(Clone)]
pub struct KeyMaterial {
    key: RsaPrivateKey,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

impl KeyMaterial {
    /// Modulus size in bits
    pub fn bits(&self) -> usize {
        self.key.size() * 8
    }

    /// Access the underlying RSA key
    pub fn rsa(&self) -> &RsaPrivateKey {
        &self.key
    }

    /// Encode as a `PRIVATE KEY` PEM block carrying the PKCS#1 DER payload
    pub fn to_pem(&self) -> Zeroizing<Vec<u8>> {
        // PKCS#1 encoding of a valid RsaPrivateKey cannot fail
        let der = self
            .key
            .to_pkcs1_der()
            .expect("PKCS#1 encoding of a generated RSA key");
        Zeroizing::new(encode_block(PRIVATE_KEY_TAG, der.as_bytes()).into_bytes())
    }

    /// Build an rcgen signing key (SHA-256 with RSA) from this key
    pub(crate) fn signing_key(&self) -> Result<rcgen::KeyPair> {
        let pkcs8_pem = self
            .key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| PkiError::csr(format!("failed to encode key as PKCS#8: {}", e)))?;
        rcgen::KeyPair::from_pem_and_sign_algo(&pkcs8_pem, &rcgen::PKCS_RSA_SHA256)
            .map_err(|e| PkiError::csr(format!("failed to load signing key: {}", e)))
    }
}

impl From<RsaPrivateKey> for KeyMaterial {
    fn from(key: RsaPrivateKey) -> Self {
        Self { key }
    }
}

/// Generate a fresh RSA private key from the OS random source
pub fn generate_private_key(bits: usize) -> Result<KeyMaterial> {
    let key = RsaPrivateKey::new(&mut OsRng, bits).map_err(|e| {
        PkiError::KeyGenerationFailed(format!("failed to generate {}-bit RSA key: {}", bits, e))
    })?;
    Ok(KeyMaterial { key })
}

/// Encode a key as PEM, see [`KeyMaterial::to_pem`]
pub fn key_to_pem(key: &KeyMaterial) -> Zeroizing<Vec<u8>> {
    key.to_pem()
}
