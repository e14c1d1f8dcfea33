//! Encryption of third-party secrets at rest (OAuth tokens, AI API keys).
//!
//! AES-256-GCM with a key derived from the configured secret via HKDF-SHA256.
//! Stored form is `v1:` followed by base64(nonce || ciphertext).

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use hkdf::Hkdf;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::domain::DomainError;

const PREFIX: &str = "v1:";
const NONCE_LEN: usize = 12;
const HKDF_INFO: &[u8] = b"brandhub token vault v1";

#[derive(Clone)]
pub struct TokenVault {
    cipher: Aes256Gcm,
}

impl TokenVault {
    pub fn new(secret: &SecretString) -> Self {
        let hk = Hkdf::<Sha256>::new(None, secret.expose_secret().as_bytes());
        let mut okm = [0u8; 32];
        // 32 bytes is far below the HKDF-SHA256 output limit
        hk.expand(HKDF_INFO, &mut okm)
            .unwrap_or_else(|_| unreachable!("valid HKDF output length"));
        let key = Key::<Aes256Gcm>::from_slice(&okm);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, DomainError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| DomainError::Internal("encryption failed".to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(format!("{}{}", PREFIX, STANDARD.encode(blob)))
    }

    pub fn decrypt(&self, stored: &str) -> Result<String, DomainError> {
        let encoded = stored
            .strip_prefix(PREFIX)
            .ok_or_else(|| DomainError::Internal("unknown secret format".to_string()))?;
        let blob = STANDARD
            .decode(encoded)
            .map_err(|e| DomainError::Internal(format!("corrupt secret: {}", e)))?;
        if blob.len() <= NONCE_LEN {
            return Err(DomainError::Internal("corrupt secret: too short".to_string()));
        }

        let (nonce, ciphertext) = blob.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| DomainError::Internal("secret could not be decrypted".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|e| DomainError::Internal(format!("corrupt secret: {}", e)))
    }

    pub fn encrypt_opt(&self, plaintext: Option<&str>) -> Result<Option<String>, DomainError> {
        plaintext.map(|p| self.encrypt(p)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault(secret: &str) -> TokenVault {
        TokenVault::new(&SecretString::new(secret.to_string()))
    }

    #[test]
    fn test_encrypt_hides_plaintext_and_decrypts() {
        let v = vault("key-one");
        let stored = v.encrypt("ya29.token-value").unwrap();
        assert!(stored.starts_with("v1:"));
        assert!(!stored.contains("ya29"));
        assert_eq!(v.decrypt(&stored).unwrap(), "ya29.token-value");

        // Fresh nonce per call
        assert_ne!(stored, v.encrypt("ya29.token-value").unwrap());
    }

    #[test]
    fn test_wrong_key_and_tampering_are_rejected() {
        let stored = vault("key-one").encrypt("secret").unwrap();
        assert!(vault("key-two").decrypt(&stored).is_err());
        assert!(vault("key-one").decrypt("plain-text").is_err());
        assert!(vault("key-one").decrypt("v1:AAAA").is_err());
    }
}
