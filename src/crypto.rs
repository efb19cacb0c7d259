//! Password cipher
//!
//! AES-256-GCM with a PBKDF2-HMAC-SHA256 derived key:
//! - 16-byte random salt, 12-byte random nonce
//! - layout `[salt (16)] [nonce (12)] [ciphertext+tag]`, Base64 encoded

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD as B64};
use rand::Rng;
use sha2::Sha256;
use std::fmt;

use crate::config::DeviceSettings;
use crate::error::CryptoError;

const SALT_SIZE: usize = 16;
const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;
const TAG_SIZE: usize = 16;

/// Symmetric cipher for stored device passwords
#[derive(Clone)]
pub struct PasswordCipher {
    secret: String,
    iterations: u32,
}

impl fmt::Debug for PasswordCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCipher")
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}

impl Default for PasswordCipher {
    fn default() -> Self {
        DeviceSettings::default().cipher()
    }
}

impl PasswordCipher {
    pub fn new(secret: &str, iterations: u32) -> Self {
        Self {
            secret: secret.to_string(),
            iterations,
        }
    }

    fn derive_key(&self, salt: &[u8]) -> [u8; KEY_SIZE] {
        let mut key = [0u8; KEY_SIZE];
        pbkdf2::pbkdf2_hmac::<Sha256>(self.secret.as_bytes(), salt, self.iterations, &mut key);
        key
    }

    /// Encrypt a clear-text value. Empty input gives empty output.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        if self.secret.is_empty() {
            return Err(CryptoError::InvalidKey("key is empty".into()));
        }
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let mut rng = rand::thread_rng();
        let mut salt = [0u8; SALT_SIZE];
        rng.fill(&mut salt);
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rng.fill(&mut nonce_bytes);

        let key = self.derive_key(&salt);
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        let mut output = Vec::with_capacity(SALT_SIZE + NONCE_SIZE + ciphertext.len());
        output.extend_from_slice(&salt);
        output.extend_from_slice(&nonce_bytes);
        output.extend_from_slice(&ciphertext);
        Ok(B64.encode(&output))
    }

    /// Decrypt a value produced by [`PasswordCipher::encrypt`].
    pub fn decrypt(&self, encoded: &str) -> Result<String, CryptoError> {
        if self.secret.is_empty() {
            return Err(CryptoError::InvalidKey("key is empty".into()));
        }
        if encoded.is_empty() {
            return Ok(String::new());
        }

        let data = B64
            .decode(encoded)
            .map_err(|e| CryptoError::Decryption(format!("invalid Base64: {}", e)))?;
        if data.len() < SALT_SIZE + NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Decryption("encrypted data too short".into()));
        }

        let (salt, rest) = data.split_at(SALT_SIZE);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);

        let key = self.derive_key(salt);
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CryptoError::Decryption(e.to_string()))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CryptoError::Decryption("wrong key or corrupted data".into()))?;

        String::from_utf8(plaintext)
            .map_err(|e| CryptoError::Decryption(format!("invalid UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> PasswordCipher {
        PasswordCipher::new("unit-test-key", 1_000)
    }

    #[test]
    fn test_encrypt_then_decrypt() {
        let encrypted = cipher().encrypt("s3cr3t pässword").unwrap();
        assert_ne!(encrypted, "s3cr3t pässword");
        assert_eq!(cipher().decrypt(&encrypted).unwrap(), "s3cr3t pässword");
    }

    #[test]
    fn test_salt_makes_output_differ() {
        let c = cipher();
        assert_ne!(c.encrypt("same").unwrap(), c.encrypt("same").unwrap());
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(cipher().encrypt("").unwrap(), "");
        assert_eq!(cipher().decrypt("").unwrap(), "");
    }

    #[test]
    fn test_wrong_key_fails() {
        let encrypted = cipher().encrypt("value").unwrap();
        let other = PasswordCipher::new("another-key", 1_000);
        assert!(matches!(
            other.decrypt(&encrypted),
            Err(CryptoError::Decryption(_))
        ));
    }

    #[test]
    fn test_garbage_input_fails() {
        assert!(cipher().decrypt("not base64 at all!").is_err());
        assert!(cipher().decrypt("c2hvcnQ=").is_err());
    }
}
