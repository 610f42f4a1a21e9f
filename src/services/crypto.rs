// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password transport encoding for the login and register endpoints.
//!
//! The backend accepts either the plain password or an "obscured" form:
//! AES-256-CBC with a key derived as SHA-256 of a pre-shared secret, a
//! random 16-byte IV prefixed to the PKCS#7-padded ciphertext, base64.
//!
//! The secret ships with every client, so the obscured form only hides the
//! password from casual inspection. It is not a substitute for TLS.

use crate::config::ConfigError;
use crate::error::AppError;
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use std::str::FromStr;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const IV_LEN: usize = 16;

/// How a password travels to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordTransport {
    /// AES-CBC with the pre-shared secret (what the web clients send)
    Obscured,
    /// As typed; confidentiality comes from TLS alone
    Plain,
}

impl FromStr for PasswordTransport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "obscured" | "aes" => Ok(PasswordTransport::Obscured),
            "plain" | "tls" => Ok(PasswordTransport::Plain),
            _ => Err(ConfigError::Invalid("PASSWORD_TRANSPORT", s.to_string())),
        }
    }
}

/// Encodes passwords for transport.
#[derive(Clone)]
pub struct PasswordCipher {
    transport: PasswordTransport,
    key: [u8; 32],
    rng: SystemRandom,
}

impl PasswordCipher {
    pub fn new(transport: PasswordTransport, secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self {
            transport,
            key,
            rng: SystemRandom::new(),
        }
    }

    pub fn transport(&self) -> PasswordTransport {
        self.transport
    }

    /// Encode a password according to the configured transport.
    pub fn seal(&self, password: &str) -> Result<String, AppError> {
        match self.transport {
            PasswordTransport::Plain => Ok(password.to_string()),
            PasswordTransport::Obscured => self.encrypt(password),
        }
    }

    /// Encrypt to `base64(iv || ciphertext)`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, AppError> {
        let mut iv = [0u8; IV_LEN];
        self.rng
            .fill(&mut iv)
            .map_err(|_| AppError::Crypto("random IV generation failed".to_string()))?;

        let cipher = Aes256CbcEnc::new_from_slices(&self.key, &iv)
            .map_err(|e| AppError::Crypto(e.to_string()))?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        let mut combined = Vec::with_capacity(IV_LEN + ciphertext.len());
        combined.extend_from_slice(&iv);
        combined.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(combined))
    }

    /// Reverse of [`PasswordCipher::encrypt`].
    pub fn decrypt(&self, encoded: &str) -> Result<String, AppError> {
        let combined = BASE64
            .decode(encoded.trim())
            .map_err(|e| AppError::Crypto(format!("base64 decode failed: {}", e)))?;
        if combined.len() <= IV_LEN {
            return Err(AppError::Crypto("ciphertext too short".to_string()));
        }
        let (iv, ciphertext) = combined.split_at(IV_LEN);

        let cipher = Aes256CbcDec::new_from_slices(&self.key, iv)
            .map_err(|e| AppError::Crypto(e.to_string()))?;
        let plaintext = cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| AppError::Crypto("bad padding (wrong secret?)".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|e| AppError::Crypto(format!("UTF-8 decode failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Heuristic the server applies to decide whether a password is obscured.
    fn looks_obscured(password: &str) -> bool {
        password.len() >= 20 && BASE64.decode(password).is_ok()
    }

    #[test]
    fn test_encrypt_decrypt() {
        let cipher = PasswordCipher::new(PasswordTransport::Obscured, "eternalmoon");
        let sealed = cipher.seal("hunter22").unwrap();
        assert_eq!(cipher.transport(), PasswordTransport::Obscured);

        assert_ne!(sealed, "hunter22");
        assert!(looks_obscured(&sealed));
        assert_eq!(cipher.decrypt(&sealed).unwrap(), "hunter22");
    }

    #[test]
    fn test_random_iv_changes_ciphertext() {
        let cipher = PasswordCipher::new(PasswordTransport::Obscured, "eternalmoon");
        let a = cipher.encrypt("same password").unwrap();
        let b = cipher.encrypt("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_secret_fails() {
        let sender = PasswordCipher::new(PasswordTransport::Obscured, "eternalmoon");
        let receiver = PasswordCipher::new(PasswordTransport::Obscured, "other");
        let sealed = sender.encrypt("12345678").unwrap();

        // Wrong key yields garbage; padding check or UTF-8 check must catch it
        // or, rarely, produce a different string.
        match receiver.decrypt(&sealed) {
            Ok(text) => assert_ne!(text, "12345678"),
            Err(e) => assert!(matches!(e, AppError::Crypto(_))),
        }
    }

    #[test]
    fn test_plain_transport_passes_through() {
        let cipher = PasswordCipher::new(PasswordTransport::Plain, "eternalmoon");
        assert_eq!(cipher.seal("hunter22").unwrap(), "hunter22");
        assert!(!looks_obscured("hunter22"));
    }
}
