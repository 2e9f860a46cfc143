//! Message encryption using AES-256-GCM
//!
//! All functions are pure - the nonce must be provided by the caller.
//! This enables deterministic testing with fixed nonce sequences.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use zeroize::Zeroizing;

use crate::{derivation::DerivedKey, error::CryptoError};

/// GCM nonce size (12 bytes)
pub const NONCE_SIZE: usize = 12;

/// GCM authentication tag size (16 bytes)
pub const TAG_SIZE: usize = 16;

/// An encrypted message in binary form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedMessage {
    /// The 12-byte GCM nonce
    pub nonce: [u8; NONCE_SIZE],
    /// The ciphertext including the 16-byte tag
    pub ciphertext: Vec<u8>,
}

/// An encrypted message in its text form: both fields standard base64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMessage {
    /// Base64 ciphertext (with tag)
    pub ciphertext: String,
    /// Base64 nonce
    pub nonce: String,
}

impl EncryptedMessage {
    /// Plaintext length (ciphertext length minus authentication tag).
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(TAG_SIZE)
    }

    /// Encode both fields as base64 text.
    pub fn encode(&self) -> EncodedMessage {
        EncodedMessage {
            ciphertext: BASE64.encode(&self.ciphertext),
            nonce: BASE64.encode(self.nonce),
        }
    }

    /// Decode base64 ciphertext and nonce.
    ///
    /// # Errors
    ///
    /// - `MalformedEncoding`: either field is not valid base64
    /// - `InvalidNonceLength`: the nonce is not exactly 12 bytes
    pub fn decode(ciphertext_b64: &str, nonce_b64: &str) -> Result<Self, CryptoError> {
        let ciphertext = BASE64.decode(ciphertext_b64).map_err(|e| {
            CryptoError::MalformedEncoding { field: "ciphertext", reason: e.to_string() }
        })?;
        let nonce_bytes = BASE64
            .decode(nonce_b64)
            .map_err(|e| CryptoError::MalformedEncoding { field: "nonce", reason: e.to_string() })?;

        let nonce: [u8; NONCE_SIZE] = nonce_bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidNonceLength { got: nonce_bytes.len() })?;

        Ok(Self { nonce, ciphertext })
    }
}

/// Encrypt a message using AES-256-GCM with no associated data.
///
/// # Security
///
/// - Caller MUST provide a fresh nonce from a CSPRNG for every call under the
///   same key; GCM loses confidentiality and integrity on nonce reuse
/// - Output length is `plaintext.len() + TAG_SIZE`
pub fn encrypt_message(
    plaintext: &[u8],
    key: &DerivedKey,
    nonce: [u8; NONCE_SIZE],
) -> EncryptedMessage {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let Ok(ciphertext) = cipher.encrypt(Nonce::from_slice(&nonce), plaintext) else {
        unreachable!("AES-256-GCM encryption cannot fail below the 64 GiB plaintext limit");
    };

    EncryptedMessage { nonce, ciphertext }
}

/// Decrypt and verify a message using AES-256-GCM.
///
/// Plaintext is only released after the tag verifies.
///
/// # Errors
///
/// - `AuthenticationFailed`: wrong key, tampered ciphertext or nonce
pub fn decrypt_message(
    encrypted: &EncryptedMessage,
    key: &DerivedKey,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    cipher
        .decrypt(Nonce::from_slice(&encrypted.nonce), encrypted.ciphertext.as_slice())
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::AuthenticationFailed)
}
