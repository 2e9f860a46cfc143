//! Error types for cryptographic operations.

use thiserror::Error;

/// Errors from decoding or opening an encrypted message.
///
/// These never reach end users directly: the message cipher in
/// `ciphernet-core` folds every variant into a single "decryption failed"
/// outcome so that a wrong passphrase cannot be told apart from tampering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A text field was not valid base64
    #[error("malformed {field}: {reason}")]
    MalformedEncoding {
        /// Which field failed to decode (`ciphertext` or `nonce`)
        field: &'static str,
        /// Decoder error message
        reason: String,
    },

    /// Nonce decoded to the wrong number of bytes
    #[error("invalid nonce length: expected 12 bytes, got {got}")]
    InvalidNonceLength {
        /// Decoded length
        got: usize,
    },

    /// AEAD tag verification failed (wrong key, tampered data or nonce)
    #[error("authentication failed")]
    AuthenticationFailed,
}

impl CryptoError {
    /// Returns true if the input could not even be parsed.
    ///
    /// Parse failures point at corrupted storage or a broken peer, while
    /// authentication failures usually mean the passphrase is wrong.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedEncoding { .. } | Self::InvalidNonceLength { .. })
    }
}
