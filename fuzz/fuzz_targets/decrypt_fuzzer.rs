//! Fuzz target for message decryption
//!
//! # Strategy
//!
//! - Arbitrary text: ciphertext and nonce fields that may not be base64
//! - Arbitrary bytes: well-formed base64 of random bytes and nonce lengths
//! - Tampering: a genuine message with one byte of ciphertext or nonce flipped
//!
//! # Invariants
//!
//! - Decryption NEVER panics on malformed input
//! - Malformed fields surface as errors, never as plaintext
//! - A tampered message never authenticates
//! - An untouched message always decrypts to its plaintext

#![no_main]

use std::sync::OnceLock;

use arbitrary::Arbitrary;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use ciphernet_crypto::{
    DerivedKey, EncryptedMessage, NONCE_SIZE, SharedSecret, decrypt_message, derive_key,
    encrypt_message,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum DecryptInput {
    Text { ciphertext: String, nonce: String },
    Bytes { ciphertext: Vec<u8>, nonce: Vec<u8> },
    Tampered {
        plaintext: Vec<u8>,
        nonce: [u8; NONCE_SIZE],
        position: u16,
        flip: u8,
        in_nonce: bool,
    },
}

/// PBKDF2 is far too slow to run per input; derive once.
fn key() -> &'static DerivedKey {
    static KEY: OnceLock<DerivedKey> = OnceLock::new();
    KEY.get_or_init(|| {
        derive_key(
            &SharedSecret::new("fuzz"),
            "aaaaaaaaaaaaaaaaaaaaaaaaaaaa1111",
            "bbbbbbbbbbbbbbbbbbbbbbbbbbbb2222",
        )
    })
}

fuzz_target!(|input: DecryptInput| {
    match input {
        DecryptInput::Text { ciphertext, nonce } => {
            if let Ok(message) = EncryptedMessage::decode(&ciphertext, &nonce) {
                let _ = decrypt_message(&message, key());
            }
        },
        DecryptInput::Bytes { ciphertext, nonce } => {
            let ciphertext_b64 = BASE64.encode(&ciphertext);
            let nonce_b64 = BASE64.encode(&nonce);

            match EncryptedMessage::decode(&ciphertext_b64, &nonce_b64) {
                Ok(message) => {
                    assert_eq!(nonce.len(), NONCE_SIZE);
                    // Random bytes never carry a valid tag under our key.
                    assert!(decrypt_message(&message, key()).is_err());
                },
                Err(err) => {
                    assert_ne!(nonce.len(), NONCE_SIZE);
                    assert!(err.is_malformed());
                },
            }
        },
        DecryptInput::Tampered { plaintext, nonce, position, flip, in_nonce } => {
            let mut message = encrypt_message(&plaintext, key(), nonce);

            let opened = decrypt_message(&message, key()).expect("untouched message decrypts");
            assert_eq!(opened.as_slice(), plaintext.as_slice());

            if flip == 0 {
                return;
            }
            if in_nonce {
                message.nonce[position as usize % NONCE_SIZE] ^= flip;
            } else {
                let index = position as usize % message.ciphertext.len();
                message.ciphertext[index] ^= flip;
            }
            assert!(decrypt_message(&message, key()).is_err(), "tampered message authenticated");
        },
    }
});
