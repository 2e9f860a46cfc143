//! Sealing and opening messages for a conversation.
//!
//! The key for a pair of participants is re-derived from the shared passphrase
//! on every call and never cached: keys exist only for the duration of one
//! encrypt or decrypt. Nonces, message ids and timestamps come from the
//! injected [`Environment`].
//!
//! Opening never errors. A wrong passphrase, a tampered envelope and malformed
//! base64 all collapse into [`Decryption::Failed`], which callers render as a
//! placeholder rather than an error.

use ciphernet_crypto::{
    EncodedMessage, EncryptedMessage, NONCE_SIZE, SharedSecret, decrypt_message, derive_key,
    encrypt_message,
};

use crate::{
    env::Environment, envelope::MessageEnvelope, error::EntropyError, identity::Identity,
};

/// Text shown in place of a message that failed to open
pub const DECRYPTION_FAILED_MARKER: &str = "[DECRYPTION_FAILED]";

/// Outcome of opening one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decryption {
    /// Authenticated plaintext. Invalid UTF-8 is replaced with U+FFFD.
    Plaintext(String),
    /// Wrong key, tampered data, or undecodable fields
    Failed,
}

impl Decryption {
    /// True if the message could not be opened.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Plaintext, if any.
    pub fn plaintext(&self) -> Option<&str> {
        match self {
            Self::Plaintext(text) => Some(text),
            Self::Failed => None,
        }
    }

    /// Display text: the plaintext or [`DECRYPTION_FAILED_MARKER`].
    pub fn display_text(&self) -> &str {
        self.plaintext().unwrap_or(DECRYPTION_FAILED_MARKER)
    }
}

/// Conversation-scoped encryption engine.
#[derive(Clone)]
pub struct MessageCipher<E: Environment> {
    env: E,
}

impl<E: Environment> MessageCipher<E> {
    /// Create an engine drawing randomness and time from `env`.
    pub fn new(env: E) -> Self {
        Self { env }
    }

    /// The environment this engine draws from.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Encrypt `plaintext` for the conversation between `my_id` and `peer_id`.
    ///
    /// A fresh 12-byte nonce is drawn for every call, so encrypting the same
    /// text twice yields different output.
    ///
    /// # Errors
    ///
    /// `EntropyError` if no nonce can be drawn. Nothing is produced.
    pub fn encrypt(
        &self,
        plaintext: &str,
        secret: &SharedSecret,
        my_id: &Identity,
        peer_id: &Identity,
    ) -> Result<EncodedMessage, EntropyError> {
        let key = derive_key(secret, my_id.as_str(), peer_id.as_str());
        let nonce: [u8; NONCE_SIZE] = self.env.random_array()?;

        Ok(encrypt_message(plaintext.as_bytes(), &key, nonce).encode())
    }

    /// Decrypt a base64 ciphertext and nonce for the conversation between
    /// `my_id` and `peer_id`.
    ///
    /// Either participant can open a message sealed by the other, since the
    /// key does not depend on argument order.
    pub fn decrypt(
        &self,
        ciphertext_b64: &str,
        nonce_b64: &str,
        secret: &SharedSecret,
        my_id: &Identity,
        peer_id: &Identity,
    ) -> Decryption {
        let encrypted = match EncryptedMessage::decode(ciphertext_b64, nonce_b64) {
            Ok(encrypted) => encrypted,
            Err(err) => {
                tracing::debug!(peer = %peer_id, error = %err, "undecodable message");
                return Decryption::Failed;
            },
        };

        let key = derive_key(secret, my_id.as_str(), peer_id.as_str());
        match decrypt_message(&encrypted, &key) {
            Ok(plaintext) => Decryption::Plaintext(String::from_utf8_lossy(&plaintext).into_owned()),
            Err(err) => {
                tracing::debug!(peer = %peer_id, error = %err, "message failed to open");
                Decryption::Failed
            },
        }
    }

    /// Encrypt `plaintext` from `sender` to `receiver` and wrap it in a new
    /// envelope with a random id and the current wall-clock time.
    ///
    /// # Errors
    ///
    /// `EntropyError` if the nonce or id cannot be drawn.
    pub fn seal(
        &self,
        plaintext: &str,
        secret: &SharedSecret,
        sender: &Identity,
        receiver: &Identity,
    ) -> Result<MessageEnvelope, EntropyError> {
        let encoded = self.encrypt(plaintext, secret, sender, receiver)?;
        let id = uuid::Builder::from_random_bytes(self.env.random_array()?).into_uuid();

        Ok(MessageEnvelope {
            id: id.to_string(),
            sender_id: sender.clone(),
            receiver_id: receiver.clone(),
            ciphertext: encoded.ciphertext,
            nonce: encoded.nonce,
            timestamp: self.env.wall_clock_millis(),
        })
    }

    /// Open an envelope as seen by `my_id` in conversation with `peer_id`.
    pub fn open(
        &self,
        envelope: &MessageEnvelope,
        secret: &SharedSecret,
        my_id: &Identity,
        peer_id: &Identity,
    ) -> Decryption {
        self.decrypt(&envelope.ciphertext, &envelope.nonce, secret, my_id, peer_id)
    }

    /// Open every envelope in order, pairing each result with its message id.
    ///
    /// Results are independent: one failure never affects another entry.
    pub fn open_all<'a>(
        &self,
        envelopes: impl IntoIterator<Item = &'a MessageEnvelope>,
        secret: &SharedSecret,
        my_id: &Identity,
        peer_id: &Identity,
    ) -> Vec<(String, Decryption)> {
        envelopes
            .into_iter()
            .map(|envelope| (envelope.id.clone(), self.open(envelope, secret, my_id, peer_id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::test_utils::{DEFAULT_START_MILLIS, ExhaustedEnv, FixedEnv};

    fn alice() -> Identity {
        Identity::new("a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1")
    }

    fn bob() -> Identity {
        Identity::new("b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2")
    }

    fn carol() -> Identity {
        Identity::new("c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3")
    }

    #[test]
    fn peer_opens_with_roles_swapped() {
        let cipher = MessageCipher::new(FixedEnv::new());
        let secret = SharedSecret::new("apple");

        let sealed = cipher.encrypt("hello", &secret, &alice(), &bob()).unwrap();
        let opened = cipher.decrypt(&sealed.ciphertext, &sealed.nonce, &secret, &bob(), &alice());

        assert_eq!(opened, Decryption::Plaintext("hello".to_string()));
    }

    #[test]
    fn same_plaintext_encrypts_differently() {
        let cipher = MessageCipher::new(FixedEnv::new());
        let secret = SharedSecret::new("apple");

        let first = cipher.encrypt("hello", &secret, &alice(), &bob()).unwrap();
        let second = cipher.encrypt("hello", &secret, &alice(), &bob()).unwrap();

        assert_ne!(first.nonce, second.nonce);
        assert_ne!(first.ciphertext, second.ciphertext);
    }

    #[test]
    fn wrong_passphrase_fails() {
        let cipher = MessageCipher::new(FixedEnv::new());

        let sealed = cipher.encrypt("hello", &SharedSecret::new("apple"), &alice(), &bob()).unwrap();
        let opened = cipher.decrypt(
            &sealed.ciphertext,
            &sealed.nonce,
            &SharedSecret::new("banana"),
            &bob(),
            &alice(),
        );

        assert!(opened.is_failed());
        assert_eq!(opened.display_text(), DECRYPTION_FAILED_MARKER);
    }

    #[test]
    fn third_party_with_right_passphrase_fails() {
        let cipher = MessageCipher::new(FixedEnv::new());
        let secret = SharedSecret::new("apple");

        let sealed = cipher.encrypt("hello", &secret, &alice(), &bob()).unwrap();

        let opened = cipher.decrypt(&sealed.ciphertext, &sealed.nonce, &secret, &carol(), &alice());
        assert!(opened.is_failed());
    }

    #[test]
    fn malformed_base64_fails_without_error() {
        let cipher = MessageCipher::new(FixedEnv::new());
        let secret = SharedSecret::new("apple");

        assert!(cipher.decrypt("!!!", "AAAAAAAAAAAAAAAA", &secret, &alice(), &bob()).is_failed());
        assert!(cipher.decrypt("AAAA", "not-base64", &secret, &alice(), &bob()).is_failed());
        assert!(cipher.decrypt("AAAA", "AAAA", &secret, &alice(), &bob()).is_failed());
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let cipher = MessageCipher::new(FixedEnv::new());
        let secret = SharedSecret::new("apple");

        let sealed = cipher.encrypt("", &secret, &alice(), &bob()).unwrap();
        let opened = cipher.decrypt(&sealed.ciphertext, &sealed.nonce, &secret, &alice(), &bob());

        assert_eq!(opened.plaintext(), Some(""));
    }

    #[test]
    fn empty_passphrase_still_roundtrips() {
        let cipher = MessageCipher::new(FixedEnv::new());
        let secret = SharedSecret::default();

        let sealed = cipher.encrypt("hi", &secret, &alice(), &bob()).unwrap();
        let opened = cipher.decrypt(&sealed.ciphertext, &sealed.nonce, &secret, &bob(), &alice());

        assert_eq!(opened.plaintext(), Some("hi"));
    }

    #[test]
    fn seal_fills_envelope_from_environment() {
        let env = FixedEnv::new();
        let cipher = MessageCipher::new(env.clone());
        let secret = SharedSecret::new("apple");

        let envelope = cipher.seal("hello", &secret, &alice(), &bob()).unwrap();

        assert_eq!(envelope.sender_id, alice());
        assert_eq!(envelope.receiver_id, bob());
        assert_eq!(envelope.timestamp, DEFAULT_START_MILLIS);
        // nonce draw then id draw
        assert_eq!(env.draws(), 2);
        assert_eq!(envelope.nonce, "AAAAAAAAAAAAAAAB");
        assert_eq!(envelope.id, "00000000-0000-4000-8000-000000000002");
        assert_eq!(envelope.short_id(), "00000000");
        assert_eq!(cipher.open(&envelope, &secret, &bob(), &alice()).plaintext(), Some("hello"));
    }

    #[test]
    fn seal_fails_without_entropy() {
        let cipher = MessageCipher::new(ExhaustedEnv);

        let result = cipher.seal("hello", &SharedSecret::new("apple"), &alice(), &bob());

        assert!(result.is_err());
    }

    #[test]
    fn open_all_preserves_order_and_isolates_failures() {
        let cipher = MessageCipher::new(FixedEnv::new());
        let secret = SharedSecret::new("apple");

        let first = cipher.seal("one", &secret, &alice(), &bob()).unwrap();
        let mut broken = cipher.seal("two", &secret, &bob(), &alice()).unwrap();
        broken.ciphertext = "AAAA".to_string();
        let third = cipher.seal("three", &secret, &alice(), &bob()).unwrap();

        let results = cipher.open_all([&first, &broken, &third], &secret, &alice(), &bob());

        assert_eq!(
            results,
            vec![
                (first.id.clone(), Decryption::Plaintext("one".to_string())),
                (broken.id.clone(), Decryption::Failed),
                (third.id.clone(), Decryption::Plaintext("three".to_string())),
            ]
        );
    }
}
