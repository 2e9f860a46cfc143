//! Key derivation for conversation keys using PBKDF2

use std::fmt;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::secret::SharedSecret;

/// Protocol version label that starts every salt
pub const SALT_PREFIX: &str = "CipherNet-v1";

/// Separator between the prefix and each participant identity
pub const PARTICIPANT_DELIMITER: char = ':';

/// PBKDF2 round count. Part of the protocol: changing it changes every key.
pub const PBKDF2_ITERATIONS: u32 = 150_000;

/// Derived key size (AES-256)
pub const KEY_SIZE: usize = 32;

/// Symmetric key shared by exactly one participant pair.
///
/// Only usable through [`crate::encrypt_message`] and
/// [`crate::decrypt_message`]. There is no accessor for the raw bytes outside
/// this crate, and the bytes are zeroized on drop.
pub struct DerivedKey {
    key: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// 32-byte AES-256-GCM key.
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for DerivedKey {}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Build the canonical salt for a participant pair.
///
/// Layout: `CipherNet-v1:<lower id>:<higher id>`, ids ordered
/// lexicographically. The order of the arguments does not matter.
pub fn participant_salt(id_a: &str, id_b: &str) -> Vec<u8> {
    let (first, second) = if id_a <= id_b { (id_a, id_b) } else { (id_b, id_a) };

    let mut salt = String::with_capacity(SALT_PREFIX.len() + first.len() + second.len() + 2);
    salt.push_str(SALT_PREFIX);
    salt.push(PARTICIPANT_DELIMITER);
    salt.push_str(first);
    salt.push(PARTICIPANT_DELIMITER);
    salt.push_str(second);
    salt.into_bytes()
}

/// Derive the conversation key for `(secret, id_a, id_b)`.
///
/// # Security
///
/// - Commutative in the pair: `derive_key(s, a, b) == derive_key(s, b, a)`
/// - Deterministic: no randomness, no state, no handshake
/// - Bound to the pair: the same secret with another peer gives another key
/// - An empty secret still yields a well-defined (weak) key
pub fn derive_key(secret: &SharedSecret, id_a: &str, id_b: &str) -> DerivedKey {
    let salt = participant_salt(id_a, id_b);

    let mut derived = DerivedKey { key: [0u8; KEY_SIZE] };
    pbkdf2_sha256(secret.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut derived.key);
    derived
}

fn pbkdf2_sha256(password: &[u8], salt: &[u8], rounds: u32, out: &mut [u8; KEY_SIZE]) {
    pbkdf2_hmac::<Sha256>(password, salt, rounds, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaa1111";
    const BOB: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbb2222";
    const CAROL: &str = "cccccccccccccccccccccccccccc3333";

    #[test]
    fn salt_sorts_participants() {
        let expected = format!("CipherNet-v1:{ALICE}:{BOB}").into_bytes();

        assert_eq!(participant_salt(ALICE, BOB), expected);
        assert_eq!(participant_salt(BOB, ALICE), expected);
    }

    #[test]
    fn salt_with_identical_participants() {
        assert_eq!(participant_salt("abc", "abc"), b"CipherNet-v1:abc:abc".to_vec());
    }

    #[test]
    fn salt_distinguishes_pairs() {
        assert_ne!(participant_salt(ALICE, BOB), participant_salt(ALICE, CAROL));
    }

    #[test]
    fn pbkdf2_matches_known_vectors() {
        // PBKDF2-HMAC-SHA256, P = "password", S = "salt", dkLen = 32
        let mut out = [0u8; KEY_SIZE];

        pbkdf2_sha256(b"password", b"salt", 1, &mut out);
        assert_eq!(
            hex::encode(out),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );

        pbkdf2_sha256(b"password", b"salt", 2, &mut out);
        assert_eq!(
            hex::encode(out),
            "ae4d0c95af6b46d32d0adff928f06dd02a303f8ef3c251dfd6e2d85a95474c43"
        );
    }

    #[test]
    fn derive_is_deterministic() {
        let secret = SharedSecret::new("correct horse");

        let key1 = derive_key(&secret, ALICE, BOB);
        let key2 = derive_key(&secret, ALICE, BOB);

        assert_eq!(key1, key2, "same inputs must produce same key");
    }

    #[test]
    fn derive_is_commutative() {
        let secret = SharedSecret::new("correct horse");

        assert_eq!(derive_key(&secret, ALICE, BOB), derive_key(&secret, BOB, ALICE));
    }

    #[test]
    fn different_secrets_produce_different_keys() {
        let key_a = derive_key(&SharedSecret::new("correct horse"), ALICE, BOB);
        let key_b = derive_key(&SharedSecret::new("wrong secret"), ALICE, BOB);

        assert_ne!(key_a, key_b, "different secrets must produce different keys");
    }

    #[test]
    fn different_pairs_produce_different_keys() {
        let secret = SharedSecret::new("correct horse");

        assert_ne!(derive_key(&secret, ALICE, BOB), derive_key(&secret, ALICE, CAROL));
    }

    #[test]
    fn works_with_empty_secret() {
        // Edge case: empty passphrase is weak but well-defined
        let key1 = derive_key(&SharedSecret::new(""), ALICE, BOB);
        let key2 = derive_key(&SharedSecret::new(""), BOB, ALICE);

        assert_eq!(key1, key2);
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = derive_key(&SharedSecret::new("s"), ALICE, BOB);

        assert_eq!(format!("{key:?}"), "DerivedKey([REDACTED])");
    }
}
