//! Fuzz target for envelope and stored-record decoding
//!
//! # Strategy
//!
//! - Raw bytes parsed as a single exchanged envelope
//! - Raw bytes parsed as a stored conversation log and contact directory
//!
//! # Invariants
//!
//! - Decoding NEVER panics on malformed JSON
//! - Every decoded envelope re-encodes and decodes to itself
//! - Display helpers (short id, ciphertext preview) never panic, even on
//!   multi-byte characters
//! - A decoded contact directory never holds duplicate identities

#![no_main]

use std::collections::HashSet;

use ciphernet_core::{CIPHERTEXT_PREVIEW_CHARS, ContactDirectory, ConversationLog, MessageEnvelope};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    if let Ok(envelope) = MessageEnvelope::from_json(&text) {
        let line = envelope.to_json().expect("decoded envelope encodes");
        let again = MessageEnvelope::from_json(&line).expect("encoded envelope decodes");
        assert_eq!(again, envelope);

        assert!(envelope.id.starts_with(envelope.short_id()));
        assert!(envelope.ciphertext_preview().chars().count() <= CIPHERTEXT_PREVIEW_CHARS);
        assert!(envelope.ciphertext.starts_with(envelope.ciphertext_preview()));
    }

    if let Ok(log) = serde_json::from_str::<ConversationLog>(&text) {
        for envelope in log.iter() {
            let _ = envelope.short_id();
            let _ = envelope.ciphertext_preview();
        }
    }

    if let Ok(contacts) = serde_json::from_str::<ContactDirectory>(&text) {
        let mut seen = HashSet::new();
        for contact in contacts.iter() {
            assert!(seen.insert(contact.id.clone()), "duplicate identity after load");
        }
    }
});
