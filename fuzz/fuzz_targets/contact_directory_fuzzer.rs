//! Fuzz target for contact admission
//!
//! # Strategy
//!
//! - Arbitrary names and identities, including whitespace padding and
//!   multi-byte characters
//! - Re-adding earlier identities with different padding
//!
//! # Invariants
//!
//! - Admission NEVER panics
//! - Stored identities are trimmed and at least the minimum length
//! - Identities are unique; a rejected add changes nothing

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use ciphernet_core::{ContactDirectory, MIN_PEER_IDENTITY_LEN};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum ContactOp {
    Add { name: String, id: String },
    Readd { index: u8, name: String, lead: u8, trail: u8 },
}

fuzz_target!(|ops: Vec<ContactOp>| {
    let mut contacts = ContactDirectory::new();

    for op in ops {
        let before = contacts.clone();
        let result = match op {
            ContactOp::Add { name, id } => contacts.add(&name, &id).map(|_| ()),
            ContactOp::Readd { index, name, lead, trail } => {
                let Some(existing) = contacts.iter().nth(index as usize % contacts.len().max(1))
                else {
                    continue;
                };
                let padded = format!(
                    "{}{}{}",
                    " ".repeat(lead as usize % 4),
                    existing.id,
                    "\t".repeat(trail as usize % 4)
                );
                let result = contacts.add(&name, &padded).map(|_| ());
                assert!(result.as_ref().is_err_and(|e| e.is_duplicate() || name.trim().is_empty()));
                result
            },
        };

        if result.is_err() {
            assert_eq!(contacts, before, "rejected add changed the directory");
        }

        let mut seen = HashSet::new();
        for contact in contacts.iter() {
            let id = contact.id.as_str();
            assert_eq!(id, id.trim());
            assert!(id.chars().count() >= MIN_PEER_IDENTITY_LEN);
            assert!(seen.insert(id.to_string()), "duplicate identity admitted");
        }
    }
});
