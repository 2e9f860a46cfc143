//! The conversation log.
//!
//! A single append-only sequence holding every envelope the local user has
//! sent or imported, across all conversations. Order is insertion order and is
//! the only order the application displays; timestamps are never used to
//! re-sort.

use serde::{Deserialize, Serialize};

use crate::{envelope::MessageEnvelope, error::LogError, identity::Identity};

/// Outcome of merging externally supplied envelopes into the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Envelopes appended
    pub added: usize,
    /// Skipped: id already present
    pub duplicates: usize,
    /// Skipped: local user is neither sender nor receiver
    pub unrelated: usize,
}

/// Append-only ordered collection of message envelopes.
///
/// Loading a stored list keeps the first envelope for each id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<MessageEnvelope>", into = "Vec<MessageEnvelope>")]
pub struct ConversationLog {
    envelopes: Vec<MessageEnvelope>,
}

impl ConversationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an envelope at the end.
    ///
    /// # Errors
    ///
    /// `DuplicateMessageId` if an envelope with the same id is present. The
    /// log is unchanged.
    pub fn append(&mut self, envelope: MessageEnvelope) -> Result<(), LogError> {
        if self.contains(&envelope.id) {
            return Err(LogError::DuplicateMessageId { id: envelope.id });
        }

        self.envelopes.push(envelope);
        Ok(())
    }

    /// Envelopes exchanged between `my_id` and `peer_id`, in log order.
    ///
    /// Includes both directions and nothing else.
    pub fn for_conversation<'a>(
        &'a self,
        my_id: &'a Identity,
        peer_id: &'a Identity,
    ) -> impl Iterator<Item = &'a MessageEnvelope> + 'a {
        self.envelopes.iter().filter(move |envelope| envelope.is_between(my_id, peer_id))
    }

    /// Merge envelopes received out of band.
    ///
    /// Envelopes already present (by id) and envelopes that do not involve
    /// `local` are skipped. Order of the accepted envelopes is preserved.
    pub fn import(
        &mut self,
        envelopes: impl IntoIterator<Item = MessageEnvelope>,
        local: &Identity,
    ) -> ImportReport {
        let mut report = ImportReport::default();

        for envelope in envelopes {
            if !envelope.involves(local) {
                report.unrelated += 1;
                continue;
            }

            match self.append(envelope) {
                Ok(()) => report.added += 1,
                Err(LogError::DuplicateMessageId { id }) => {
                    tracing::trace!(%id, "skipping duplicate envelope");
                    report.duplicates += 1;
                },
            }
        }

        report
    }

    /// True if an envelope with `id` is in the log.
    pub fn contains(&self, id: &str) -> bool {
        self.envelopes.iter().any(|envelope| envelope.id == id)
    }

    /// Envelope by id.
    pub fn get(&self, id: &str) -> Option<&MessageEnvelope> {
        self.envelopes.iter().find(|envelope| envelope.id == id)
    }

    /// All envelopes, in log order.
    pub fn iter(&self) -> impl Iterator<Item = &MessageEnvelope> {
        self.envelopes.iter()
    }

    /// Number of envelopes.
    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    /// True if the log holds nothing.
    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }
}

impl From<Vec<MessageEnvelope>> for ConversationLog {
    fn from(stored: Vec<MessageEnvelope>) -> Self {
        let mut log = Self::new();
        for envelope in stored {
            if let Err(LogError::DuplicateMessageId { id }) = log.append(envelope) {
                tracing::warn!(%id, "dropping duplicate stored envelope");
            }
        }
        log
    }
}

impl From<ConversationLog> for Vec<MessageEnvelope> {
    fn from(log: ConversationLog) -> Self {
        log.envelopes
    }
}
