//! Observable application state types.
//!
//! View-model structures the front end renders: status notices and the
//! entries of the active conversation. They carry display text only, never
//! key material.

use ciphernet_core::DECRYPTION_FAILED_MARKER;

/// Severity of a status notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Informational
    Info,
    /// The last request was rejected or failed
    Error,
}

/// Transient status shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub kind: NoticeKind,
    /// Display text
    pub text: String,
}

impl Notice {
    /// Informational notice.
    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, text: text.into() }
    }

    /// Error notice.
    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, text: text.into() }
    }

    /// True for error notices.
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Which side of the conversation wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Sent by the local user
    Outgoing,
    /// Sent by the peer
    Incoming,
}

/// What a conversation entry displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryBody {
    /// Decrypted text
    Plaintext(String),
    /// Could not be opened with the current passphrase
    Failed,
    /// No passphrase set; leading ciphertext only
    Locked {
        /// Truncated base64 ciphertext
        preview: String,
    },
    /// Passphrase set, decrypt pass not finished
    Pending,
}

impl EntryBody {
    /// Display text for the body.
    pub fn text(&self) -> &str {
        match self {
            Self::Plaintext(text) => text,
            Self::Failed => DECRYPTION_FAILED_MARKER,
            Self::Locked { preview } => preview,
            Self::Pending => "Decrypting...",
        }
    }
}

/// One rendered message of the active conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    /// Full message id
    pub id: String,
    /// First group of the id
    pub short_id: String,
    /// Author side
    pub direction: Direction,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    /// Display body
    pub body: EntryBody,
}
