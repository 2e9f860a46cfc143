//! Command errors.

use ciphernet_app::RuntimeError;
use ciphernet_store::StorageError;
use thiserror::Error;

/// Errors that end a command with a non-zero exit status.
#[derive(Error, Debug)]
pub enum CliError {
    /// Side effect failed.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// The data file could not be opened.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Reading an import file or writing output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The client refused the request; the text is the notice it showed.
    #[error("{0}")]
    Rejected(String),

    /// No contact matches the given name or identity.
    #[error("no contact matches {query:?}")]
    UnknownContact {
        /// Name or identity as typed
        query: String,
    },

    /// A command needing the passphrase ran without one.
    #[error("a shared passphrase is required (--secret or CIPHERNET_SECRET)")]
    MissingSecret,

    /// The command needs a signed-in account.
    #[error("not signed in; run `register` or `restore` first")]
    NotSignedIn,

    /// An envelope could not be encoded for export.
    #[error("could not encode envelope: {0}")]
    Encode(#[from] serde_json::Error),

    /// An import file line is not an envelope.
    #[error("line {line}: not a message envelope: {source}")]
    Envelope {
        /// One-based line number
        line: usize,
        /// Parse failure
        source: serde_json::Error,
    },
}
