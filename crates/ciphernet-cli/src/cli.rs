//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CipherNet messaging client
#[derive(Parser, Debug)]
#[command(name = "ciphernet")]
#[command(about = "Passphrase-secured peer-to-peer messaging")]
#[command(version)]
pub struct Args {
    /// Session database file
    #[arg(long, env = "CIPHERNET_DATA", default_value = "ciphernet.redb", global = true)]
    pub data: PathBuf,

    /// Shared passphrase for the conversation
    #[arg(long, env = "CIPHERNET_SECRET", hide_env_values = true, global = true)]
    pub secret: Option<String>,

    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a new identity
    Register {
        /// Display name
        username: String,
    },
    /// Sign in with an existing identity
    Restore {
        /// Display name
        username: String,
        /// Identity to use instead of the remembered one
        #[arg(long)]
        id: Option<String>,
    },
    /// Show the signed-in identity
    Whoami,
    /// Sign out
    Logout {
        /// Also delete the account, contacts and every message
        #[arg(long)]
        wipe: bool,
    },
    /// Manage contacts
    #[command(subcommand)]
    Contacts(ContactsCommand),
    /// Encrypt and store a message
    Send {
        /// Contact name or identity
        #[arg(long)]
        peer: String,
        /// Message text
        #[arg(long)]
        message: String,
    },
    /// Show the conversation with a contact
    Read {
        /// Contact name or identity
        #[arg(long)]
        peer: String,
    },
    /// Write the conversation with a contact as JSON lines
    Export {
        /// Contact name or identity
        #[arg(long)]
        peer: String,
        /// File to write instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Merge messages from a JSON lines file
    Import {
        /// File produced by `export`
        file: PathBuf,
    },
    /// Show a security tip
    Tip,
}

/// Contact subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ContactsCommand {
    /// Add a contact
    Add {
        /// Display name
        name: String,
        /// Their identity
        id: String,
    },
    /// List contacts
    List,
}
