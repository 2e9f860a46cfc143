//! Command-line front end for CipherNet.
//!
//! Wires the App runtime to a redb session file, the OS random source and a
//! console driver. Messages move between users as exported JSON lines.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod commands;
pub mod console;
pub mod error;
pub mod system_env;

pub use cli::{Args, Command, ContactsCommand};
pub use commands::execute;
pub use console::ConsoleDriver;
pub use error::CliError;
pub use system_env::SystemEnv;
