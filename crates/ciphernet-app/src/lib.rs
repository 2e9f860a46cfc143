//! Application layer for CipherNet
//!
//! Pure state machine and generic runtime for the messaging client, so the
//! same orchestration code runs in the command-line front end and in
//! deterministic tests.
//!
//! # Components
//!
//! - [`App`]: client state machine (account, contacts, conversation view,
//!   passphrase, decrypt generations)
//! - [`Driver`]: presentation abstraction
//! - [`Runtime`]: executes App actions against storage, the message cipher
//!   and the advisory source

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod driver;
mod error;
mod event;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::{App, MISSING_IDENTITY};
pub use driver::{Driver, NullDriver};
pub use error::RuntimeError;
pub use event::AppEvent;
pub use runtime::Runtime;
pub use state::{ConversationEntry, Direction, EntryBody, Notice, NoticeKind};
