//! Driver trait for abstracting presentation.
//!
//! The [`Driver`] trait decouples the runtime from how state is shown. The
//! command-line front end prints notices; test drivers record renders and
//! check invariants on every one.

use crate::App;

/// Presents application state.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;
}

/// Driver that renders nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDriver;

impl Driver for NullDriver {
    type Error = std::convert::Infallible;

    fn render(&mut self, _app: &App) -> Result<(), Self::Error> {
        Ok(())
    }
}
