//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` stands in for the terminal front end in tests. It implements
//! [`Driver`] so the same [`ciphernet_app::Runtime`] orchestration code runs
//! in both production and simulation, and checks invariants on every render.

use ciphernet_app::{App, Driver, Notice};

use crate::invariants::{ClientSnapshot, InvariantRegistry, SystemSnapshot, Violation};

/// Invariant violations found while rendering.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub Vec<Violation>);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<_> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "SimDriverError: {}", messages.join("; "))
    }
}

impl std::error::Error for SimDriverError {}

/// Simulation driver for deterministic testing.
pub struct SimDriver {
    label: String,
    invariants: Option<InvariantRegistry>,
    renders: usize,
    last_notice: Option<Notice>,
    generation_history: Vec<u64>,
}

impl SimDriver {
    /// Create a driver; `label` names the client in violation messages.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            invariants: None,
            renders: 0,
            last_notice: None,
            generation_history: Vec::new(),
        }
    }

    /// Enable invariant checking.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Number of renders so far.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Notice shown at the last render.
    pub fn last_notice(&self) -> Option<&Notice> {
        self.last_notice.as_ref()
    }

    /// Generation observed at each render, oldest first.
    pub fn generation_history(&self) -> &[u64] {
        &self.generation_history
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.renders += 1;
        self.last_notice = app.notice().cloned();

        let client = ClientSnapshot::from_app(self.label.as_str(), app)
            .with_history(&self.generation_history);
        self.generation_history.push(app.generation());

        match &self.invariants {
            Some(registry) => {
                registry.check_all(&SystemSnapshot::single(client)).map_err(SimDriverError)
            },
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use ciphernet_app::AppEvent;
    use ciphernet_core::Identity;

    use super::*;

    #[test]
    fn render_records_notice_and_generation() {
        let mut driver = SimDriver::new("alice").with_invariants(InvariantRegistry::standard());
        let mut app = App::new();
        let _ = app.register("   ");

        driver.render(&app).unwrap();

        assert_eq!(driver.render_count(), 1);
        assert!(driver.last_notice().is_some_and(Notice::is_error));
        assert_eq!(driver.generation_history(), &[0]);
    }

    #[test]
    fn generations_accumulate_across_renders() {
        let mut driver = SimDriver::new("alice").with_invariants(InvariantRegistry::standard());
        let mut app = App::new();

        driver.render(&app).unwrap();
        let _ = app.handle(AppEvent::IdentityGenerated {
            username: "alice".to_string(),
            id: Identity::new("a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1"),
        });
        driver.render(&app).unwrap();

        let history = driver.generation_history();
        assert_eq!(history.len(), 2);
        assert!(history[1] > history[0]);
    }
}
