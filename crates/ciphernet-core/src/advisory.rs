//! Security advisory text.
//!
//! A short tip shown alongside the conversation. The source is pluggable and
//! never security relevant: any failure or empty answer is replaced with a
//! fixed fallback, so callers always have something to display.

use std::future::Future;

use crate::error::AdvisoryError;

/// Topic requested when the application starts
pub const DEFAULT_TOPIC: &str = "end-to-end encryption and metadata privacy";

/// Shown before any tip has been fetched
pub const PLACEHOLDER_TIP: &str = "Initializing secure protocols...";

/// Substituted when the service fails
pub const FALLBACK_TIP: &str = "Always verify identities through a secondary out-of-band channel.";

/// Substituted when the service answers with nothing
pub const EMPTY_RESPONSE_TIP: &str =
    "Keep your shared keys offline and never reuse them across different contacts.";

/// Source of advisory text.
pub trait Advisor: Send + Sync {
    /// Fetch a short tip about `topic`.
    fn security_tip(&self, topic: &str)
    -> impl Future<Output = Result<String, AdvisoryError>> + Send;
}

/// Fetch a tip, substituting the fallbacks on failure or blank output.
///
/// Answers are trimmed, and an answer of only whitespace counts as empty and
/// yields [`EMPTY_RESPONSE_TIP`]. Services that pad their output would
/// otherwise show a blank tip.
pub async fn tip_or_default<A: Advisor>(advisor: &A, topic: &str) -> String {
    match advisor.security_tip(topic).await {
        Ok(tip) if !tip.trim().is_empty() => tip.trim().to_string(),
        Ok(_) => EMPTY_RESPONSE_TIP.to_string(),
        Err(err) => {
            tracing::debug!(error = %err, "advisory unavailable, using fallback tip");
            FALLBACK_TIP.to_string()
        },
    }
}

/// Advisor used when no service is configured. Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineAdvisor;

impl Advisor for OfflineAdvisor {
    async fn security_tip(&self, _topic: &str) -> Result<String, AdvisoryError> {
        Err(AdvisoryError::NotConfigured)
    }
}

/// Advisor that answers every topic with the same text.
#[derive(Debug, Clone, Default)]
pub struct StaticAdvisor {
    tip: String,
}

impl StaticAdvisor {
    /// Always answer with `tip`.
    pub fn new(tip: impl Into<String>) -> Self {
        Self { tip: tip.into() }
    }
}

impl Advisor for StaticAdvisor {
    async fn security_tip(&self, _topic: &str) -> Result<String, AdvisoryError> {
        Ok(self.tip.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingAdvisor;

    impl Advisor for FailingAdvisor {
        async fn security_tip(&self, _topic: &str) -> Result<String, AdvisoryError> {
            Err(AdvisoryError::Unavailable { reason: "503".to_string() })
        }
    }

    #[tokio::test]
    async fn offline_advisor_yields_fallback() {
        assert_eq!(tip_or_default(&OfflineAdvisor, DEFAULT_TOPIC).await, FALLBACK_TIP);
    }

    #[tokio::test]
    async fn service_failure_yields_fallback() {
        assert_eq!(tip_or_default(&FailingAdvisor, DEFAULT_TOPIC).await, FALLBACK_TIP);
    }

    #[tokio::test]
    async fn blank_answer_yields_empty_response_tip() {
        let advisor = StaticAdvisor::new("  \n ");
        assert_eq!(tip_or_default(&advisor, DEFAULT_TOPIC).await, EMPTY_RESPONSE_TIP);
    }

    #[tokio::test]
    async fn answer_is_trimmed() {
        let advisor = StaticAdvisor::new("  Rotate passphrases.\n");
        assert_eq!(tip_or_default(&advisor, DEFAULT_TOPIC).await, "Rotate passphrases.");
    }
}
