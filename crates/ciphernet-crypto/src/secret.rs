//! Transient holder for the shared passphrase.

use std::fmt;

use zeroize::Zeroizing;

/// Passphrase agreed between two peers out of band.
///
/// Lives only for the duration of a conversation view. Deliberately has no
/// `Display` and no serde support so it cannot be logged or persisted by
/// accident. The backing buffer is zeroized on drop.
#[derive(Clone, Default)]
pub struct SharedSecret(Zeroizing<String>);

impl SharedSecret {
    /// Wrap a passphrase.
    ///
    /// Any string is accepted, including the empty string. Strength is the
    /// caller's responsibility.
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self(Zeroizing::new(passphrase.into()))
    }

    /// True if no passphrase has been entered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<&str> for SharedSecret {
    fn from(passphrase: &str) -> Self {
        Self::new(passphrase)
    }
}

impl From<String> for SharedSecret {
    fn from(passphrase: String) -> Self {
        Self::new(passphrase)
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_str() == other.0.as_str()
    }
}

impl Eq for SharedSecret {}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let secret = SharedSecret::new("correct horse");
        let rendered = format!("{secret:?}");

        assert!(!rendered.contains("correct"));
        assert_eq!(rendered, "SharedSecret([REDACTED])");
    }

    #[test]
    fn empty_passphrase_is_allowed() {
        assert!(SharedSecret::new("").is_empty());
        assert!(SharedSecret::default().is_empty());
        assert!(!SharedSecret::from("x").is_empty());
    }
}
