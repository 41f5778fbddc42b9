//! Credentials with redacted `Debug`/`Display` output.

use std::fmt;

use zeroize::Zeroize;

/// A secret string (API key, auth token) that never shows up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    inner: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// Build from optional configuration input, treating blank values as absent.
    pub fn from_optional(value: Option<String>) -> Option<Self> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Self::new)
    }

    /// The raw value. Only call this when putting it on the wire.
    #[inline]
    pub fn expose(&self) -> &str {
        &self.inner
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let key = SecretString::new("sk-live-123");
        assert_eq!(format!("{:?}", key), "SecretString([REDACTED])");
        assert_eq!(key.to_string(), "[REDACTED]");
        assert_eq!(key.expose(), "sk-live-123");
    }

    #[test]
    fn test_from_optional_drops_blank() {
        assert!(SecretString::from_optional(None).is_none());
        assert!(SecretString::from_optional(Some("   ".into())).is_none());
        assert_eq!(
            SecretString::from_optional(Some(" sk-1 ".into())).unwrap().expose(),
            "sk-1"
        );
    }
}
