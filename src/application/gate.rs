//! The admin gate: one shared key unlocks post creation.

use std::{fmt, sync::Arc};

use subtle::ConstantTimeEq;

/// Name of the cookie the `/create` page reads the key from.
pub const ADMIN_KEY_COOKIE: &str = "admin_key";

#[derive(Clone, Default)]
pub struct AdminGate {
    key: Option<Arc<str>>,
}

impl AdminGate {
    /// A gate for `key`; `None` locks creation entirely.
    pub fn new(key: Option<String>) -> Self {
        Self {
            key: key.map(Arc::from),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Compare a presented key with the configured one in constant time.
    pub fn verify(&self, candidate: &str) -> bool {
        match self.key.as_deref() {
            Some(expected) => bool::from(expected.as_bytes().ct_eq(candidate.as_bytes())),
            None => false,
        }
    }
}

impl fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminGate")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_the_exact_key() {
        let gate = AdminGate::new(Some("hunter2".into()));

        assert!(gate.verify("hunter2"));
        assert!(!gate.verify("hunter"));
        assert!(!gate.verify("hunter22"));
        assert!(!gate.verify(""));
    }

    #[test]
    fn disabled_gate_rejects_everything() {
        let gate = AdminGate::new(None);

        assert!(!gate.is_enabled());
        assert!(!gate.verify(""));
        assert!(!gate.verify("anything"));
    }

    #[test]
    fn debug_output_never_shows_the_key() {
        let gate = AdminGate::new(Some("hunter2".into()));
        assert!(!format!("{gate:?}").contains("hunter2"));
    }
}
