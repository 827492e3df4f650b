//! HolderId - identity of a ledger participant
//!
//! Holders are opaque identities (account addresses, DIDs, user ids). The ledger
//! never interprets them beyond equality and ordering.

use serde::{Deserialize, Serialize};

/// Identity of anyone that holds, or has held, a credit balance
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolderId(String);

impl HolderId {
    /// Create a holder id from any string-like identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HolderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for HolderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for HolderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holder_id_equality() {
        let a = HolderId::new("alice");
        let b: HolderId = "alice".into();
        assert_eq!(a, b);
        assert_ne!(a, HolderId::new("bob"));
    }

    #[test]
    fn test_holder_id_serializes_as_string() {
        let id = HolderId::new("did:key:z6Mk");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"did:key:z6Mk\"");
        assert_eq!(serde_json::from_str::<HolderId>(&json).unwrap(), id);
    }
}
