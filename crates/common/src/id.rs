use serde::{Deserialize, Serialize};

/// Identifier of a catalog entity (product or package).
///
/// The server hands these out as opaque strings; the client never parses
/// them, it only compares them for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an item ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the item ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ItemId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_string_conversion() {
        let id = ItemId::new("64f1c0a2");
        assert_eq!(id.as_str(), "64f1c0a2");

        let id2: ItemId = "64f1c0a3".into();
        assert_eq!(id2.to_string(), "64f1c0a3");
        assert!(id2 == *"64f1c0a3");
    }

    #[test]
    fn item_id_serializes_as_plain_string() {
        let id = ItemId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");

        let back: ItemId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back, id);
    }
}
