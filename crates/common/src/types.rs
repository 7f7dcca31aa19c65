use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an aggregate stream.
///
/// Aggregate ids are opaque strings chosen by whoever creates the aggregate.
/// Wrapping them keeps them from being mixed up with event payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(String);

impl AggregateId {
    /// Creates an aggregate ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AggregateId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AggregateId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for AggregateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Mints identifiers for new aggregates.
///
/// Used by the outer layers when creating an aggregate; the event store
/// itself never generates aggregate ids.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> AggregateId;
}

/// Generates ids of the form `game-<8 hex chars>` from random UUIDs.
#[derive(Debug, Clone, Default)]
pub struct UuidGenerator {
    prefix: Option<String>,
}

impl UuidGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `prefix` instead of the default `game`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> AggregateId {
        let simple = Uuid::new_v4().simple().to_string();
        let prefix = self.prefix.as_deref().unwrap_or("game");
        AggregateId(format!("{prefix}-{}", &simple[..8]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_creates_unique_ids() {
        let generator = UuidGenerator::new();
        let id1 = generator.generate();
        let id2 = generator.generate();
        assert_ne!(id1, id2);
        assert!(id1.as_str().starts_with("game-"));
        assert_eq!(id1.as_str().len(), "game-".len() + 8);
    }

    #[test]
    fn generator_honours_prefix() {
        let id = UuidGenerator::with_prefix("match").generate();
        assert!(id.as_str().starts_with("match-"));
    }

    #[test]
    fn aggregate_id_displays_inner_string() {
        let id = AggregateId::new("brave-otter");
        assert_eq!(id.to_string(), "brave-otter");
        assert_eq!(AggregateId::from("brave-otter"), id);
    }

    #[test]
    fn aggregate_id_serializes_as_plain_string() {
        let id = AggregateId::new("brave-otter");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"brave-otter\"");
        let deserialized: AggregateId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
