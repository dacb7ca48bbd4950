//! Opaque record identifier.

use serde::{Deserialize, Deserializer, Serialize};
use validator::ValidationError;

/// Identifier of a stored record.
///
/// The remote store assigns ids (strings or integers on the wire), the local
/// store generates UUID strings. Either way the value is opaque and never
/// changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh client-side id.
    pub fn generate() -> Self {
        Self(shared::id::generate_record_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => RecordId(s),
            RawId::Signed(n) => RecordId(n.to_string()),
            RawId::Unsigned(n) => RecordId(n.to_string()),
        })
    }
}

/// Validates that a record reference (class or student selection) is present.
pub fn validate_record_ref(id: &RecordId) -> Result<(), ValidationError> {
    shared::validation::validate_reference(id.as_str())
}
