//! Client-side identifier generation.

use uuid::Uuid;

/// Generates a fresh opaque record identifier.
///
/// Used wherever the store does not assign ids itself (the local store).
pub fn generate_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Returns true if the value looks like an id produced by [`generate_record_id`].
pub fn is_generated_id(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}
