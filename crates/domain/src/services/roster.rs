//! Student roster rendering.
//!
//! Deleting a class leaves its students in place with a dangling `class_id`.
//! Rendering resolves those to [`NO_CLASS_LABEL`] instead of failing.

use std::collections::HashMap;

use crate::models::{ClassRoom, RecordId, Student, StudentListing};

/// Label shown for students whose class no longer exists.
pub const NO_CLASS_LABEL: &str = "no class";

/// Resolves a class id to its display name, falling back to [`NO_CLASS_LABEL`].
pub fn class_label<'a>(classes: &'a [ClassRoom], class_id: &RecordId) -> &'a str {
    classes
        .iter()
        .find(|c| &c.id == class_id)
        .map(|c| c.name.as_str())
        .unwrap_or(NO_CLASS_LABEL)
}

/// Students belonging to the given class, in collection order.
pub fn students_in_class<'a>(students: &'a [Student], class_id: &RecordId) -> Vec<&'a Student> {
    students.iter().filter(|s| &s.class_id == class_id).collect()
}

/// Builds the student list with class names resolved.
pub fn list_students(students: &[Student], classes: &[ClassRoom]) -> Vec<StudentListing> {
    let names: HashMap<&RecordId, &str> = classes
        .iter()
        .map(|c| (&c.id, c.name.as_str()))
        .collect();

    students
        .iter()
        .map(|s| {
            let class_name = names.get(&s.class_id).copied();
            StudentListing {
                id: s.id.clone(),
                name: s.name.clone(),
                class_id: s.class_id.clone(),
                class_name: class_name.unwrap_or(NO_CLASS_LABEL).to_string(),
                class_missing: class_name.is_none(),
            }
        })
        .collect()
}
