//! Shared domain types.
//!
//! Everything here is request-scoped: built fresh for each invocation, never
//! cached across requests, and cheap to clone into render groups.

use std::collections::{BTreeMap, HashMap};

/// Normalized course projection of one upstream record.
///
/// `name` and `slug` are always present (empty when the record lacks them) so
/// rendering never has to deal with missing text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub image_url: Option<String>,
    /// Referenced teacher ids in record order, without duplicates.
    pub teacher_ids: Vec<String>,
    /// One entry per configured category key.
    pub categories: BTreeMap<String, bool>,
}

impl Course {
    pub fn in_category(&self, key: &str) -> bool {
        self.categories.get(key).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub portrait_url: Option<String>,
}

/// Teacher lookup built once per request.
///
/// Ids that failed to resolve are absent, not null-valued.
pub type TeacherIndex = HashMap<String, Teacher>;

/// A course with its teacher references replaced by resolved records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCourse {
    pub course: Course,
    pub teachers: Vec<Teacher>,
}

/// One titled section of the rendered catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderGroup {
    pub title: String,
    pub key: String,
    pub items: Vec<ResolvedCourse>,
}

/// A `(title, category key)` pair; the ordered list of these defines the groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    pub title: String,
    pub key: String,
}

impl CategorySpec {
    pub fn new(title: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Bare section markup for injection into a host page.
    #[default]
    Fragment,
    /// Full HTML document with embedded styling.
    Standalone,
}

/// Field keys used to read course records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    pub name: String,
    pub slug: String,
    pub image: String,
    pub teachers: String,
    pub publish: Option<String>,
    pub categories: Vec<String>,
}

/// Field keys used to read teacher records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherFieldMap {
    pub name: String,
    pub portrait: String,
}

impl Default for TeacherFieldMap {
    fn default() -> Self {
        Self {
            name: "name".to_string(),
            portrait: "portrait".to_string(),
        }
    }
}
