//! Rendering: hydrate courses with teachers, group them by category, and emit HTML.
//!
//! Everything here is pure. Markup lives in `format`, the standalone document
//! wrapper and its stylesheet in `page`.

use crate::domain::{CategorySpec, Course, RenderGroup, RenderMode, ResolvedCourse, TeacherIndex};

pub mod format;
pub mod page;

/// Attach resolved teachers to each course, in the course's own reference order.
///
/// Ids missing from the index are omitted.
pub fn hydrate(courses: &[Course], index: &TeacherIndex) -> Vec<ResolvedCourse> {
    courses
        .iter()
        .map(|course| ResolvedCourse {
            teachers: course
                .teacher_ids
                .iter()
                .filter_map(|id| index.get(id).cloned())
                .collect(),
            course: course.clone(),
        })
        .collect()
}

/// One group per category, holding every course flagged for it in listing order.
///
/// Courses with several flags appear in several groups; courses with none appear nowhere.
pub fn group_by_category(courses: &[ResolvedCourse], categories: &[CategorySpec]) -> Vec<RenderGroup> {
    categories
        .iter()
        .map(|category| RenderGroup {
            title: category.title.clone(),
            key: category.key.clone(),
            items: courses
                .iter()
                .filter(|c| c.course.in_category(&category.key))
                .cloned()
                .collect(),
        })
        .collect()
}

/// Renders groups to HTML with deploy-time settings baked in.
#[derive(Debug, Clone)]
pub struct Renderer {
    link_prefix: String,
}

impl Renderer {
    pub fn new(link_prefix: impl Into<String>) -> Self {
        Self {
            link_prefix: link_prefix.into(),
        }
    }

    pub fn render(&self, groups: &[RenderGroup], mode: RenderMode) -> String {
        let fragment = format::render_fragment(groups, &self.link_prefix);
        match mode {
            RenderMode::Fragment => fragment,
            RenderMode::Standalone => page::wrap_document(&fragment),
        }
    }
}
