//! Collection fetcher: one paginated read, mapped to `Course` projections.

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::MAX_PAGE_SIZE;
use crate::data::cms::CmsApi;
use crate::data::record::{
    flag_field, id_list, image_field, is_hidden, record_fields, record_id, text_field,
};
use crate::domain::{Course, FieldMap};
use crate::error::AppError;

/// Read one page of a collection and return its published courses in listing order.
pub fn fetch_courses(
    api: &dyn CmsApi,
    collection_id: &str,
    page_size: usize,
    offset: usize,
    fields: &FieldMap,
) -> Result<Vec<Course>, AppError> {
    if collection_id.trim().is_empty() {
        return Err(AppError::config("Collection id must not be empty."));
    }
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(AppError::config(format!(
            "Page size must be between 1 and {MAX_PAGE_SIZE} (got {page_size})."
        )));
    }

    let page = api.list_items(collection_id, page_size, offset)?;
    let total = page.items.len();

    let mut courses = Vec::with_capacity(total);
    for raw in &page.items {
        if !is_published(raw, fields) {
            continue;
        }
        match map_course(raw, fields) {
            Some(course) => courses.push(course),
            None => warn!(collection = collection_id, "Skipping record without an id"),
        }
    }

    debug!(
        collection = collection_id,
        total,
        published = courses.len(),
        "Fetched course page"
    );
    Ok(courses)
}

/// Records are unpublished when drafted, archived, or their publish flag is false.
pub fn is_published(raw: &Value, fields: &FieldMap) -> bool {
    if is_hidden(raw) {
        return false;
    }
    match (&fields.publish, record_fields(raw)) {
        (Some(key), Some(map)) => flag_field(map, key) != Some(false),
        _ => true,
    }
}

/// Map a raw record to a `Course`. Returns `None` for non-objects and records without an id.
pub fn map_course(raw: &Value, fields: &FieldMap) -> Option<Course> {
    let id = record_id(raw)?;
    let map = record_fields(raw)?;

    let categories = fields
        .categories
        .iter()
        .map(|key| (key.clone(), flag_field(map, key).unwrap_or(false)))
        .collect();

    Some(Course {
        id,
        name: text_field(map, &fields.name).unwrap_or_default(),
        slug: text_field(map, &fields.slug).unwrap_or_default(),
        image_url: image_field(map, &fields.image),
        teacher_ids: id_list(map, &fields.teachers),
        categories,
    })
}
