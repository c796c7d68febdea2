//! Reference resolver: turn the teacher ids referenced by a batch of courses
//! into a `TeacherIndex`.
//!
//! Resolution runs on a small dedicated rayon pool. Workers pull the next
//! unclaimed id from a shared atomic cursor until it runs past the end, so at
//! most `concurrency` upstream reads are in flight at once no matter how many
//! distinct ids the batch references. Each worker keeps its own results; they
//! are merged after the join, so no lock guards the index.
//!
//! Failures are per id: the id is logged and left out of the index.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, warn};

use crate::data::cms::CmsApi;
use crate::data::record::{image_field, record_fields, single_record, text_field};
use crate::domain::{Course, Teacher, TeacherFieldMap, TeacherIndex};
use crate::error::AppError;

/// Resolve every distinct id with `fetch_one`, running at most `concurrency` at a time.
///
/// The returned index only contains ids whose fetch succeeded. A `concurrency`
/// of zero is treated as one.
pub fn resolve_references<F>(ids: &[String], fetch_one: F, concurrency: usize) -> TeacherIndex
where
    F: Fn(&str) -> Result<Teacher, AppError> + Sync,
{
    let unique = dedupe(ids);
    if unique.is_empty() {
        return TeacherIndex::new();
    }

    let workers = concurrency.max(1).min(unique.len());
    let cursor = AtomicUsize::new(0);

    let run_worker = || {
        let mut found: Vec<(String, Teacher)> = Vec::new();
        loop {
            let idx = cursor.fetch_add(1, Ordering::Relaxed);
            let Some(id) = unique.get(idx) else {
                break;
            };
            match fetch_one(id) {
                Ok(teacher) => found.push((id.clone(), teacher)),
                Err(err) => debug!(id = %id, error = %err, "Dropping unresolved reference"),
            }
        }
        found
    };

    let batches: Vec<Vec<(String, Teacher)>> = match ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("resolver-{i}"))
        .build()
    {
        Ok(pool) => pool.install(|| (0..workers).into_par_iter().map(|_| run_worker()).collect()),
        Err(err) => {
            warn!(error = %err, "Resolver pool unavailable; resolving on the calling thread");
            vec![run_worker()]
        }
    };

    let index: TeacherIndex = batches.into_iter().flatten().collect();
    debug!(
        requested = unique.len(),
        resolved = index.len(),
        workers,
        "Resolved references"
    );
    index
}

/// Ordered union of teacher ids across courses.
pub fn collect_teacher_ids(courses: &[Course]) -> Vec<String> {
    let all: Vec<String> = courses
        .iter()
        .flat_map(|c| c.teacher_ids.iter().cloned())
        .collect();
    dedupe(&all)
}

/// Read and map one teacher record. Every failure is a `ReferenceResolution` error.
pub fn fetch_teacher(
    api: &dyn CmsApi,
    collection_id: &str,
    id: &str,
    fields: &TeacherFieldMap,
) -> Result<Teacher, AppError> {
    let raw = api
        .get_item(collection_id, id)
        .map_err(AppError::into_reference)?;
    let map = record_fields(single_record(&raw))
        .ok_or_else(|| AppError::reference(format!("Teacher record {id} is not an object.")))?;

    Ok(Teacher {
        id: id.to_string(),
        name: text_field(map, &fields.name).unwrap_or_default(),
        portrait_url: image_field(map, &fields.portrait),
    })
}

/// Find the collection that a reference field of `collection_id` points to.
pub fn discover_reference_collection(
    api: &dyn CmsApi,
    collection_id: &str,
    field_key: &str,
) -> Result<String, AppError> {
    let schema = api.get_collection(collection_id)?;
    let field = schema.field(field_key).ok_or_else(|| {
        AppError::config(format!(
            "Field '{field_key}' not found in collection {collection_id}."
        ))
    })?;
    field
        .target_collection()
        .map(str::to_string)
        .ok_or_else(|| AppError::config(format!("Field '{field_key}' is not a reference field.")))
}

fn dedupe(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
