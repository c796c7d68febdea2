//! Shared catalog pipeline used by both the HTTP handler and the CLI.
//!
//! collection fetch -> teacher id union -> bounded resolve -> hydrate -> group -> render
//!
//! The primary fetch is the only step that can fail the run. Teacher
//! resolution problems (including failing to discover the teacher collection)
//! only remove badges from the output.

use tracing::{debug, warn};

use crate::config::MirrorConfig;
use crate::data::cms::{CmsApi, CmsClient};
use crate::data::resolver::{discover_reference_collection, fetch_teacher};
use crate::data::{collect_teacher_ids, fetch_courses, resolve_references};
use crate::domain::{Course, RenderGroup, RenderMode, TeacherIndex};
use crate::error::AppError;
use crate::render::{Renderer, group_by_category, hydrate};

/// Everything computed by one pipeline run.
#[derive(Debug, Clone)]
pub struct CatalogRun {
    pub courses: Vec<Course>,
    pub teachers: TeacherIndex,
    pub groups: Vec<RenderGroup>,
    pub html: String,
}

/// Run the pipeline against the live CMS with a fresh client.
pub fn run_catalog(config: &MirrorConfig, mode: RenderMode) -> Result<CatalogRun, AppError> {
    let client = CmsClient::from_config(config)?;
    run_catalog_with(&client, config, mode)
}

/// Run the pipeline against any `CmsApi`.
pub fn run_catalog_with(
    api: &dyn CmsApi,
    config: &MirrorConfig,
    mode: RenderMode,
) -> Result<CatalogRun, AppError> {
    // 1) Primary fetch; failures abort the run.
    let courses = fetch_courses(
        api,
        &config.course_collection,
        config.page_size,
        0,
        &config.fields,
    )?;

    // 2) Resolve referenced teachers; failures are per id.
    let teachers = resolve_teachers(api, config, &courses);

    // 3) Hydrate and group.
    let resolved = hydrate(&courses, &teachers);
    let groups = group_by_category(&resolved, &config.categories);

    // 4) Render.
    let html = Renderer::new(config.link_prefix.clone()).render(&groups, mode);

    debug!(
        courses = courses.len(),
        teachers = teachers.len(),
        groups = groups.len(),
        "Catalog rendered"
    );

    Ok(CatalogRun {
        courses,
        teachers,
        groups,
        html,
    })
}

fn resolve_teachers(api: &dyn CmsApi, config: &MirrorConfig, courses: &[Course]) -> TeacherIndex {
    let ids = collect_teacher_ids(courses);
    if ids.is_empty() {
        return TeacherIndex::new();
    }

    let collection = match &config.teacher_collection {
        Some(id) => id.clone(),
        None => match discover_reference_collection(api, &config.course_collection, &config.fields.teachers) {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "Could not discover teacher collection; rendering without teachers");
                return TeacherIndex::new();
            }
        },
    };

    resolve_references(
        &ids,
        |id| fetch_teacher(api, &collection, id, &config.teacher_fields),
        config.concurrency,
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;
    use crate::test_utils::{FakeCms, init_test_logging, sample_config as config};

    fn three_item_cms() -> FakeCms {
        FakeCms::new()
            .with_items(vec![
                json!({ "id": "c1", "fieldData": {
                    "name": "Scoring", "slug": "scoring", "publish": true, "piano": true,
                    "teachers": ["T1", "T2"]
                }}),
                json!({ "id": "c2", "fieldData": {
                    "name": "Harmony", "slug": "harmony", "publish": true, "piano": true
                }}),
                json!({ "id": "c3", "fieldData": {
                    "name": "Hidden", "slug": "hidden", "publish": false, "piano": true,
                    "teachers": ["T1"]
                }}),
            ])
            .with_record("T1", json!({ "id": "T1", "fieldData": { "name": "Ada" } }))
    }

    #[test]
    fn partial_teacher_failure_still_renders() {
        init_test_logging(None);
        let api = three_item_cms();
        let run = run_catalog_with(&api, &config(), RenderMode::Fragment).unwrap();

        assert_eq!(run.courses.len(), 2);
        assert_eq!(run.teachers.len(), 1);
        assert!(run.teachers.contains_key("T1"));

        let piano = &run.groups[0];
        assert_eq!(piano.items.len(), 2);
        assert_eq!(piano.items[0].teachers.len(), 1);
        assert_eq!(piano.items[0].teachers[0].name, "Ada");
        assert!(piano.items[1].teachers.is_empty());
        assert!(run.groups[1].items.is_empty());

        assert!(run.html.contains("<span>Ada</span>"));
        assert_eq!(run.html.matches("class=\"catalog-teacher\"").count(), 1);
        assert!(!run.html.contains("Hidden"));
    }

    #[test]
    fn teachers_are_fetched_once_per_distinct_id() {
        let api = FakeCms::new()
            .with_items(vec![
                json!({ "id": "a", "fieldData": { "teachers": ["T1"], "piano": true } }),
                json!({ "id": "b", "fieldData": { "teachers": ["T1"], "theory": true } }),
            ])
            .with_record("T1", json!({ "id": "T1", "fieldData": { "name": "Ada" } }));

        run_catalog_with(&api, &config(), RenderMode::Fragment).unwrap();
        assert_eq!(api.item_calls(), 1);
    }

    #[test]
    fn primary_fetch_failure_aborts() {
        let api = FakeCms::new().failing_list(AppError::upstream("CMS item list failed", Some(500), "boom"));
        let err = run_catalog_with(&api, &config(), RenderMode::Fragment).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[test]
    fn teacher_collection_is_discovered_when_unset() {
        let mut config = config();
        config.teacher_collection = None;
        let api = three_item_cms().with_schema(json!({
            "fields": [{ "slug": "teachers", "type": "MultiReference", "metadata": { "collectionId": "teacher-col" } }]
        }));

        let run = run_catalog_with(&api, &config, RenderMode::Fragment).unwrap();
        assert_eq!(run.teachers.len(), 1);
    }

    #[test]
    fn failed_discovery_renders_without_teachers() {
        let mut config = config();
        config.teacher_collection = None;
        let api = three_item_cms();

        let run = run_catalog_with(&api, &config, RenderMode::Fragment).unwrap();
        assert!(run.teachers.is_empty());
        assert_eq!(run.courses.len(), 2);
        assert_eq!(api.item_calls(), 0);
    }

    #[test]
    fn standalone_mode_produces_document() {
        let run = run_catalog_with(&three_item_cms(), &config(), RenderMode::Standalone).unwrap();
        assert!(run.html.starts_with("<!doctype html>"));
    }
}
