//! Shared helpers for unit tests: an in-memory CMS and logging setup.

use std::collections::HashMap;
use std::sync::{Mutex, Once};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::MirrorConfig;
use crate::data::cms::{CmsApi, CollectionSchema, ItemsPage};
use crate::domain::{CategorySpec, FieldMap, TeacherFieldMap};
use crate::error::AppError;

static INIT_LOGGING: Once = Once::new();

/// Route `tracing` output to the test writer.
///
/// Uses `level` when given, else `RUST_LOG`; does nothing when neither is set.
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Course field keys used throughout the tests.
pub fn course_fields() -> FieldMap {
    FieldMap {
        name: "name".to_string(),
        slug: "slug".to_string(),
        image: "thumbnail".to_string(),
        teachers: "teachers".to_string(),
        publish: Some("publish".to_string()),
        categories: vec!["piano".to_string(), "theory".to_string()],
    }
}

/// A valid configuration pointing at an unreachable CMS.
pub fn sample_config() -> MirrorConfig {
    MirrorConfig {
        token: "tok".to_string(),
        api_base: "http://cms.invalid".to_string(),
        course_collection: "courses".to_string(),
        teacher_collection: Some("teachers".to_string()),
        fields: course_fields(),
        teacher_fields: TeacherFieldMap::default(),
        categories: vec![
            CategorySpec::new("Piano", "piano"),
            CategorySpec::new("Theory", "theory"),
        ],
        origin: "https://school.example".to_string(),
        link_prefix: "/courses/".to_string(),
        page_size: 100,
        concurrency: 4,
    }
}

/// In-memory `CmsApi`.
///
/// `get_item` ignores the collection id and looks records up by item id; unknown
/// ids fail with a 404 upstream error.
pub struct FakeCms {
    items: Result<Vec<Value>, AppError>,
    records: HashMap<String, Value>,
    schema: Option<Value>,
    list_calls: Mutex<Vec<(String, usize, usize)>>,
    item_calls: AtomicUsize,
}

impl FakeCms {
    pub fn new() -> Self {
        Self {
            items: Ok(Vec::new()),
            records: HashMap::new(),
            schema: None,
            list_calls: Mutex::new(Vec::new()),
            item_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_items(mut self, items: Vec<Value>) -> Self {
        self.items = Ok(items);
        self
    }

    pub fn failing_list(mut self, err: AppError) -> Self {
        self.items = Err(err);
        self
    }

    pub fn with_record(mut self, id: &str, record: Value) -> Self {
        self.records.insert(id.to_string(), record);
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn list_calls(&self) -> Vec<(String, usize, usize)> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn item_calls(&self) -> usize {
        self.item_calls.load(Ordering::SeqCst)
    }
}

impl CmsApi for FakeCms {
    fn list_items(&self, collection_id: &str, limit: usize, offset: usize) -> Result<ItemsPage, AppError> {
        self.list_calls
            .lock()
            .unwrap()
            .push((collection_id.to_string(), limit, offset));
        self.items.clone().map(|items| ItemsPage { items })
    }

    fn get_item(&self, _collection_id: &str, item_id: &str) -> Result<Value, AppError> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        self.records.get(item_id).cloned().ok_or_else(|| {
            AppError::upstream(
                "CMS item read failed with status 404 Not Found.",
                Some(404),
                "{\"message\":\"Requested resource not found\"}",
            )
        })
    }

    fn get_collection(&self, collection_id: &str) -> Result<CollectionSchema, AppError> {
        let schema = self.schema.clone().ok_or_else(|| {
            AppError::upstream(
                format!("CMS collection schema failed for {collection_id}."),
                Some(404),
                "",
            )
        })?;
        serde_json::from_value(schema)
            .map_err(|e| AppError::upstream(format!("Invalid schema: {e}"), Some(200), ""))
    }
}
