//! Environment-backed configuration.
//!
//! `Settings` is the raw view of the environment (after loading `.env`). It never
//! fails to build so diagnostics can still report what is missing. `validate`
//! turns it into a typed `MirrorConfig` once, at startup.

use crate::domain::{CategorySpec, FieldMap, TeacherFieldMap};
use crate::error::AppError;

pub const DEFAULT_API_BASE: &str = "https://api.webflow.com";
pub const DEFAULT_ORIGIN: &str = "https://master-the-score.teachable.com";
pub const DEFAULT_LINK_PREFIX: &str = "/courses/";
pub const DEFAULT_SECTION_ELEMENT_ID: &str = "all-courses-content";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Largest page the collection API will return.
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Raw configuration values, as found in the environment.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub token: Option<String>,
    pub collection_id: Option<String>,
    pub teacher_collection_id: Option<String>,
    pub api_base: Option<String>,
    pub name_field: Option<String>,
    pub slug_field: Option<String>,
    pub image_field: Option<String>,
    pub teachers_field: Option<String>,
    pub publish_field: Option<String>,
    pub teacher_name_field: Option<String>,
    pub teacher_portrait_field: Option<String>,
    pub category_fields: Option<String>,
    pub allowed_origin: Option<String>,
    pub course_link_prefix: Option<String>,
    pub page_size: Option<String>,
    pub resolve_concurrency: Option<String>,
    pub section_source_url: Option<String>,
    pub section_element_id: Option<String>,
    pub bind_addr: Option<String>,
}

/// Validated configuration for the catalog pipeline.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub token: String,
    pub api_base: String,
    pub course_collection: String,
    /// When absent, the teacher collection is discovered from the course schema.
    pub teacher_collection: Option<String>,
    pub fields: FieldMap,
    pub teacher_fields: TeacherFieldMap,
    pub categories: Vec<CategorySpec>,
    pub origin: String,
    pub link_prefix: String,
    pub page_size: usize,
    pub concurrency: usize,
}

/// Where the legacy page-scraping endpoint reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSource {
    pub url: String,
    pub element_id: String,
}

impl Settings {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            token: get("WEBFLOW_TOKEN"),
            collection_id: get("COLLECTION_ID"),
            teacher_collection_id: get("TEACHER_COLLECTION_ID"),
            api_base: get("CMS_API_BASE"),
            name_field: get("NAME_FIELD"),
            slug_field: get("SLUG_FIELD"),
            image_field: get("IMAGE_FIELD"),
            teachers_field: get("TEACHERS_FIELD"),
            publish_field: get("PUBLISH_FIELD"),
            teacher_name_field: get("TEACHER_NAME_FIELD"),
            teacher_portrait_field: get("TEACHER_PORTRAIT_FIELD"),
            category_fields: get("CATEGORY_FIELDS"),
            allowed_origin: get("ALLOWED_ORIGIN"),
            course_link_prefix: get("COURSE_LINK_PREFIX"),
            page_size: get("PAGE_SIZE"),
            resolve_concurrency: get("RESOLVE_CONCURRENCY"),
            section_source_url: get("SECTION_SOURCE_URL"),
            section_element_id: get("SECTION_ELEMENT_ID"),
            bind_addr: get("BIND_ADDR"),
        }
    }

    /// The CORS origin is needed even when the rest of the configuration is broken.
    pub fn origin(&self) -> String {
        self.allowed_origin
            .clone()
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string())
    }

    pub fn api_base(&self) -> String {
        self.api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn bind_addr(&self) -> String {
        self.bind_addr
            .clone()
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
    }

    pub fn validate(&self) -> Result<MirrorConfig, AppError> {
        let token = required(&self.token, "WEBFLOW_TOKEN")?;
        let course_collection = required(&self.collection_id, "COLLECTION_ID")?;
        let image = required(&self.image_field, "IMAGE_FIELD")?;
        let teachers = required(&self.teachers_field, "TEACHERS_FIELD")?;

        let categories = match &self.category_fields {
            Some(raw) => parse_categories(raw)?,
            None => Vec::new(),
        };

        let page_size = parse_number(&self.page_size, "PAGE_SIZE", MAX_PAGE_SIZE)?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(AppError::config(format!(
                "PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE} (got {page_size})."
            )));
        }

        let concurrency = parse_number(
            &self.resolve_concurrency,
            "RESOLVE_CONCURRENCY",
            DEFAULT_CONCURRENCY,
        )?;
        if concurrency == 0 {
            return Err(AppError::config("RESOLVE_CONCURRENCY must be at least 1."));
        }

        let teacher_defaults = TeacherFieldMap::default();

        Ok(MirrorConfig {
            token,
            api_base: self.api_base(),
            course_collection,
            teacher_collection: self.teacher_collection_id.clone(),
            fields: FieldMap {
                name: self.name_field.clone().unwrap_or_else(|| "name".to_string()),
                slug: self.slug_field.clone().unwrap_or_else(|| "slug".to_string()),
                image,
                teachers,
                publish: self.publish_field.clone(),
                categories: categories.iter().map(|c| c.key.clone()).collect(),
            },
            teacher_fields: TeacherFieldMap {
                name: self
                    .teacher_name_field
                    .clone()
                    .unwrap_or(teacher_defaults.name),
                portrait: self
                    .teacher_portrait_field
                    .clone()
                    .unwrap_or(teacher_defaults.portrait),
            },
            categories,
            origin: self.origin(),
            link_prefix: self
                .course_link_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_LINK_PREFIX.to_string()),
            page_size,
            concurrency,
        })
    }

    pub fn section_source(&self) -> Result<SectionSource, AppError> {
        Ok(SectionSource {
            url: required(&self.section_source_url, "SECTION_SOURCE_URL")?,
            element_id: self
                .section_element_id
                .clone()
                .unwrap_or_else(|| DEFAULT_SECTION_ELEMENT_ID.to_string()),
        })
    }
}

fn required(value: &Option<String>, name: &str) -> Result<String, AppError> {
    value
        .clone()
        .ok_or_else(|| AppError::config(format!("Missing {name} in environment (.env).")))
}

fn parse_number(value: &Option<String>, name: &str, default: usize) -> Result<usize, AppError> {
    match value {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|e| AppError::config(format!("Invalid {name} '{raw}': {e}"))),
        None => Ok(default),
    }
}

/// Parse `Title=key,Title=key` into an ordered category list.
pub fn parse_categories(raw: &str) -> Result<Vec<CategorySpec>, AppError> {
    let mut out = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (title, key) = entry.split_once('=').ok_or_else(|| {
            AppError::config(format!("Invalid CATEGORY_FIELDS entry '{entry}' (expected Title=key)."))
        })?;
        let (title, key) = (title.trim(), key.trim());
        if title.is_empty() || key.is_empty() {
            return Err(AppError::config(format!(
                "Invalid CATEGORY_FIELDS entry '{entry}' (empty title or key)."
            )));
        }
        out.push(CategorySpec::new(title, key));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::ErrorKind;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("WEBFLOW_TOKEN", "tok"),
            ("COLLECTION_ID", "courses"),
            ("IMAGE_FIELD", "thumbnail"),
            ("TEACHERS_FIELD", "teachers"),
        ]
    }

    #[test]
    fn minimal_settings_validate_with_defaults() {
        let config = settings(&minimal()).validate().unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.origin, DEFAULT_ORIGIN);
        assert_eq!(config.page_size, MAX_PAGE_SIZE);
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.fields.name, "name");
        assert_eq!(config.fields.slug, "slug");
        assert_eq!(config.teacher_fields.portrait, "portrait");
        assert!(config.teacher_collection.is_none());
        assert!(config.categories.is_empty());
    }

    #[test]
    fn missing_token_is_config_error() {
        let err = settings(&[("COLLECTION_ID", "courses")]).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.message().contains("WEBFLOW_TOKEN"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut pairs = minimal();
        pairs[1] = ("COLLECTION_ID", "   ");
        let err = settings(&pairs).validate().unwrap_err();
        assert!(err.message().contains("COLLECTION_ID"));
    }

    #[test]
    fn page_size_is_bounded() {
        let mut pairs = minimal();
        pairs.push(("PAGE_SIZE", "101"));
        assert!(settings(&pairs).validate().is_err());

        let mut pairs = minimal();
        pairs.push(("PAGE_SIZE", "0"));
        assert!(settings(&pairs).validate().is_err());

        let mut pairs = minimal();
        pairs.push(("PAGE_SIZE", "25"));
        assert_eq!(settings(&pairs).validate().unwrap().page_size, 25);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let mut pairs = minimal();
        pairs.push(("RESOLVE_CONCURRENCY", "0"));
        let err = settings(&pairs).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn categories_keep_declared_order() {
        let mut pairs = minimal();
        pairs.push(("CATEGORY_FIELDS", "Piano Courses=piano, Theory=theory,"));
        let config = settings(&pairs).validate().unwrap();
        assert_eq!(
            config.categories,
            vec![
                CategorySpec::new("Piano Courses", "piano"),
                CategorySpec::new("Theory", "theory"),
            ]
        );
        assert_eq!(config.fields.categories, vec!["piano", "theory"]);
    }

    #[test]
    fn malformed_category_entry_is_rejected() {
        assert!(parse_categories("Piano").is_err());
        assert!(parse_categories("=piano").is_err());
        assert!(parse_categories("").unwrap().is_empty());
    }

    #[test]
    fn api_base_drops_trailing_slash() {
        let s = settings(&[("CMS_API_BASE", "http://localhost:9000/")]);
        assert_eq!(s.api_base(), "http://localhost:9000");
    }

    #[test]
    fn section_source_requires_url() {
        assert!(settings(&[]).section_source().is_err());
        let source = settings(&[("SECTION_SOURCE_URL", "https://example.com/courses")])
            .section_source()
            .unwrap();
        assert_eq!(source.element_id, DEFAULT_SECTION_ELEMENT_ID);
    }
}
