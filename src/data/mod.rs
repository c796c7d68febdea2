//! Upstream data access.
//!
//! - CMS API client and trait seam (`cms`)
//! - raw record accessors shared by the mappers (`record`)
//! - course collection fetcher (`fetcher`)
//! - bounded-concurrency teacher resolver (`resolver`)
//! - legacy page-section scraper (`section`)

pub mod cms;
pub mod fetcher;
pub mod record;
pub mod resolver;
pub mod section;

pub use cms::{CmsApi, CmsClient};
pub use fetcher::fetch_courses;
pub use resolver::{collect_teacher_ids, resolve_references};
