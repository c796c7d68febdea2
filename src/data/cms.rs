//! Webflow-style CMS collection API integration.
//!
//! The fetcher and resolver only see the `CmsApi` trait; `CmsClient` is the
//! blocking `reqwest` implementation used at runtime.

use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::MirrorConfig;
use crate::error::AppError;

const USER_AGENT: &str = concat!("catalog-mirror/", env!("CARGO_PKG_VERSION"));

/// Read-only view of the upstream collection API.
pub trait CmsApi: Sync {
    /// One page of raw item records.
    fn list_items(&self, collection_id: &str, limit: usize, offset: usize) -> Result<ItemsPage, AppError>;

    /// A single raw item record by id.
    fn get_item(&self, collection_id: &str, item_id: &str) -> Result<Value, AppError>;

    /// The collection's field schema.
    fn get_collection(&self, collection_id: &str) -> Result<CollectionSchema, AppError>;
}

/// A page of raw records. Individual items stay untyped until field mapping.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemsPage {
    #[serde(default)]
    pub items: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionSchema {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

impl CollectionSchema {
    pub fn title(&self) -> Option<&str> {
        self.display_name.as_deref().or(self.name.as_deref())
    }

    pub fn field(&self, key: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.key() == Some(key))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaField {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub metadata: Option<FieldMetadata>,
}

impl SchemaField {
    /// Older schemas call the field key `key`, newer ones `slug`.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref().or(self.slug.as_deref())
    }

    /// Target collection of a reference field.
    pub fn target_collection(&self) -> Option<&str> {
        self.metadata.as_ref()?.collection_id.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldMetadata {
    #[serde(default, rename = "collectionId")]
    pub collection_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V2,
}

pub struct CmsClient {
    client: Client,
    base: String,
    token: String,
}

impl CmsClient {
    pub fn new(base: &str, token: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub fn from_config(config: &MirrorConfig) -> Result<Self, AppError> {
        Self::new(&config.api_base, &config.token)
    }

    fn collection_url(&self, collection_id: &str) -> String {
        format!("{}/v2/collections/{collection_id}", self.base)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.token)
    }

    fn get_json<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T, AppError> {
        let resp = self
            .authorized(req)
            .send()
            .map_err(|e| AppError::upstream(format!("{what} request failed: {e}"), None, ""))?;

        let status = resp.status();
        let text = resp.text().map_err(|e| {
            AppError::upstream(
                format!("Failed to read {what} response: {e}"),
                Some(status.as_u16()),
                "",
            )
        })?;

        if !status.is_success() {
            return Err(AppError::upstream(
                format!("{what} failed with status {status}."),
                Some(status.as_u16()),
                &text,
            ));
        }

        serde_json::from_str(&text).map_err(|e| {
            AppError::upstream(
                format!("Failed to parse {what} response: {e}"),
                Some(status.as_u16()),
                &text,
            )
        })
    }

    /// Status and raw body of a small list call, for diagnostics.
    ///
    /// Only transport failures are errors; any HTTP status is returned as-is.
    pub fn raw_items(&self, collection_id: &str, limit: usize) -> Result<(u16, String), AppError> {
        let resp = self
            .authorized(
                self.client
                    .get(format!("{}/items", self.collection_url(collection_id)))
                    .query(&[("limit", limit.to_string())]),
            )
            .send()
            .map_err(|e| AppError::upstream(format!("Item dump request failed: {e}"), None, ""))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| AppError::upstream(format!("Failed to read item dump: {e}"), Some(status), ""))?;
        Ok((status, body))
    }

    /// Hit the site listing endpoint of one API version and report the status.
    pub fn probe_sites(&self, version: ApiVersion) -> Result<u16, AppError> {
        let req = match version {
            ApiVersion::V2 => self.client.get(format!("{}/v2/sites", self.base)),
            ApiVersion::V1 => self
                .client
                .get(format!("{}/sites", self.base))
                .header("accept-version", "1.0.0"),
        };
        let resp = self
            .authorized(req)
            .send()
            .map_err(|e| AppError::upstream(format!("Site probe failed: {e}"), None, ""))?;
        Ok(resp.status().as_u16())
    }
}

impl CmsApi for CmsClient {
    fn list_items(&self, collection_id: &str, limit: usize, offset: usize) -> Result<ItemsPage, AppError> {
        let req = self
            .client
            .get(format!("{}/items", self.collection_url(collection_id)))
            .query(&[("limit", limit.to_string()), ("offset", offset.to_string())]);
        self.get_json(req, "CMS item list")
    }

    fn get_item(&self, collection_id: &str, item_id: &str) -> Result<Value, AppError> {
        let req = self
            .client
            .get(format!("{}/items/{item_id}", self.collection_url(collection_id)));
        self.get_json(req, "CMS item read")
    }

    fn get_collection(&self, collection_id: &str) -> Result<CollectionSchema, AppError> {
        let req = self.client.get(self.collection_url(collection_id));
        self.get_json(req, "CMS collection schema")
    }
}
