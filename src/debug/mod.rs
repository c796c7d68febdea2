//! Diagnostic dumps for inspecting the upstream CMS setup.
//!
//! These back the `/api/diag`, `/api/courses_raw` and `/api/schema` endpoints
//! and the `mirror diag` / `mirror schema` subcommands. They read the raw
//! `Settings` rather than a validated config so they still work when the
//! configuration is incomplete.

use chrono::Utc;
use serde_json::{Map, Value, json};

use crate::config::Settings;
use crate::data::cms::{ApiVersion, CmsApi, CmsClient, CollectionSchema};
use crate::error::truncate_chars;

/// Characters of the raw item listing echoed back by `raw_items_dump`.
const RAW_BODY_LIMIT: usize = 2000;
const RAW_ITEM_LIMIT: usize = 5;

/// Which credentials are present, and how both API versions answer a site listing.
pub fn site_probe_report(settings: &Settings) -> Value {
    let mut out = Map::new();
    out.insert("has_WEBFLOW_TOKEN".into(), json!(settings.token.is_some()));
    out.insert("has_COLLECTION_ID".into(), json!(settings.collection_id.is_some()));
    out.insert("checked_at".into(), json!(Utc::now().to_rfc3339()));

    let Some(token) = &settings.token else {
        return Value::Object(out);
    };

    let client = match CmsClient::new(&settings.api_base(), token) {
        Ok(client) => client,
        Err(err) => {
            out.insert("client_error".into(), json!(err.to_string()));
            return Value::Object(out);
        }
    };

    for (version, prefix) in [(ApiVersion::V2, "v2"), (ApiVersion::V1, "v1")] {
        match client.probe_sites(version) {
            Ok(status) => {
                out.insert(format!("{prefix}_sites_status"), json!(status));
                out.insert(format!("{prefix}_sites_ok"), json!((200..300).contains(&status)));
            }
            Err(err) => {
                out.insert(format!("{prefix}_error"), json!(err.to_string()));
            }
        }
    }

    Value::Object(out)
}

/// Status and leading body of a small item listing, whatever the status.
pub fn raw_items_dump(settings: &Settings) -> (u16, Value) {
    let (Some(token), Some(collection)) = (&settings.token, &settings.collection_id) else {
        return (500, json!({ "error": "Missing WEBFLOW_TOKEN or COLLECTION_ID" }));
    };

    let result = CmsClient::new(&settings.api_base(), token)
        .and_then(|client| client.raw_items(collection, RAW_ITEM_LIMIT));
    match result {
        Ok((status, body)) => (
            200,
            json!({ "status": status, "body": truncate_chars(&body, RAW_BODY_LIMIT) }),
        ),
        Err(err) => (200, json!({ "caught": err.to_string() })),
    }
}

/// Field summary of the course collection.
pub fn schema_dump(settings: &Settings) -> (u16, Value) {
    let (Some(token), Some(collection)) = (&settings.token, &settings.collection_id) else {
        return (500, json!({ "error": "Missing env vars" }));
    };

    let result = CmsClient::new(&settings.api_base(), token)
        .and_then(|client| client.get_collection(collection));
    match result {
        Ok(schema) => (200, schema_summary(collection, &schema)),
        Err(err) => (500, json!({ "error": err.detail() })),
    }
}

/// `{ id, name, fields: [{ key, type, target }] }` for a collection schema.
pub fn schema_summary(collection_id: &str, schema: &CollectionSchema) -> Value {
    let fields: Vec<Value> = schema
        .fields
        .iter()
        .map(|f| {
            json!({
                "key": f.key(),
                "type": f.field_type,
                "target": f.target_collection(),
            })
        })
        .collect();

    json!({
        "id": collection_id,
        "name": schema.title(),
        "fields": fields,
    })
}
