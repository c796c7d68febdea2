//! Request handling, independent of the HTTP framework.
//!
//! Handlers return an `HttpReply`; the axum adapter in `server` only converts
//! it. Everything here is blocking and must run off the async executor.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::app::pipeline::{run_catalog, run_catalog_with};
use crate::config::{MirrorConfig, Settings};
use crate::data::cms::CmsApi;
use crate::data::section::{extract_section, fetch_page};
use crate::domain::RenderMode;
use crate::error::{AppError, ErrorKind};

pub const CACHE_CONTROL: &str = "public, max-age=300";
pub const HTML: &str = "text/html; charset=utf-8";
pub const TEXT: &str = "text/plain; charset=utf-8";
pub const JSON: &str = "application/json; charset=utf-8";

/// Status, headers, and body of a response. Header names are lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// A reply carrying the CORS origin header.
    pub fn cors(status: u16, origin: &str) -> Self {
        Self::new(status).with_header("access-control-allow-origin", origin)
    }

    /// Add the CORS origin header unless the reply already has one.
    pub fn with_origin(self, origin: &str) -> Self {
        if self.header("access-control-allow-origin").is_some() {
            return self;
        }
        self.with_header("access-control-allow-origin", origin)
    }

    pub fn json(status: u16, value: &Value) -> Self {
        let body = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
        Self::new(status)
            .with_header("content-type", JSON)
            .with_body(body)
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Query flags recognized by the catalog endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestFlags {
    /// Surface internal error detail instead of a masked status.
    pub debug: bool,
    /// Return a standalone page instead of a fragment.
    pub preview: bool,
}

impl RequestFlags {
    /// A flag is set when present with no value or any value except `0`/`false`.
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let flag = |name: &str| {
            query.get(name).is_some_and(|v| {
                let v = v.trim();
                !(v == "0" || v.eq_ignore_ascii_case("false"))
            })
        };
        Self {
            debug: flag("debug"),
            preview: flag("preview"),
        }
    }

    pub fn mode(&self) -> RenderMode {
        if self.preview {
            RenderMode::Standalone
        } else {
            RenderMode::Fragment
        }
    }
}

/// CORS preflight.
pub fn preflight(origin: &str) -> HttpReply {
    HttpReply::cors(204, origin)
        .with_header("access-control-allow-methods", "GET, OPTIONS")
        .with_header("access-control-allow-headers", "Content-Type")
}

/// Catalog endpoint using a fresh CMS client for this request.
pub fn courses(config: Result<&MirrorConfig, &AppError>, origin: &str, flags: RequestFlags) -> HttpReply {
    match config {
        Ok(config) => render_reply(run_catalog(config, flags.mode()), origin, flags),
        Err(err) => error_reply(err, origin, flags.debug),
    }
}

/// Catalog endpoint against any `CmsApi`.
pub fn courses_with(api: &dyn CmsApi, config: &MirrorConfig, flags: RequestFlags) -> HttpReply {
    render_reply(run_catalog_with(api, config, flags.mode()), &config.origin, flags)
}

fn render_reply(
    result: Result<crate::app::pipeline::CatalogRun, AppError>,
    origin: &str,
    flags: RequestFlags,
) -> HttpReply {
    match result {
        Ok(run) if run.courses.is_empty() => {
            debug!("No published courses; replying 204");
            HttpReply::cors(204, origin)
        }
        Ok(run) => HttpReply::cors(200, origin)
            .with_header("content-type", HTML)
            .with_header("cache-control", CACHE_CONTROL)
            .with_body(run.html),
        Err(err) => error_reply(&err, origin, flags.debug),
    }
}

/// Map an error to a reply. Without `debug`, bodies are empty.
///
/// Configuration errors are 500. Upstream errors are 502, or 500 with detail
/// in debug mode.
pub fn error_reply(err: &AppError, origin: &str, debug: bool) -> HttpReply {
    if debug {
        return HttpReply::cors(500, origin)
            .with_header("content-type", TEXT)
            .with_body(err.detail());
    }

    warn!(kind = ?err.kind(), error = %err, "Request failed");
    let status = match err.kind() {
        ErrorKind::Upstream => 502,
        _ => 500,
    };
    HttpReply::cors(status, origin)
}

/// Legacy endpoint: mirror one element of a public page.
pub fn section(settings: &Settings) -> HttpReply {
    let origin = settings.origin();
    let source = match settings.section_source() {
        Ok(source) => source,
        Err(err) => return error_reply(&err, &origin, false),
    };

    match fetch_page(&source.url) {
        Ok(html) => match extract_section(&html, &source.element_id) {
            Some(fragment) => HttpReply::cors(200, &origin)
                .with_header("content-type", HTML)
                .with_header("cache-control", CACHE_CONTROL)
                .with_body(fragment),
            None => HttpReply::cors(204, &origin),
        },
        Err(err) => {
            warn!(error = %err, "Section source unavailable");
            HttpReply::cors(502, &origin)
        }
    }
}
