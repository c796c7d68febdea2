//! Legacy page-section mirroring.
//!
//! Before the CMS API was wired up, the catalog was mirrored by fetching the
//! public courses page and cutting out one element by id. The endpoint is kept
//! for hosts that still embed it.

use regex::Regex;
use reqwest::blocking::Client;
use tracing::debug;

use crate::error::AppError;

const SCRAPE_USER_AGENT: &str = "MTS-Teachable-Proxy";

/// Fetch a public page as text.
pub fn fetch_page(url: &str) -> Result<String, AppError> {
    let client = Client::builder()
        .user_agent(SCRAPE_USER_AGENT)
        .build()
        .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))?;

    let resp = client
        .get(url)
        .send()
        .map_err(|e| AppError::upstream(format!("Page request failed: {e}"), None, ""))?;
    let status = resp.status();
    let text = resp.text().map_err(|e| {
        AppError::upstream(format!("Failed to read page: {e}"), Some(status.as_u16()), "")
    })?;

    debug!(url, status = status.as_u16(), bytes = text.len(), "Fetched source page");
    Ok(text)
}

/// Cut out the element whose `id` attribute equals `element_id`, including its tags.
///
/// The element ends at the first closing tag of the same name, so an element
/// that nests a same-named child is cut short. Returns `None` when no element matches.
pub fn extract_section(html: &str, element_id: &str) -> Option<String> {
    let open = Regex::new(&format!(
        r#"(?i)<([a-zA-Z0-9:-]+)[^>]*\sid=["']{}["'][^>]*>"#,
        regex::escape(element_id)
    ))
    .ok()?;
    let caps = open.captures(html)?;
    let whole = caps.get(0)?;
    let tag = caps.get(1)?.as_str();

    let close = Regex::new(&format!(r"(?i)</{}\s*>", regex::escape(tag))).ok()?;
    let end = close.find_at(html, whole.end())?;

    Some(html[whole.start()..end.end()].to_string())
}
