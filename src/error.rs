//! Error type shared by the fetcher, resolver, handler and CLI.
//!
//! One struct carries a coarse `ErrorKind` plus a human-readable message. The
//! request handler maps kinds to HTTP statuses; the binary maps them to exit codes.

/// Upstream bodies are cut to this many characters before being kept for diagnostics.
pub const UPSTREAM_BODY_LIMIT: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required identifiers or tokens are missing or invalid.
    Config,
    /// The primary collection read failed (status, transport, or parse).
    Upstream,
    /// A single referenced record could not be resolved.
    ReferenceResolution,
    Io,
    Runtime,
}

/// Status and truncated body of a failed upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamDetail {
    pub status: Option<u16>,
    pub body: String,
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    upstream: Option<UpstreamDetail>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            upstream: None,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Build an upstream error; `body` is truncated to [`UPSTREAM_BODY_LIMIT`] characters.
    pub fn upstream(message: impl Into<String>, status: Option<u16>, body: &str) -> Self {
        Self {
            kind: ErrorKind::Upstream,
            message: message.into(),
            upstream: Some(UpstreamDetail {
                status,
                body: truncate_chars(body, UPSTREAM_BODY_LIMIT),
            }),
        }
    }

    pub fn reference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReferenceResolution, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn upstream_detail(&self) -> Option<&UpstreamDetail> {
        self.upstream.as_ref()
    }

    /// Re-tag an error as a per-reference failure, keeping its message.
    pub fn into_reference(self) -> Self {
        Self {
            kind: ErrorKind::ReferenceResolution,
            ..self
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self.kind {
            ErrorKind::Config => 2,
            ErrorKind::Io => 3,
            ErrorKind::Upstream | ErrorKind::ReferenceResolution => 4,
            ErrorKind::Runtime => 5,
        }
    }

    /// Full diagnostic text, including upstream status and body when present.
    pub fn detail(&self) -> String {
        match &self.upstream {
            Some(detail) => {
                let status = detail
                    .status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "none".to_string());
                format!("{}\nstatus: {status}\nbody: {}", self.message, detail.body)
            }
            None => self.message.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("upstream", &self.upstream)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Keep at most `limit` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_body_is_truncated_to_limit() {
        let body = "x".repeat(1000);
        let err = AppError::upstream("CMS list failed", Some(503), &body);
        let detail = err.upstream_detail().unwrap();
        assert_eq!(detail.status, Some(503));
        assert_eq!(detail.body.chars().count(), UPSTREAM_BODY_LIMIT);
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[test]
    fn truncate_respects_multibyte_chars() {
        let text = "éééé";
        assert_eq!(truncate_chars(text, 2), "éé");
        assert_eq!(truncate_chars(text, 10), "éééé");
    }

    #[test]
    fn detail_includes_status_and_body() {
        let err = AppError::upstream("CMS list failed", Some(401), "{\"msg\":\"nope\"}");
        let detail = err.detail();
        assert!(detail.contains("status: 401"));
        assert!(detail.contains("nope"));

        let plain = AppError::config("Missing WEBFLOW_TOKEN");
        assert_eq!(plain.detail(), "Missing WEBFLOW_TOKEN");
        assert_eq!(plain.exit_code(), 2);
    }

    #[test]
    fn into_reference_retags_kind() {
        let err = AppError::upstream("item read failed", Some(404), "").into_reference();
        assert_eq!(err.kind(), ErrorKind::ReferenceResolution);
        assert_eq!(err.message(), "item read failed");
    }
}
