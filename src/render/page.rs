//! Standalone preview document.

const STYLESHEET: &str = r#"
body { margin: 0; padding: 24px; font-family: system-ui, -apple-system, "Segoe UI", sans-serif; background: #f6f6f4; color: #1d1d1f; }
.catalog { max-width: 1180px; margin: 0 auto; }
.catalog-group { margin-bottom: 40px; }
.catalog-group-title { font-size: 1.5rem; margin: 0 0 16px; }
.catalog-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 20px; }
.catalog-card { display: flex; flex-direction: column; background: #fff; border-radius: 10px; overflow: hidden; text-decoration: none; color: inherit; box-shadow: 0 1px 3px rgba(0, 0, 0, 0.12); }
.catalog-card:hover { box-shadow: 0 4px 12px rgba(0, 0, 0, 0.18); }
.catalog-card-image { width: 100%; aspect-ratio: 16 / 9; object-fit: cover; }
.catalog-card-title { font-size: 1.05rem; margin: 12px 14px 8px; }
.catalog-teachers { list-style: none; margin: 0 14px 14px; padding: 0; display: flex; flex-wrap: wrap; gap: 8px; }
.catalog-teacher { display: flex; align-items: center; gap: 6px; font-size: 0.85rem; }
.catalog-teacher-portrait { width: 28px; height: 28px; border-radius: 50%; object-fit: cover; }
"#;

/// Wrap a fragment in a full HTML document with the catalog stylesheet.
pub fn wrap_document(fragment: &str) -> String {
    let mut out = String::new();
    out.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str("<title>Courses</title>\n");
    out.push_str("<style>");
    out.push_str(STYLESHEET);
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(fragment);
    out.push_str("</body>\n</html>\n");
    out
}
