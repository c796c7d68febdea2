//! Write rendered catalog HTML to disk.
//!
//! This is the static half of the mirror: a fragment saved here can be pasted
//! into, or uploaded to, the host platform without running the server.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;

pub fn write_html(path: &Path, html: &str) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create HTML file '{}': {e}", path.display())))?;

    file.write_all(html.as_bytes())
        .map_err(|e| AppError::io(format!("Failed to write HTML file '{}': {e}", path.display())))?;

    Ok(())
}
