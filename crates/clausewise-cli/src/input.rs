//! Reading contract files from disk.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Load a contract as text. `.pdf` files go through `pdf-extract`; anything
/// else must be UTF-8.
pub fn load_text(path: &Path) -> Result<String> {
    let text = if is_pdf(path) {
        let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Failed to extract text from PDF {}", path.display()))?
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
    };
    tracing::debug!(path = %path.display(), chars = text.chars().count(), "Contract loaded");
    Ok(text)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
