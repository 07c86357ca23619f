// src/output/clipboard.rs
//! Clipboard delivery of the freshly created page link.
//!
//! Strictly best-effort: by the time this runs the sync has already
//! completed, so a clipboard failure is logged by the caller and never
//! fails the operation.

use crate::error::AppError;

/// Copies content to the system clipboard.
pub fn copy_to_clipboard(content: &str) -> Result<(), AppError> {
    log::debug!("Copying {} characters to clipboard", content.len());

    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| AppError::Clipboard(format!("Failed to access clipboard: {}", e)))?;
    clipboard
        .set_text(content)
        .map_err(|e| AppError::Clipboard(format!("Failed to set clipboard text: {}", e)))?;

    log::info!("Page link copied to clipboard");
    Ok(())
}
