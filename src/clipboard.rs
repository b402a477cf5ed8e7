use anyhow::Result;
use tracing::debug;

/// Plain-text clipboard write. Best effort, no retry.
pub fn copy_text(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| anyhow::anyhow!("Clipboard unavailable: {}", e))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| anyhow::anyhow!("Clipboard write failed: {}", e))?;
    debug!(bytes = text.len(), "copied to clipboard");
    Ok(())
}
