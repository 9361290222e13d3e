//! Turn manifest output.

use std::path::Path;
use tracing::info;

use relato_models::Turn;

use crate::error::ScriptResult;

/// Write the parsed turns as a pretty-printed JSON manifest.
///
/// The manifest records exactly what the renderer consumed and makes
/// repeated renders reproducible and diffable.
pub fn write_manifest(turns: &[Turn], path: impl AsRef<Path>) -> ScriptResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(turns)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), turns = turns.len(), "Manifest written");
    Ok(())
}
