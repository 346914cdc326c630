//! Staging of uploaded files on disk.
//!
//! Uploads are written under the configured upload directory with a
//! timestamp prefix and removed once the request is finished with them.
//! [`StagedUpload`] deletes the file on drop, so error paths cannot leave
//! stray uploads behind.

use std::path::{Path, PathBuf};

use tracing::warn;

/// Reduce a client-supplied filename to a safe single path component.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Write `bytes` to a fresh file under `dir` and return its guard.
pub async fn stage(dir: &Path, original_name: &str, bytes: &[u8]) -> std::io::Result<StagedUpload> {
    tokio::fs::create_dir_all(dir).await?;

    let filename = sanitize_filename(original_name);
    let staged_name = format!("{}-{}", chrono::Utc::now().timestamp_millis(), filename);
    let path = dir.join(staged_name);
    tokio::fs::write(&path, bytes).await?;

    Ok(StagedUpload {
        path,
        filename,
        removed: false,
    })
}

/// A staged upload on disk. The file is deleted when [`remove`] is called
/// or, failing that, when the guard is dropped.
///
/// [`remove`]: StagedUpload::remove
pub struct StagedUpload {
    path: PathBuf,
    filename: String,
    removed: bool,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sanitized filename, without the timestamp prefix.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Delete the staged file now instead of waiting for drop.
    pub async fn remove(mut self) {
        self.removed = true;
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            warn!("Failed to remove staged upload {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Failed to remove staged upload {}: {}", self.path.display(), e);
        }
    }
}
