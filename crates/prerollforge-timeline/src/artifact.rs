//! The finished preroll and its download name.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::NaiveDateTime;
use prerollforge_common::{Error, Result};
use serde::Serialize;

/// Media type of every artifact.
pub const MEDIA_TYPE: &str = "video/quicktime";

/// Name used when the title has no ASCII letters or digits.
pub const FALLBACK_TITLE: &str = "preroll";

/// Keep only ASCII letters and digits.
///
/// ```
/// use prerollforge_timeline::artifact::sanitize_title;
///
/// assert_eq!(sanitize_title("Episode #1: Pilot!"), "Episode1Pilot");
/// assert_eq!(sanitize_title("???"), "preroll");
/// ```
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title.chars().filter(char::is_ascii_alphanumeric).collect();
    if cleaned.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        cleaned
    }
}

/// `<SanitizedTitle>_<YYYYMMDD>_<HHMMSS>.mov`
pub fn suggested_file_name(title: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "{}_{}.mov",
        sanitize_title(title),
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// A finished preroll.
#[derive(Debug, Clone, Serialize)]
pub struct OutputArtifact {
    #[serde(skip)]
    pub bytes: Bytes,
    pub suggested_file_name: String,
    pub media_type: &'static str,
}

impl OutputArtifact {
    pub fn new(bytes: Bytes, suggested_file_name: String) -> Self {
        Self {
            bytes,
            suggested_file_name,
            media_type: MEDIA_TYPE,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the artifact into `dir` under its suggested name, creating the
    /// directory if needed. Returns the written path.
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            Error::Workspace(format!("cannot create {}: {e}", dir.display()))
        })?;
        let path = dir.join(&self.suggested_file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        tracing::info!("Wrote {} ({} bytes)", path.display(), self.len());
        Ok(path)
    }
}
