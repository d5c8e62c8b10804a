//! Working storage for engine operations.
//!
//! A [`Workspace`] owns a temporary directory. Operations address files in it
//! by plain file name only, mirroring the flat file system of an embedded
//! encoder; the directory is removed when the workspace is dropped.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use prerollforge_common::{Error, Result};
use tempfile::TempDir;

/// Temporary working directory addressed by plain file names.
///
/// # Example
///
/// ```no_run
/// use prerollforge_av::Workspace;
///
/// # async fn example() -> prerollforge_common::Result<()> {
/// let workspace = Workspace::new()?;
/// workspace.write("font.ttf", b"...").await?;
/// let font = workspace.read("font.ttf").await?;
/// assert_eq!(&font[..], b"...");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    /// Create a new workspace in the system temp directory.
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("prerollforge-")
            .tempdir()
            .map_err(|e| Error::Workspace(format!("failed to create temp dir: {e}")))?;

        Ok(Self { temp_dir })
    }

    /// Path to the temporary directory.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Resolve a file name to its path inside the workspace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Workspace`] if `name` is empty, contains a path
    /// separator, or is `.`/`..`.
    pub fn path_of(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.temp_dir.path().join(name))
    }

    /// Write (or overwrite) a file.
    pub async fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_of(name)?;
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    /// Read a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if the file does not exist.
    pub async fn read(&self, name: &str) -> Result<Bytes> {
        let path = self.path_of(name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::file_not_found(name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a file. Removing a missing file is not an error.
    pub async fn remove(&self, name: &str) -> Result<()> {
        let path = self.path_of(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Accept only plain file names.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if bad {
        return Err(Error::Workspace(format!(
            "invalid working storage name: {name:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_of_stays_inside_workspace() {
        let ws = Workspace::new().unwrap();
        let p = ws.path_of("intro.mkv").unwrap();
        assert!(p.starts_with(ws.temp_dir()));
        assert_eq!(p.file_name().unwrap(), "intro.mkv");
    }

    #[test]
    fn rejects_path_like_names() {
        let ws = Workspace::new().unwrap();
        for name in ["", ".", "..", "../escape.mov", "a/b.wav", "a\\b.wav"] {
            assert!(ws.path_of(name).is_err(), "accepted {name:?}");
        }
    }

    #[tokio::test]
    async fn write_read_remove() {
        let ws = Workspace::new().unwrap();
        ws.write("font.ttf", b"glyphs").await.unwrap();
        assert_eq!(ws.read("font.ttf").await.unwrap(), Bytes::from_static(b"glyphs"));

        ws.remove("font.ttf").await.unwrap();
        assert!(ws.read("font.ttf").await.is_err());
        // Second removal is a no-op.
        ws.remove("font.ttf").await.unwrap();
    }

    #[tokio::test]
    async fn read_missing_is_file_not_found() {
        let ws = Workspace::new().unwrap();
        let err = ws.read("missing.mov").await.unwrap_err();
        assert!(matches!(err, Error::FileNotFound { ref name } if name == "missing.mov"));
    }

    #[test]
    fn directory_removed_on_drop() {
        let ws = Workspace::new().unwrap();
        let dir = ws.temp_dir().to_path_buf();
        assert!(dir.exists());
        drop(ws);
        assert!(!dir.exists());
    }
}
