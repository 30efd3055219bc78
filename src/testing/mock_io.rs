//! Temporary files for file-backed parameter sources and sinks.

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A temporary file that is automatically deleted when dropped.
pub struct TempFilePath {
    #[allow(dead_code)]
    temp_file: NamedTempFile,
    path: PathBuf,
}

impl TempFilePath {
    /// Create a new temporary file with a specific extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn with_extension(extension: &str) -> std::io::Result<Self> {
        let temp_file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()?;
        let path = temp_file.path().to_path_buf();
        Ok(Self { temp_file, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write `lines` (newline-joined) to a fresh temp file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn temp_params_file(lines: &[&str]) -> std::io::Result<TempFilePath> {
    let tmp = TempFilePath::with_extension("txt")?;
    let mut f = std::fs::File::create(tmp.path())?;
    f.write_all(lines.join("\n").as_bytes())?;
    Ok(tmp)
}
