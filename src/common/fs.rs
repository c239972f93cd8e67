use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::Error;

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            anyhow::bail!("Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Error with [`Error::MissingFile`] unless a file exists at `path`.
pub(crate) fn require_file_exists(path: &Path, label: &'static str) -> Result<()> {
    if !path.is_file() {
        return Err(Error::MissingFile { label, path: path.to_path_buf() }.into());
    }
    Ok(())
}
