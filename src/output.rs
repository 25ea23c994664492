//! Writing watch descriptors to the output directory.

use crate::error::{Error, Result};
use crate::watched::WatchEntry;
use std::path::PathBuf;

/// Writes descriptors as pretty-printed JSON into a flat directory.
#[derive(Debug, Clone)]
pub struct DescriptorWriter {
    output_dir: PathBuf,
}

impl DescriptorWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write `entry`, replacing any file of the same name.
    ///
    /// The directory is created on every call so it may be removed while
    /// the relay is running.
    pub async fn write(&self, entry: &WatchEntry) -> Result<PathBuf> {
        validate_file_name(&entry.file_name)?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| Error::io(&self.output_dir, e))?;

        let json = serde_json::to_vec_pretty(&entry.descriptor)?;
        let path = self.output_dir.join(&entry.file_name);

        tokio::fs::write(&path, json)
            .await
            .map_err(|e| Error::io(&path, e))?;

        Ok(path)
    }
}

/// Titles come from webhook data; keep the result inside the output directory.
fn validate_file_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if invalid {
        return Err(Error::InvalidFileName(name.to_string()));
    }
    Ok(())
}
