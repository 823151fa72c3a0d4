use std::path::PathBuf;
use std::sync::Arc;

use crate::models::error::RecorderError;
use crate::models::tags::{TagTuple, TAG_SEPARATOR};
use crate::traits::filesystem::{Filesystem, LocalFilesystem};

/// Extension of every take written by the recorder.
pub const TAKE_EXTENSION: &str = "wav";

/// Derives collision-free take paths from a tag tuple.
///
/// Names follow `{tag1}_{tag2}_..._{tagN}_{suffix}.wav`. The suffix always
/// starts at 1; there is no un-suffixed base file.
#[derive(Clone)]
pub struct FileNamer {
    directory: PathBuf,
    fs: Arc<dyn Filesystem>,
}

impl FileNamer {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::with_filesystem(directory, Arc::new(LocalFilesystem))
    }

    pub fn with_filesystem(directory: impl Into<PathBuf>, fs: Arc<dyn Filesystem>) -> Self {
        Self {
            directory: directory.into(),
            fs,
        }
    }

    /// Lowest free path for `tags`, probing suffixes 1, 2, 3, …
    ///
    /// Gaps are filled: with suffixes {1, 2, 4} on disk the result is 3.
    pub fn next_path(&self, tags: &TagTuple) -> Result<PathBuf, RecorderError> {
        self.fs.ensure_directory(&self.directory).map_err(|e| {
            RecorderError::StorageError(format!(
                "failed to create {}: {}",
                self.directory.display(),
                e
            ))
        })?;

        let base = tags.base_name();
        let mut suffix: u32 = 1;
        loop {
            let candidate = self.directory.join(Self::file_name(&base, suffix));
            if !self.fs.path_exists(&candidate) {
                return Ok(candidate);
            }
            suffix = suffix
                .checked_add(1)
                .ok_or_else(|| RecorderError::StorageError(format!("no free suffix for {}", base)))?;
        }
    }

    /// Number of takes on disk whose name starts with `tags`' base name.
    ///
    /// Informational only. Matching is by prefix, so a tag value containing
    /// `_` can make takes of a different tuple count here too.
    pub fn count_existing(&self, tags: &TagTuple) -> usize {
        let prefix = format!("{}{}", tags.base_name(), TAG_SEPARATOR);
        let extension = format!(".{}", TAKE_EXTENSION);

        match self.fs.list_directory(&self.directory) {
            Ok(names) => names
                .iter()
                .filter(|name| name.starts_with(&prefix) && name.ends_with(&extension))
                .count(),
            Err(e) => {
                log::debug!("Cannot list {}: {}", self.directory.display(), e);
                0
            }
        }
    }

    fn file_name(base: &str, suffix: u32) -> String {
        format!("{}{}{}.{}", base, TAG_SEPARATOR, suffix, TAKE_EXTENSION)
    }
}
