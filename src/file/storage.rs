//! Local disk storage for uploaded files.
//!
//! Files are written flat into the base directory under a timestamped name:
//! ```text
//! {base_path}/
//! ├── 1700000000000-report.pdf
//! ├── 1700000000123-photo.png
//! └── ...
//! ```

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::{Result, ShareError};

use super::MAX_FILENAME_LENGTH;

/// Number of alternative names tried when a stored name is already taken.
const MAX_NAME_ATTEMPTS: u32 = 16;

/// Local file storage.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    /// Base directory for file storage.
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Save content under a new timestamped name.
    ///
    /// # Returns
    ///
    /// The stored filename (`{unix_millis}-{sanitized original name}`).
    pub async fn save(&self, content: &[u8], original_name: &str) -> Result<String> {
        self.save_at(content, original_name, Utc::now().timestamp_millis())
            .await
    }

    async fn save_at(&self, content: &[u8], original_name: &str, millis: i64) -> Result<String> {
        let safe_name = sanitize_filename(original_name);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let stored_name = if attempt == 0 {
                format!("{millis}-{safe_name}")
            } else {
                format!("{millis}-{attempt}-{safe_name}")
            };

            let file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.path_of(&stored_name))
                .await;

            match file {
                Ok(mut file) => {
                    file.write_all(content).await?;
                    file.flush().await?;
                    return Ok(stored_name);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(ShareError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("could not allocate a unique name for {safe_name}"),
        )))
    }

    /// Open a stored file for streaming.
    ///
    /// # Returns
    ///
    /// The open file handle and its length in bytes.
    pub async fn open(&self, stored_name: &str) -> Result<(fs::File, u64)> {
        open_path(&self.path_of(stored_name)).await
    }

    /// Get the full file path for a stored name.
    pub fn path_of(&self, stored_name: &str) -> PathBuf {
        self.base_path.join(stored_name)
    }
}

/// Open a file by path, returning the handle and its length.
pub async fn open_path(path: &Path) -> Result<(fs::File, u64)> {
    match fs::File::open(path).await {
        Ok(file) => {
            let len = file.metadata().await?.len();
            Ok((file, len))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ShareError::NotFound(format!("File: {}", path.display())))
        }
        Err(e) => Err(e.into()),
    }
}

/// Remove a file by path. A missing file is not an error.
pub async fn remove_path(path: &Path) -> Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Make a client-supplied filename safe to use as a path component.
///
/// Keeps only the last path segment, replaces control characters with `_`
/// and caps the length. An empty result becomes "file".
pub fn sanitize_filename(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();

    let cleaned: String = last
        .chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .take(MAX_FILENAME_LENGTH)
        .collect();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "file".to_string()
    } else {
        cleaned
    }
}
