//! Storage backend selection.

use crate::config::{CloudConfig, FilesConfig};
use crate::{Result, ShareError};

use super::cloud::{CloudAsset, CloudStorage};
use super::record::{FileRecord, StorageKind};
use super::storage::{remove_path, LocalStorage};

/// Result of storing an upload.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Stored filename (local) or asset public id (cloud).
    pub filename: String,
    /// Local path or asset URL.
    pub path: String,
    /// Asset details when stored remotely.
    pub cloud: Option<CloudAsset>,
}

/// The storage backend uploads are written to.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// Local disk.
    Local(LocalStorage),
    /// Remote asset host.
    Cloud(CloudStorage),
}

impl StorageBackend {
    /// Build the backend named by `files.backend`.
    pub fn from_config(files: &FilesConfig, cloud: &CloudConfig) -> Result<Self> {
        match files.backend.as_str() {
            "local" => Ok(Self::Local(LocalStorage::new(&files.storage_path)?)),
            "cloud" => Ok(Self::Cloud(CloudStorage::new(cloud)?)),
            other => Err(ShareError::Config(format!(
                "unknown storage backend '{other}'"
            ))),
        }
    }

    /// Which kind of storage this is.
    pub fn kind(&self) -> StorageKind {
        match self {
            Self::Local(_) => StorageKind::Local,
            Self::Cloud(_) => StorageKind::Cloud,
        }
    }

    /// Local storage, if that is the active backend.
    pub fn local(&self) -> Option<&LocalStorage> {
        match self {
            Self::Local(storage) => Some(storage),
            Self::Cloud(_) => None,
        }
    }

    /// Store upload content.
    pub async fn store(
        &self,
        content: &[u8],
        original_name: &str,
        content_type: &str,
    ) -> Result<StoredFile> {
        match self {
            Self::Local(storage) => {
                let stored_name = storage.save(content, original_name).await?;
                let path = storage.path_of(&stored_name).to_string_lossy().into_owned();
                Ok(StoredFile {
                    filename: stored_name,
                    path,
                    cloud: None,
                })
            }
            Self::Cloud(storage) => {
                let asset = storage.upload(content, original_name, content_type).await?;
                Ok(StoredFile {
                    filename: asset.public_id.clone(),
                    path: asset.secure_url.clone(),
                    cloud: Some(asset),
                })
            }
        }
    }

    /// Undo a `store` whose record could not be saved.
    pub async fn discard(&self, stored: &StoredFile) -> Result<bool> {
        match (self, &stored.cloud) {
            (Self::Cloud(storage), Some(asset)) => {
                storage.destroy(&asset.public_id, &asset.resource_type).await
            }
            _ => remove_path(std::path::Path::new(&stored.path)).await,
        }
    }

    /// Remove the stored bytes of a record.
    ///
    /// Local records are removed by path regardless of the active backend.
    /// Cloud records need the cloud backend to be active.
    ///
    /// # Returns
    ///
    /// `true` if something was removed, `false` if it was already gone.
    pub async fn remove(&self, record: &FileRecord) -> Result<bool> {
        match record.storage_kind() {
            StorageKind::Local => remove_path(std::path::Path::new(&record.path)).await,
            StorageKind::Cloud => {
                let Self::Cloud(storage) = self else {
                    return Err(ShareError::Storage(
                        "record is stored on the asset host but cloud storage is not configured"
                            .to_string(),
                    ));
                };
                let public_id = record.cloud_public_id.as_deref().unwrap_or(&record.filename);
                let resource_type = record.cloud_resource_type.as_deref().unwrap_or("image");
                storage.destroy(public_id, resource_type).await
            }
        }
    }
}
