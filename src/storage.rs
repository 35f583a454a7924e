use std::path::PathBuf;

use rocket::tokio::fs;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::AppError;

/// On-disk photo storage. Uploads get a random file name; the relative path
/// handed back is treated as an opaque reference by everything else.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    root: PathBuf,
}

impl PhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_env() -> Self {
        let root = std::env::var("PHOTO_STORAGE_DIR").unwrap_or_else(|_| "storage/recipes".into());
        Self::new(root)
    }

    #[instrument(skip(self, bytes))]
    pub async fn store(&self, extension: &str, bytes: &[u8]) -> Result<String, AppError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create photo directory: {}", e)))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.root.join(&file_name);

        fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store photo: {}", e)))?;

        info!(path = %path.display(), "Stored photo");

        Ok(path.display().to_string())
    }
}
