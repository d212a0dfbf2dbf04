use std::path::{Path, PathBuf};

use anyhow::Context as _;
use uuid::Uuid;

use crate::domain::repository::ImageStore;
use crate::domain::types::UploadedFile;
use crate::error::StoreError;

/// URL prefix stored files are served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Largest accepted upload (5 MB).
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

const ALLOWED_CONTENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/jpg",
    "image/gif",
    "image/webp",
];

/// Image files on the local filesystem, named `{uuid}{ext}` under `root`.
#[derive(Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    /// Create the upload directory if it is missing.
    pub async fn init(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("create upload dir {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Reject empty, non-image and oversized uploads.
pub fn validate_image(file: &UploadedFile) -> Result<(), StoreError> {
    if file.bytes.is_empty() {
        return Err(StoreError::InvalidRequest("File is empty".into()));
    }
    let allowed = file
        .content_type
        .as_deref()
        .is_some_and(|ct| ALLOWED_CONTENT_TYPES.contains(&ct.to_ascii_lowercase().as_str()));
    if !allowed {
        return Err(StoreError::InvalidRequest(
            "Invalid file type. Only images are allowed.".into(),
        ));
    }
    if file.bytes.len() > MAX_FILE_SIZE {
        return Err(StoreError::InvalidRequest(
            "File size too large. Maximum size is 5MB.".into(),
        ));
    }
    Ok(())
}

/// Lower-cased extension of the original name including the dot; `.jpg` if absent.
pub fn extension_of(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| ".jpg".to_owned())
}

/// File name component of a public path (text after the last `/`).
fn stored_name(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next()?;
    if name.is_empty() || name == ".." || name == "." {
        None
    } else {
        Some(name)
    }
}

impl ImageStore for LocalFileStorage {
    async fn store(&self, file: &UploadedFile) -> Result<String, StoreError> {
        validate_image(file)?;
        let name = format!(
            "{}{}",
            Uuid::new_v4(),
            extension_of(file.file_name.as_deref())
        );
        let target = self.root.join(&name);
        tokio::fs::write(&target, &file.bytes)
            .await
            .with_context(|| format!("write upload {}", target.display()))?;
        tracing::info!(file = %name, size = file.bytes.len(), "image stored");
        Ok(format!("{PUBLIC_PREFIX}/{name}"))
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let Some(name) = stored_name(path) else {
            return Ok(());
        };
        let target = self.root.join(name);
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                tracing::info!(file = %name, "image deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("delete upload {}", target.display()))
                .into()),
        }
    }
}
