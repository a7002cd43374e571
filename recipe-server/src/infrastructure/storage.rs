use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

/// Writes uploaded media below a root directory.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `relative` is a generated path such as `uploads/recipe/<uuid>.jpg`.
    pub async fn save(&self, relative: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let target = self.root.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, bytes).await?;
        info!(path = %target.display(), size = bytes.len(), "media file stored");
        Ok(target)
    }

    pub async fn remove(&self, relative: &str) -> std::io::Result<()> {
        match fs::remove_file(self.root.join(relative)).await {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}
