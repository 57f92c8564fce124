use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{error, info};

use crate::core::Snapshot;
use crate::errors::{Error, Result};

pub trait Gateway {
    fn save(&self, username: &str, document: &Snapshot)
    -> impl Future<Output = Result<()>> + Send;

    /// Fails with [`Error::NotFound`] when nothing was saved for `username`.
    fn load(&self, username: &str) -> impl Future<Output = Result<Snapshot>> + Send;
}

/// Keeps only `[A-Za-z0-9_-]`, so the name is safe as a file or object name.
pub fn sanitize_username(username: &str) -> String {
    username
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, username: &str) -> Result<PathBuf> {
        let name = sanitize_username(username);
        if name.is_empty() {
            return Err(Error::validation("username is required"));
        }
        Ok(self.dir.join(format!("{name}.json")))
    }

    pub async fn save_document(&self, username: &str, document: &Snapshot) -> Result<()> {
        let path = self.path_for(username)?;
        let body = serde_json::to_vec_pretty(document)?;
        fs::create_dir_all(&self.dir).await.inspect_err(|e| {
            error!(dir = %self.dir.display(), error = %e, "failed to create save directory")
        })?;
        fs::write(&path, body).await.inspect_err(|e| {
            error!(path = %path.display(), error = %e, "failed to write document")
        })?;
        info!(path = %path.display(), "document saved");
        Ok(())
    }

    pub async fn load_raw(&self, username: &str) -> Result<String> {
        let path = self.path_for(username)?;
        match fs::read_to_string(&path).await {
            Ok(raw) => Ok(raw),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::not_found(format!(
                "no data saved for user {}",
                sanitize_username(username)
            ))),
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to read document");
                Err(e.into())
            }
        }
    }
}

impl Gateway for FileStore {
    async fn save(&self, username: &str, document: &Snapshot) -> Result<()> {
        self.save_document(username, document).await
    }

    async fn load(&self, username: &str) -> Result<Snapshot> {
        let raw = self.load_raw(username).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}
