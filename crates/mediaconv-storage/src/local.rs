use crate::error::{StorageError, StorageResult};
use crate::naming;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;

/// One of the two storage directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageArea {
    Incoming,
    Converted,
}

impl StorageArea {
    /// URL prefix under which the static file server exposes this area.
    pub fn url_prefix(self) -> &'static str {
        match self {
            StorageArea::Incoming => "/uploads",
            StorageArea::Converted => "/converted",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StorageArea::Incoming => "incoming",
            StorageArea::Converted => "converted",
        }
    }
}

/// Local filesystem storage with an incoming and a converted directory
#[derive(Debug, Clone)]
pub struct LocalStorage {
    incoming_dir: PathBuf,
    converted_dir: PathBuf,
}

impl LocalStorage {
    /// Create both directories (if needed) and return a storage rooted at them.
    ///
    /// The directories are canonicalized so that later containment checks compare
    /// absolute paths.
    pub async fn new(
        incoming_dir: impl Into<PathBuf>,
        converted_dir: impl Into<PathBuf>,
    ) -> StorageResult<Self> {
        let incoming_dir = prepare_dir(incoming_dir.into()).await?;
        let converted_dir = prepare_dir(converted_dir.into()).await?;

        if incoming_dir == converted_dir {
            return Err(StorageError::ConfigError(format!(
                "Incoming and converted directories must differ: {}",
                incoming_dir.display()
            )));
        }

        tracing::info!(
            incoming_dir = %incoming_dir.display(),
            converted_dir = %converted_dir.display(),
            "Local storage initialized"
        );

        Ok(LocalStorage {
            incoming_dir,
            converted_dir,
        })
    }

    pub fn dir(&self, area: StorageArea) -> &Path {
        match area {
            StorageArea::Incoming => &self.incoming_dir,
            StorageArea::Converted => &self.converted_dir,
        }
    }

    /// Resolve a stored file name to its path, rejecting anything that is not a single
    /// plain path component.
    pub fn resolve(&self, area: StorageArea, name: &str) -> StorageResult<PathBuf> {
        validate_name(name)?;
        let path = self.dir(area).join(name);
        if path.parent() != Some(self.dir(area)) {
            return Err(StorageError::InvalidName(
                "File name resolves outside storage directory".to_string(),
            ));
        }
        Ok(path)
    }

    /// Public URL path of a stored file (`/converted/<name>`).
    pub fn public_path(area: StorageArea, name: &str) -> String {
        format!("{}/{}", area.url_prefix(), name)
    }

    /// Create a new, empty incoming file for an upload.
    ///
    /// Returns the generated name, the path and the open file handle.
    pub async fn create_incoming(
        &self,
        original_filename: &str,
    ) -> StorageResult<(String, PathBuf, fs::File)> {
        let name = naming::incoming_name(original_filename);
        let (path, file) = self.create_new(StorageArea::Incoming, &name).await?;
        Ok((name, path, file))
    }

    /// Reserve a path for a conversion output. The file itself is written by the converter.
    pub fn reserve_converted(&self, format: &str) -> StorageResult<(String, PathBuf)> {
        let name = naming::converted_name(format);
        let path = self.resolve(StorageArea::Converted, &name)?;
        Ok((name, path))
    }

    async fn create_new(&self, area: StorageArea, name: &str) -> StorageResult<(PathBuf, fs::File)> {
        let path = self.resolve(area, name)?;
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                StorageError::WriteFailed(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e
                ))
            })?;
        Ok((path, file))
    }

    /// Delete a stored file. Deleting a missing file is not an error.
    pub async fn delete(&self, area: StorageArea, name: &str) -> StorageResult<()> {
        let path = self.resolve(area, name)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(area = area.as_str(), name = %name, "Deleted stored file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Best-effort delete: failures are logged at warn and swallowed.
    pub async fn discard(&self, area: StorageArea, name: &str) {
        if let Err(e) = self.delete(area, name).await {
            tracing::warn!(area = area.as_str(), name = %name, error = %e, "Failed to clean up file");
        }
    }

    /// Size in bytes of a stored file.
    pub async fn size(&self, area: StorageArea, name: &str) -> StorageResult<u64> {
        let path = self.resolve(area, name)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Names of regular files in `area` last modified more than `max_age` ago.
    pub async fn list_older_than(
        &self,
        area: StorageArea,
        max_age: Duration,
    ) -> StorageResult<Vec<String>> {
        let now = SystemTime::now();
        let mut expired = Vec::new();
        let mut entries = fs::read_dir(self.dir(area)).await?;

        while let Some(entry) = entries.next_entry().await? {
            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                // Removed concurrently
                Err(_) => continue,
            };
            if !meta.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let age = meta
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or_default();
            if age > max_age {
                expired.push(name);
            }
        }

        Ok(expired)
    }
}

async fn prepare_dir(dir: PathBuf) -> StorageResult<PathBuf> {
    fs::create_dir_all(&dir).await.map_err(|e| {
        StorageError::ConfigError(format!(
            "Failed to create storage directory {}: {}",
            dir.display(),
            e
        ))
    })?;
    fs::canonicalize(&dir).await.map_err(|e| {
        StorageError::ConfigError(format!(
            "Failed to canonicalize storage directory {}: {}",
            dir.display(),
            e
        ))
    })
}

fn validate_name(name: &str) -> StorageResult<()> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(StorageError::InvalidName(
            "File name contains invalid characters".to_string(),
        ));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(StorageError::InvalidName(
            "File name must be a single path component".to_string(),
        )),
    }
}
