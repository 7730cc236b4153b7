//! One JSON document on disk, guarded by an async lock.
//!
//! Reads treat a missing or blank file as the default document. Writes go to a temporary file
//! that is renamed over the target, so a crash mid-write never leaves a truncated file.

use dioxus_logger::tracing;
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::AppError;

/// Handle to a JSON file holding a `T`. Clones share the same lock.
pub struct JsonFile<T> {
    path: Arc<PathBuf>,
    lock: Arc<Mutex<()>>,
    _document: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonFile<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            lock: self.lock.clone(),
            _document: PhantomData,
        }
    }
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            lock: Arc::new(Mutex::new(())),
            _document: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the default document unless the file already exists.
    pub async fn ensure(&self) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;

        if tokio::fs::try_exists(self.path.as_path()).await? {
            return Ok(());
        }

        tracing::info!("Creating {}", self.path.display());
        self.write(&T::default()).await
    }

    pub async fn load(&self) -> Result<T, AppError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    /// Runs `mutate` against the current document and saves the result.
    ///
    /// The lock is held for the whole sequence. When `mutate` fails nothing is written.
    ///
    /// # Returns
    /// - `Ok(R)` - Value produced by `mutate`, after the document was saved
    /// - `Err(AppError)` - Load, mutation or save failed
    pub async fn update<R, F>(&self, mutate: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut T) -> Result<R, AppError>,
    {
        let _guard = self.lock.lock().await;

        let mut document = self.read().await?;
        let value = mutate(&mut document)?;
        self.write(&document).await?;

        Ok(value)
    }

    async fn read(&self) -> Result<T, AppError> {
        match tokio::fs::read_to_string(self.path.as_path()).await {
            Ok(raw) if raw.trim().is_empty() => Ok(T::default()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, document: &T) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(document)?;
        let tmp_path = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, self.path.as_path()).await?;

        Ok(())
    }
}
