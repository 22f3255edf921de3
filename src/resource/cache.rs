//! Persistent key→series store arbitrating fetch vs. reuse.

use crate::resource::error::{CacheError, ResourceDataError};
use crate::resource::fetcher::ResourceProvider;
use crate::resource::key::ResourceKey;
use crate::resource::parser::{parse_series, SiteSeries};
use log::{info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::{fs, task};

/// On-disk cache of raw provider payloads, one artifact per [`ResourceKey`].
///
/// The cache is authoritative once written: a present artifact is returned
/// verbatim with no revalidation and no provider contact, so each key is
/// fetched at most once for the lifetime of the cache directory. Nothing
/// ever invalidates an entry automatically; staleness handling, if it is
/// ever wanted, is a deliberate extension of this type.
pub struct ResourceCache<P> {
    cache_dir: PathBuf,
    provider: P,
}

impl<P: ResourceProvider> ResourceCache<P> {
    pub fn new(cache_dir: &Path, provider: P) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
            provider,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    #[cfg(test)]
    pub(crate) fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns the parsed series for `key`, fetching from the provider only
    /// when no artifact exists yet.
    ///
    /// On a miss the raw payload is persisted before any parsing, via a
    /// temporary file renamed into place, so a concurrent worker can never
    /// observe a partially written artifact.
    pub async fn get_or_fetch(&self, key: &ResourceKey) -> Result<SiteSeries, ResourceDataError> {
        let path = key.artifact_path(&self.cache_dir);

        if fs::metadata(&path).await.is_ok() {
            info!("cache hit for {key} at {}", path.display());
            let raw = fs::read(&path)
                .await
                .map_err(|e| CacheError::Read(path.clone(), e))?;
            return Ok(parse_series(&raw, key).await?);
        }

        warn!("cache miss for {key}, contacting provider");
        let raw = self.provider.fetch(key).await?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CacheError::DirCreation(parent.to_path_buf(), e))?;
            write_atomic(raw.clone(), parent.to_path_buf(), path.clone()).await?;
            info!("cached {} bytes for {key} at {}", raw.len(), path.display());
        }

        Ok(parse_series(&raw, key).await?)
    }
}

/// Writes `bytes` to `path` through a temp file in the same directory, so
/// the rename is atomic on the same filesystem.
async fn write_atomic(bytes: Vec<u8>, dir: PathBuf, path: PathBuf) -> Result<(), CacheError> {
    task::spawn_blocking(move || {
        let mut temp_file =
            NamedTempFile::new_in(&dir).map_err(|e| CacheError::TempFile(dir.clone(), e))?;
        temp_file
            .write_all(&bytes)
            .map_err(|e| CacheError::Write(path.clone(), e))?;
        temp_file
            .flush()
            .map_err(|e| CacheError::Write(path.clone(), e))?;
        temp_file
            .persist(&path)
            .map_err(|e| CacheError::Persist(path.clone(), e.error))?;
        Ok(())
    })
    .await
    .map_err(CacheError::TaskJoin)?
}
