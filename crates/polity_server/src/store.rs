//! Persistence of country records.
//!
//! The engine never persists anything itself; the server hands each
//! accepted mutation's snapshot to a [`SelectionStore`]. Stores are
//! opaque: the service does not care whether records end up in memory or
//! on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use polity_core::domain::CountryId;
use polity_core::persistence::PersistedCountry;

use crate::config::RecordFormat;
use crate::error::StoreError;

/// Async record store.
#[async_trait::async_trait]
pub trait SelectionStore: Send + Sync {
    /// Insert or replace a country's record.
    async fn save(&self, record: PersistedCountry) -> Result<(), StoreError>;

    /// Load every stored record, in country order.
    async fn load_all(&self) -> Result<Vec<PersistedCountry>, StoreError>;

    /// Delete a country's record. Deleting a missing record succeeds.
    async fn delete(&self, country: &CountryId) -> Result<(), StoreError>;
}

/// Store that keeps encoded records in memory.
///
/// Records are held as bincode bytes so that encoding problems surface
/// the same way they would on disk.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<BTreeMap<CountryId, Vec<u8>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Check if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl SelectionStore for InMemoryStore {
    async fn save(&self, record: PersistedCountry) -> Result<(), StoreError> {
        let bytes = record.to_bytes()?;
        self.records.write().await.insert(record.country, bytes);
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<PersistedCountry>, StoreError> {
        let records = self.records.read().await;
        records
            .values()
            .map(|bytes| PersistedCountry::from_bytes(bytes).map_err(StoreError::from))
            .collect()
    }

    async fn delete(&self, country: &CountryId) -> Result<(), StoreError> {
        self.records.write().await.remove(country);
        Ok(())
    }
}

/// Distinguishes temporary files of overlapping writes.
static TMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Store that writes one file per country into a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    format: RecordFormat,
}

impl FileStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>, format: RecordFormat) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| io_error(&dir, source))?;
        Ok(Self { dir, format })
    }

    /// Directory the store writes into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for a country.
    ///
    /// IDs made only of ASCII letters, digits, `-` and `_` are used as is
    /// (`c-` prefix); anything else is hex-encoded (`x-` prefix).
    #[must_use]
    pub fn path_for(&self, country: &CountryId) -> PathBuf {
        let id = country.as_str();
        let stem = if !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            format!("c-{id}")
        } else {
            let hex: String = id.bytes().map(|b| format!("{b:02x}")).collect();
            format!("x-{hex}")
        };
        self.dir
            .join(format!("{stem}.{}", self.format.extension()))
    }

    fn encode(&self, record: &PersistedCountry) -> Result<Vec<u8>, StoreError> {
        Ok(match self.format {
            RecordFormat::Bincode => record.to_bytes()?,
            RecordFormat::Ron => record.to_ron()?.into_bytes(),
        })
    }

    fn decode(&self, bytes: &[u8], path: &Path) -> Result<PersistedCountry, StoreError> {
        Ok(match self.format {
            RecordFormat::Bincode => PersistedCountry::from_bytes(bytes)?,
            RecordFormat::Ron => {
                let text = std::str::from_utf8(bytes).map_err(|e| {
                    io_error(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
                })?;
                PersistedCountry::from_ron(text)?
            }
        })
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait::async_trait]
impl SelectionStore for FileStore {
    async fn save(&self, record: PersistedCountry) -> Result<(), StoreError> {
        let path = self.path_for(&record.country);
        let bytes = self.encode(&record)?;

        // Write then rename so readers never see a partial record.
        let tmp = path.with_extension(format!(
            "{}.{}-{}.tmp",
            self.format.extension(),
            record.state.revision,
            TMP_SEQUENCE.fetch_add(1, Ordering::Relaxed)
        ));
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|source| io_error(&tmp, source))?;
        if let Err(source) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(&path, source));
        }

        tracing::trace!(country = %record.country, path = %path.display(), "Saved record");
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<PersistedCountry>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|source| io_error(&self.dir, source))?;

        let mut records = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| io_error(&self.dir, source))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.format.extension()) {
                continue;
            }
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|source| io_error(&path, source))?;
            records.push(self.decode(&bytes, &path)?);
        }

        records.sort_by(|a, b| a.country.cmp(&b.country));
        Ok(records)
    }

    async fn delete(&self, country: &CountryId) -> Result<(), StoreError> {
        let path = self.path_for(country);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(io_error(&path, source)),
        }
    }
}
