//! Payload storage for uploaded files.
//!
//! Payloads live under a base directory, named by a fresh UUID and sharded
//! by the first two characters of that name:
//!
//! ```text
//! {base_path}/
//! ├── ab/
//! │   └── ab12cd34-5678-90ab-cdef-123456789012.pdf
//! └── cd/
//!     └── cd90ab12-3456-7890-abcd-ef1234567890.png
//! ```

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::Result;

use super::types::FileType;

/// Storage service for uploaded payloads.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage, creating the base directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Generate a new stored name for a payload of the given type.
    pub fn generate_stored_name(file_type: FileType) -> String {
        format!("{}.{}", Uuid::new_v4(), file_type.as_str())
    }

    /// Create (truncating) the file for `stored_name` and return it for
    /// incremental writes.
    pub async fn create(&self, stored_name: &str) -> Result<fs::File> {
        let file_path = self.get_file_path(stored_name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(fs::File::create(&file_path).await?)
    }

    /// Save a complete payload under a new stored name.
    pub async fn save(&self, content: &[u8], file_type: FileType) -> Result<String> {
        let stored_name = Self::generate_stored_name(file_type);
        let file_path = self.get_file_path(&stored_name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&file_path, content).await?;
        Ok(stored_name)
    }

    /// Delete a payload.
    ///
    /// Returns `false` if it did not exist.
    pub async fn delete(&self, stored_name: &str) -> Result<bool> {
        match fs::remove_file(self.get_file_path(stored_name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete several payloads, logging failures instead of returning them.
    ///
    /// Returns the number of payloads removed.
    pub async fn delete_all(&self, stored_names: &[String]) -> usize {
        let mut removed = 0;
        for name in stored_names {
            match self.delete(name).await {
                Ok(true) => removed += 1,
                Ok(false) => tracing::warn!("Stored payload already missing: {}", name),
                Err(e) => tracing::warn!("Failed to remove stored payload {}: {}", name, e),
            }
        }
        removed
    }

    /// Check if a payload exists.
    pub fn exists(&self, stored_name: &str) -> bool {
        self.get_file_path(stored_name).exists()
    }

    /// Full path for a stored name: `{base_path}/{shard}/{stored_name}`.
    pub fn get_file_path(&self, stored_name: &str) -> PathBuf {
        // Stored names never contain separators; strip anything that would
        // escape the base directory.
        let name = Path::new(stored_name)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("_");
        self.base_path.join(Self::get_shard(name)).join(name)
    }

    fn get_shard(stored_name: &str) -> &str {
        stored_name.get(..2).unwrap_or(stored_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (FileStorage, TempDir) {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("uploads")).unwrap();
        (storage, dir)
    }

    #[test]
    fn test_new_creates_directory() {
        let (storage, _dir) = setup();
        assert!(storage.base_path().is_dir());
    }

    #[test]
    fn test_generate_stored_name() {
        let name = FileStorage::generate_stored_name(FileType::Png);
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), 36 + 4);
        assert_ne!(name, FileStorage::generate_stored_name(FileType::Png));
    }

    #[test]
    fn test_sharded_path() {
        let (storage, _dir) = setup();
        let path = storage.get_file_path("ab12cd34.txt");
        assert!(path.ends_with("ab/ab12cd34.txt"));
    }

    #[test]
    fn test_path_cannot_escape_base() {
        let (storage, _dir) = setup();
        let path = storage.get_file_path("../../etc/passwd");
        assert!(path.starts_with(storage.base_path()));
        assert!(path.ends_with("pa/passwd"));
    }

    #[tokio::test]
    async fn test_save_and_delete() {
        let (storage, _dir) = setup();

        let name = storage.save(b"hello", FileType::Txt).await.unwrap();
        assert!(storage.exists(&name));
        assert_eq!(
            std::fs::read(storage.get_file_path(&name)).unwrap(),
            b"hello"
        );

        assert!(storage.delete(&name).await.unwrap());
        assert!(!storage.exists(&name));
        assert!(!storage.delete(&name).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_for_streaming() {
        use tokio::io::AsyncWriteExt;

        let (storage, _dir) = setup();
        let name = FileStorage::generate_stored_name(FileType::Pdf);

        let mut file = storage.create(&name).await.unwrap();
        file.write_all(b"part1").await.unwrap();
        file.write_all(b"part2").await.unwrap();
        file.flush().await.unwrap();

        assert_eq!(
            std::fs::read(storage.get_file_path(&name)).unwrap(),
            b"part1part2"
        );
    }

    #[tokio::test]
    async fn test_delete_all() {
        let (storage, _dir) = setup();

        let a = storage.save(b"a", FileType::Txt).await.unwrap();
        let b = storage.save(b"b", FileType::Txt).await.unwrap();

        let removed = storage
            .delete_all(&[a.clone(), b.clone(), "missing.txt".to_string()])
            .await;
        assert_eq!(removed, 2);
        assert!(!storage.exists(&a));
    }
}
