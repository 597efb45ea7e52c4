//! Local store adapter (secondary/driven adapter)
//!
//! Implements [`ILocalStore`] using `tokio::fs` for async file operations.
//!
//! ## Design Decisions
//!
//! - **Atomic writes**: write-to-temp + rename in the same directory, so a
//!   crash mid-write leaves either the old complete file or the new
//!   complete file, never a truncated one. A truncated file would be
//!   caught by the integrity check anyway, but it would also force a
//!   pointless re-download on the next run.
//! - **Streaming hashing**: the content hash is computed from a bounded
//!   read buffer, so large files never need to fit in memory.

use std::io::ErrorKind;
use std::path::Path;

use dropmirror_core::{
    domain::newtypes::ContentHash,
    ports::local_store::{ILocalStore, LocalFileState},
};
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument};

use crate::hasher::BlockContentHasher;

/// Read buffer size for hash computation
const HASH_READ_BUF: usize = 64 * 1024;

/// Adapter that bridges the [`ILocalStore`] port to the real filesystem.
///
/// Zero-sized: all operations derive their context from the path
/// arguments. The save directory lives at a higher layer.
#[derive(Debug, Clone, Default)]
pub struct LocalStoreAdapter;

impl LocalStoreAdapter {
    /// Create a new `LocalStoreAdapter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ILocalStore for LocalStoreAdapter {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn state(&self, path: &Path) -> anyhow::Result<LocalFileState> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("path not found");
                return Ok(LocalFileState::not_found());
            }
            Err(e) => return Err(e.into()),
        };

        let state = LocalFileState {
            exists: true,
            is_file: metadata.is_file(),
            size: metadata.len(),
        };
        debug!(is_file = state.is_file, size = state.size, "state retrieved");
        Ok(state)
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn compute_hash(&self, path: &Path) -> anyhow::Result<ContentHash> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut hasher = BlockContentHasher::new();
        let mut buf = vec![0u8; HASH_READ_BUF];

        loop {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        let hash = hasher.finalize();
        debug!(hash = %hash, "hash computed");
        Ok(hash)
    }

    #[instrument(skip(self, data), fields(path = %path.display(), bytes = data.len()))]
    async fn write_file(&self, path: &Path, data: &[u8]) -> anyhow::Result<()> {
        // Ensure parent directory exists.
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write to a temporary file in the same directory so rename is
        // atomic (same filesystem).
        let tmp_path = {
            let mut p = path.as_os_str().to_owned();
            p.push(".dropmirror-tmp");
            std::path::PathBuf::from(p)
        };

        debug!(?tmp_path, "writing to temporary file");
        tokio::fs::write(&tmp_path, data).await?;

        debug!("renaming temporary file to target");
        tokio::fs::rename(&tmp_path, path).await?;

        debug!("write complete");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn create_dir_all(&self, path: &Path) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(path).await?;
        debug!("directory created");
        Ok(())
    }
}

// ============================================================================
// Unit tests
// ============================================================================

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_write_then_state_and_hash() {
        let dir = TempDir::new().unwrap();
        let store = LocalStoreAdapter::new();
        let path = dir.path().join("hello.txt");

        let content = b"Hello, dropmirror!";
        store.write_file(&path, content).await.unwrap();

        let state = store.state(&path).await.unwrap();
        assert!(state.is_regular_file());
        assert_eq!(state.size, content.len() as u64);

        let hash = store.compute_hash(&path).await.unwrap();
        assert_eq!(hash, BlockContentHasher::hash_bytes(content));
    }

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = LocalStoreAdapter::new();
        let path = dir.path().join("a/b/c/nested.txt");

        store.write_file(&path, b"nested content").await.unwrap();

        let state = store.state(&path).await.unwrap();
        assert!(state.is_regular_file());
    }

    #[tokio::test]
    async fn test_write_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        let store = LocalStoreAdapter::new();
        let path = dir.path().join("overwrite.txt");

        store.write_file(&path, b"first").await.unwrap();
        store.write_file(&path, b"second").await.unwrap();

        let read_back = tokio::fs::read(&path).await.unwrap();
        assert_eq!(read_back, b"second");
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = LocalStoreAdapter::new();
        let path = dir.path().join("clean.txt");

        store.write_file(&path, b"data").await.unwrap();

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["clean.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_state_not_found() {
        let dir = TempDir::new().unwrap();
        let store = LocalStoreAdapter::new();

        let state = store.state(&dir.path().join("missing.txt")).await.unwrap();
        assert!(!state.exists);
        assert_eq!(state.size, 0);
    }

    #[tokio::test]
    async fn test_state_directory_is_not_regular_file() {
        let dir = TempDir::new().unwrap();
        let store = LocalStoreAdapter::new();
        let sub = dir.path().join("subdir");

        store.create_dir_all(&sub).await.unwrap();

        let state = store.state(&sub).await.unwrap();
        assert!(state.exists);
        assert!(!state.is_regular_file());
    }

    #[tokio::test]
    async fn test_compute_hash_missing_file_errors() {
        let dir = TempDir::new().unwrap();
        let store = LocalStoreAdapter::new();

        let result = store.compute_hash(&dir.path().join("missing.txt")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_compute_hash_streams_consistently() {
        let dir = TempDir::new().unwrap();
        let store = LocalStoreAdapter::new();
        let path = dir.path().join("big.bin");

        // Larger than the read buffer so the loop runs more than once.
        let content: Vec<u8> = (0..200_000u32).map(|i| (i % 256) as u8).collect();
        store.write_file(&path, &content).await.unwrap();

        let hash = store.compute_hash(&path).await.unwrap();
        assert_eq!(hash, BlockContentHasher::hash_bytes(&content));
    }
}
