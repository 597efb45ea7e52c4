//! Local store port (driven/secondary port)
//!
//! This module defines the interface for the local filesystem side of the
//! mirror: existence/size snapshots, content hashing, and atomic writes.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because filesystem errors are adapter-specific
//!   and don't need domain-level classification; the synchronizer decides
//!   how a failed store operation affects the entry being processed.
//! - `write_file` is required to be atomic enough that a crash mid-write
//!   never leaves a file that would pass the integrity check with partial
//!   content (write to a temporary sibling, rename on completion).

use std::path::Path;

use crate::domain::newtypes::ContentHash;

// ============================================================================
// LocalFileState
// ============================================================================

/// Snapshot of a file's state on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFileState {
    /// Whether the path exists on disk
    pub exists: bool,
    /// Whether this is a regular file (false for directories and other types)
    pub is_file: bool,
    /// Size in bytes (0 for directories or non-existent paths)
    pub size: u64,
}

impl LocalFileState {
    /// Returns a state representing a non-existent path
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            exists: false,
            is_file: false,
            size: 0,
        }
    }

    /// Returns true if the path exists and is a regular file
    #[must_use]
    pub fn is_regular_file(&self) -> bool {
        self.exists && self.is_file
    }
}

// ============================================================================
// ILocalStore trait
// ============================================================================

/// Port trait for local filesystem operations
///
/// ## Implementation Notes
///
/// - `compute_hash` must produce the same block content hash the provider
///   reports, so local and remote content can be compared without
///   re-downloading.
/// - `state` never errors for missing paths; it returns
///   [`LocalFileState::not_found()`].
#[async_trait::async_trait]
pub trait ILocalStore: Send + Sync {
    /// Gets the current state of a path
    async fn state(&self, path: &Path) -> anyhow::Result<LocalFileState>;

    /// Computes the block content hash of a file's full byte content
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be read.
    async fn compute_hash(&self, path: &Path) -> anyhow::Result<ContentHash>;

    /// Writes data to a file atomically, creating parent directories
    ///
    /// Existing content is replaced in a single rename; observers never
    /// see a partially written file at `path`.
    async fn write_file(&self, path: &Path, data: &[u8]) -> anyhow::Result<()>;

    /// Creates a directory and all parent directories as needed
    async fn create_dir_all(&self, path: &Path) -> anyhow::Result<()>;
}
