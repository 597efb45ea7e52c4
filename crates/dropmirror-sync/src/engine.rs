//! Shared-folder synchronizer
//!
//! The [`Synchronizer`] drives the whole run: authenticate, list the
//! shared folder, then walk the entries sequentially, skipping files whose
//! local content hash already matches and downloading the rest.
//!
//! ## Sync Flow
//!
//! 1. **Authenticate**: credential rejection aborts before any listing or
//!    filesystem write
//! 2. **Prepare**: create the save directory, list entries under the link
//! 3. **Per entry**: skip-check (existence, size fast-path, hash equality),
//!    otherwise download-verify-write with a fresh retry budget
//! 4. **Report**: counts of downloaded/skipped/failed plus failure reasons
//!
//! ## Retry Logic
//!
//! Transient errors (network, rate limiting, server errors, and content
//! hash mismatches after a download) are retried per entry with exponential
//! backoff. Non-transient entry errors fail the entry immediately. An
//! exhausted budget records the entry as failed and the run moves on: one
//! bad entry never aborts the rest of the folder.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use dropmirror_core::domain::credential::Credential;
use dropmirror_core::domain::errors::DomainError;
use dropmirror_core::domain::newtypes::{ContentHash, SharedLink};
use dropmirror_core::ports::local_store::ILocalStore;
use dropmirror_core::ports::shared_folder::{ISharedFolderProvider, ProviderError, RemoteEntry};

// ============================================================================
// SyncOptions
// ============================================================================

/// Tunables for a synchronizer run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Destination directory; created if missing
    pub save_dir: PathBuf,
    /// Maximum retries per entry after the first attempt
    pub retry_limit: u32,
    /// Base backoff delay; doubles per retry
    pub base_delay: Duration,
}

impl SyncOptions {
    /// Creates options with the default retry policy (3 retries, 1s base delay)
    #[must_use]
    pub fn new(save_dir: PathBuf) -> Self {
        Self {
            save_dir,
            retry_limit: 3,
            base_delay: Duration::from_secs(1),
        }
    }

    /// Overrides the retry limit
    #[must_use]
    pub fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    /// Overrides the base backoff delay
    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }
}

// ============================================================================
// SyncReport
// ============================================================================

/// One entry the run could not download
#[derive(Debug, Clone, Serialize)]
pub struct FailedEntry {
    /// Entry path relative to the shared-folder root
    pub path: String,
    /// Human-readable failure reason
    pub reason: String,
}

/// Summary of a completed synchronizer run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Files downloaded and verified this run
    pub downloaded: u32,
    /// Files already present with a matching content hash
    pub skipped: u32,
    /// Folder entries ignored (traversal is out of scope)
    pub folders_skipped: u32,
    /// Entries that failed after their retry budget was spent
    pub failed: Vec<FailedEntry>,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

impl SyncReport {
    /// True if every file entry was downloaded or skipped
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

// ============================================================================
// SyncError
// ============================================================================

/// Fatal setup errors: nothing was attempted beyond the failing step
///
/// Entry-level failures never surface here; they are recorded in the
/// [`SyncReport`] and the run continues.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Credential rejected before any listing or download
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Shared link malformed, expired, or inaccessible
    #[error("Shared link rejected: {0}")]
    Link(String),

    /// Save directory could not be created or used
    #[error("Save directory unavailable: {0}")]
    SaveDir(String),
}

// ============================================================================
// Path resolution
// ============================================================================

/// Resolves an entry's relative path under the save directory
///
/// Rejects empty segments, `.`/`..` components, and backslashes so a
/// hostile listing can never escape the save directory.
fn resolve_entry_path(save_dir: &Path, entry_path: &str) -> Result<PathBuf, DomainError> {
    if entry_path.is_empty() {
        return Err(DomainError::InvalidEntryPath("empty path".to_string()));
    }

    let mut resolved = save_dir.to_path_buf();
    for segment in entry_path.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
            return Err(DomainError::InvalidEntryPath(entry_path.to_string()));
        }
        resolved.push(segment);
    }

    Ok(resolved)
}

// ============================================================================
// Synchronizer
// ============================================================================

/// Outcome of processing a single listed entry
enum EntryOutcome {
    Downloaded,
    Skipped,
    SkippedFolder,
    Failed(String),
}

/// Sequential shared-folder synchronizer
///
/// ## Dependencies
///
/// - `provider`: remote operations (authenticate, list, fetch)
/// - `store`: local file I/O and hashing
pub struct Synchronizer {
    /// Shared-folder provider (Dropbox in production)
    provider: Arc<dyn ISharedFolderProvider>,
    /// Local filesystem operations
    store: Arc<dyn ILocalStore>,
    /// Run tunables
    options: SyncOptions,
}

impl Synchronizer {
    /// Creates a new `Synchronizer` with the given dependencies
    pub fn new(
        provider: Arc<dyn ISharedFolderProvider>,
        store: Arc<dyn ILocalStore>,
        options: SyncOptions,
    ) -> Self {
        Self {
            provider,
            store,
            options,
        }
    }

    /// Runs a full synchronization of the shared folder
    ///
    /// # Errors
    /// Returns a [`SyncError`] only for fatal setup failures (credential,
    /// link, save directory). Per-entry failures are recorded in the
    /// returned [`SyncReport`].
    #[tracing::instrument(skip_all, fields(link = %link, save_dir = %self.options.save_dir.display()))]
    pub async fn run(
        &self,
        link: &SharedLink,
        credential: &Credential,
    ) -> Result<SyncReport, SyncError> {
        let start = std::time::Instant::now();
        let mut report = SyncReport::default();

        // Step 1: Authenticate. Nothing touches the filesystem before this
        // succeeds.
        info!(credential = credential.kind(), "Authenticating");
        self.with_retry("authenticate", || self.provider.authenticate(credential))
            .await
            .map_err(|e| SyncError::Auth(e.to_string()))?;

        // Step 2: Save directory.
        self.store
            .create_dir_all(&self.options.save_dir)
            .await
            .map_err(|e| SyncError::SaveDir(format!("{e:#}")))?;

        // Step 3: List entries under the shared link.
        let entries = self
            .with_retry("list_entries", || self.provider.list_entries(link))
            .await
            .map_err(|e| match e {
                ProviderError::Auth(msg) => SyncError::Auth(msg),
                other => SyncError::Link(other.to_string()),
            })?;

        info!(entries = entries.len(), "Listing complete");

        // Step 4: Sequential per-entry loop.
        for (idx, entry) in entries.iter().enumerate() {
            debug!(
                entry = %entry.path,
                progress = format!("{}/{}", idx + 1, entries.len()),
                "Processing entry"
            );

            match self.process_entry(link, entry).await {
                EntryOutcome::Downloaded => report.downloaded += 1,
                EntryOutcome::Skipped => report.skipped += 1,
                EntryOutcome::SkippedFolder => report.folders_skipped += 1,
                EntryOutcome::Failed(reason) => {
                    error!(entry = %entry.path, %reason, "Entry failed");
                    report.failed.push(FailedEntry {
                        path: entry.path.clone(),
                        reason,
                    });
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            downloaded = report.downloaded,
            skipped = report.skipped,
            failed = report.failed.len(),
            duration_ms = report.duration_ms,
            "Run complete"
        );

        Ok(report)
    }

    /// Processes one listed entry: skip, download, or record a failure
    async fn process_entry(&self, link: &SharedLink, entry: &RemoteEntry) -> EntryOutcome {
        if entry.is_folder {
            warn!(entry = %entry.path, "Skipping folder (recursive download not supported)");
            return EntryOutcome::SkippedFolder;
        }

        let dest = match resolve_entry_path(&self.options.save_dir, &entry.path) {
            Ok(p) => p,
            Err(e) => return EntryOutcome::Failed(e.to_string()),
        };

        let Some(expected) = entry.content_hash.as_ref() else {
            return EntryOutcome::Failed("listing reported no content hash".to_string());
        };

        if self.is_intact(&dest, entry, expected).await {
            info!(entry = %entry.path, "Skipping (already downloaded)");
            return EntryOutcome::Skipped;
        }

        match self
            .with_retry(&entry.path, || {
                self.download_entry_once(link, entry, expected, &dest)
            })
            .await
        {
            Ok(()) => {
                info!(entry = %entry.path, size = entry.size, "Downloaded");
                EntryOutcome::Downloaded
            }
            Err(err) => EntryOutcome::Failed(err.to_string()),
        }
    }

    /// Returns true if a local file at `dest` already matches the entry
    ///
    /// The size comparison is only a fast-path negative: a file of the
    /// wrong size cannot hash-match, so the hash computation is skipped.
    /// The skip decision itself is always hash equality.
    async fn is_intact(&self, dest: &Path, entry: &RemoteEntry, expected: &ContentHash) -> bool {
        let state = match self.store.state(dest).await {
            Ok(s) => s,
            Err(e) => {
                debug!(dest = %dest.display(), error = %e, "State check failed, will download");
                return false;
            }
        };

        if !state.is_regular_file() || state.size != entry.size {
            return false;
        }

        match self.store.compute_hash(dest).await {
            Ok(local) => local == *expected,
            Err(e) => {
                warn!(dest = %dest.display(), error = %e, "Local hash failed, will download");
                false
            }
        }
    }

    /// One download attempt: fetch, write atomically, verify
    ///
    /// A hash mismatch is reported as transient so the retry budget covers
    /// it; the mismatched file stays on disk and is simply overwritten by
    /// the next attempt's rename.
    async fn download_entry_once(
        &self,
        link: &SharedLink,
        entry: &RemoteEntry,
        expected: &ContentHash,
        dest: &Path,
    ) -> Result<(), ProviderError> {
        let data = self.provider.fetch_content(link, &entry.path).await?;

        self.store
            .write_file(dest, &data)
            .await
            .map_err(|e| ProviderError::Transient(format!("local write failed: {e:#}")))?;

        let local = self
            .store
            .compute_hash(dest)
            .await
            .map_err(|e| ProviderError::Transient(format!("local hash failed: {e:#}")))?;

        if local != *expected {
            return Err(ProviderError::Transient(format!(
                "content hash mismatch: expected {expected}, got {local}"
            )));
        }

        Ok(())
    }

    /// Executes an operation with bounded exponential-backoff retry
    ///
    /// Only [`ProviderError::Transient`] is retried; everything else is
    /// returned immediately. Backoff doubles per attempt from the
    /// configured base delay.
    async fn with_retry<F, Fut, T>(&self, operation: &str, f: F) -> Result<T, ProviderError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, ProviderError>>,
    {
        let mut last_error: Option<ProviderError> = None;

        for attempt in 0..=self.options.retry_limit {
            match f().await {
                Ok(value) => {
                    if attempt > 0 {
                        info!(operation, attempt, "Operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_transient() && attempt < self.options.retry_limit => {
                    let delay = self
                        .options
                        .base_delay
                        .saturating_mul(1u32 << attempt.min(10));
                    warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error
            .unwrap_or_else(|| ProviderError::Transient(format!("retries exhausted for {operation}"))))
    }
}

// ============================================================================
// Unit tests (path resolution)
// ============================================================================
