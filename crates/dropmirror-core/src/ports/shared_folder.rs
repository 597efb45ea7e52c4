//! Shared-folder provider port (driven/secondary port)
//!
//! This module defines the interface for the cloud-storage provider that
//! hosts the shared folder. The primary implementation targets Dropbox,
//! but the trait is deliberately narrow — authenticate, list, fetch — so
//! any provider exposing those operations plus a content-integrity
//! signature is substitutable.
//!
//! ## Design Notes
//!
//! - The port returns the typed [`ProviderError`] rather than an opaque
//!   error: the synchronizer's retry policy is keyed on the error class
//!   (fatal vs transient vs per-entry), so classification happens once,
//!   at the adapter boundary.
//! - `RemoteEntry` is a port-level DTO sourced fresh from the provider on
//!   every run; nothing here is persisted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::credential::Credential;
use crate::domain::newtypes::{AccessToken, ContentHash, SharedLink};

// ============================================================================
// ProviderError
// ============================================================================

/// Classified errors from the shared-folder provider
///
/// The variants map directly onto the synchronizer's handling policy:
/// `Auth` and `Link` abort the run before any download, `Transient` is
/// retried with backoff, `Entry` fails the current entry immediately.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Credential rejected (expired token, bad app key/secret pair)
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Shared link malformed, expired, or inaccessible to the credential
    #[error("Shared link rejected: {0}")]
    Link(String),

    /// Timeout, connection failure, rate limit, or server error
    #[error("Transient provider error: {0}")]
    Transient(String),

    /// Per-entry failure that retrying cannot fix (permission denied,
    /// entry vanished)
    #[error("Entry error: {0}")]
    Entry(String),
}

impl ProviderError {
    /// Returns true if the error is worth retrying with backoff
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}

// ============================================================================
// RemoteEntry
// ============================================================================

/// A single listing record from the shared folder
///
/// Immutable snapshot of one entry directly under the shared link.
/// `path` is relative to the shared-folder root, forward-slash separated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Entry name (final path segment)
    pub name: String,
    /// Path relative to the shared-folder root
    pub path: String,
    /// File size in bytes (0 for folders)
    pub size: u64,
    /// Content-integrity signature (None for folders)
    pub content_hash: Option<ContentHash>,
    /// Whether this entry is a folder (never materialized; traversal is
    /// out of scope)
    pub is_folder: bool,
}

// ============================================================================
// ISharedFolderProvider trait
// ============================================================================

/// Port trait for shared-folder provider operations
///
/// Implementations handle the provider-specific API calls and map failures
/// into the [`ProviderError`] taxonomy. All methods assume a single-run
/// session: `authenticate` is called once and authorizes the calls that
/// follow on the same instance.
#[async_trait::async_trait]
pub trait ISharedFolderProvider: Send + Sync {
    /// Validates a credential and installs the resulting session token
    ///
    /// For a pre-obtained token this is a validation round-trip; for an
    /// app key/secret pair the adapter performs the exchange first.
    ///
    /// # Errors
    /// [`ProviderError::Auth`] if the provider rejects the credential.
    async fn authenticate(&self, credential: &Credential) -> Result<AccessToken, ProviderError>;

    /// Lists all entries directly under the shared link, in listing order
    ///
    /// Follows pagination cursors until the listing is exhausted. Folder
    /// entries are included (marked `is_folder`) so the caller can count
    /// and skip them; recursion is out of scope.
    ///
    /// # Errors
    /// [`ProviderError::Link`] if the link is malformed, expired, or
    /// inaccessible to the authenticated credential.
    async fn list_entries(&self, link: &SharedLink) -> Result<Vec<RemoteEntry>, ProviderError>;

    /// Fetches the full byte content of one entry under the shared link
    ///
    /// # Arguments
    /// * `link` - The shared-folder link
    /// * `path` - The entry's path relative to the shared-folder root
    ///
    /// # Errors
    /// [`ProviderError::Entry`] for non-retryable per-entry failures,
    /// [`ProviderError::Transient`] for timeouts, rate limits, and
    /// server errors.
    async fn fetch_content(
        &self,
        link: &SharedLink,
        path: &str,
    ) -> Result<Vec<u8>, ProviderError>;
}
