//! Domain error types
//!
//! This module defines error types for domain-level validation failures:
//! malformed shared links, invalid hashes, and unsafe path components.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Shared link is not a usable URL
    #[error("Invalid shared link: {0}")]
    InvalidLink(String),

    /// Invalid content hash format (expected 64 hex characters)
    #[error("Invalid content hash: {0}")]
    InvalidHash(String),

    /// Access token is empty or otherwise unusable
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    /// A remote entry path contains unsafe components
    #[error("Invalid entry path: {0}")]
    InvalidEntryPath(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
