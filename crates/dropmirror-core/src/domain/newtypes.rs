//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for the values the synchronizer passes around.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use super::errors::DomainError;

// ============================================================================
// SharedLink
// ============================================================================

/// A Dropbox shared-folder link
///
/// Validated to be an absolute `http(s)` URL with a host. The link itself is
/// otherwise opaque; whether it resolves to an accessible folder is only
/// known to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SharedLink(String);

impl SharedLink {
    /// Create a new SharedLink
    ///
    /// # Errors
    /// Returns `DomainError::InvalidLink` if the value is empty, does not
    /// parse as a URL, or is not an `http(s)` URL with a host.
    pub fn new(link: String) -> Result<Self, DomainError> {
        if link.trim().is_empty() {
            return Err(DomainError::InvalidLink(
                "Shared link cannot be empty".to_string(),
            ));
        }

        let url = Url::parse(&link)
            .map_err(|e| DomainError::InvalidLink(format!("{link}: {e}")))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(DomainError::InvalidLink(format!(
                "Shared link must be http(s): {link}"
            )));
        }

        if url.host_str().is_none() {
            return Err(DomainError::InvalidLink(format!(
                "Shared link has no host: {link}"
            )));
        }

        Ok(Self(link))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SharedLink {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SharedLink {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for SharedLink {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SharedLink> for String {
    fn from(link: SharedLink) -> Self {
        link.0
    }
}

// ============================================================================
// ContentHash
// ============================================================================

/// A Dropbox content hash in lowercase hex
///
/// This is the integrity signature the provider reports for every file:
/// SHA-256 over the concatenated SHA-256 digests of the file's 4 MiB
/// blocks, hex-encoded to 64 characters. Equality against a locally
/// recomputed hash is the only integrity oracle the synchronizer uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Hex length of a SHA-256 digest
    const EXPECTED_LEN: usize = 64;

    /// Create a new ContentHash from its hex representation
    ///
    /// Uppercase input is normalized to lowercase.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidHash` if the value is not exactly
    /// 64 hex characters.
    pub fn new(hash: String) -> Result<Self, DomainError> {
        if hash.is_empty() {
            return Err(DomainError::InvalidHash("Hash cannot be empty".to_string()));
        }

        if hash.len() != Self::EXPECTED_LEN {
            return Err(DomainError::InvalidHash(format!(
                "Hash has wrong length: expected {} hex chars, got {}",
                Self::EXPECTED_LEN,
                hash.len()
            )));
        }

        if !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DomainError::InvalidHash(format!(
                "Hash is not valid hex: {hash}"
            )));
        }

        Ok(Self(hash.to_ascii_lowercase()))
    }

    /// Create a ContentHash from a raw 32-byte digest
    #[must_use]
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        Self(hex::encode(digest))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentHash {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for ContentHash {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

// ============================================================================
// AccessToken
// ============================================================================

/// An opaque access token authorizing provider API calls
///
/// The value is deliberately kept out of `Debug` and `Display` output so
/// tokens never end up in logs or error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new AccessToken
    ///
    /// # Errors
    /// Returns `DomainError::InvalidToken` if the value is empty.
    pub fn new(token: String) -> Result<Self, DomainError> {
        if token.trim().is_empty() {
            return Err(DomainError::InvalidToken(
                "Access token cannot be empty".to_string(),
            ));
        }

        Ok(Self(token))
    }

    /// Get the secret token value
    ///
    /// Only adapters constructing Authorization headers should call this.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(****)")
    }
}

impl Display for AccessToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "****")
    }
}

impl FromStr for AccessToken {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
