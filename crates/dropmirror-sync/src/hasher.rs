//! Dropbox-compatible block content hasher
//!
//! Computes the same value the Dropbox API reports in the `content_hash`
//! metadata field: the file is split into 4 MiB blocks, each block is
//! SHA-256 hashed, and the concatenation of the block digests is SHA-256
//! hashed again. The result is lowercase hex.
//!
//! The streaming `update` API means a file never has to be held in memory
//! as a single buffer to be hashed.

use dropmirror_core::domain::newtypes::ContentHash;
use sha2::{Digest, Sha256};

/// Block size over which per-block digests are computed (4 MiB)
pub const BLOCK_SIZE: usize = 4 * 1024 * 1024;

/// Incremental block content hasher
///
/// ```
/// use dropmirror_sync::hasher::BlockContentHasher;
///
/// let mut hasher = BlockContentHasher::new();
/// hasher.update(b"some file content");
/// let hash = hasher.finalize();
/// assert_eq!(hash.as_str().len(), 64);
/// ```
pub struct BlockContentHasher {
    /// Hasher over the concatenated block digests
    overall: Sha256,
    /// Hasher for the block currently being filled
    block: Sha256,
    /// Bytes fed into the current block so far
    block_len: usize,
}

impl BlockContentHasher {
    /// Creates a new hasher with an empty state
    #[must_use]
    pub fn new() -> Self {
        Self {
            overall: Sha256::new(),
            block: Sha256::new(),
            block_len: 0,
        }
    }

    /// Feeds bytes into the hasher
    ///
    /// Input may be split across calls arbitrarily; block boundaries are
    /// tracked internally.
    pub fn update(&mut self, mut input: &[u8]) {
        while !input.is_empty() {
            if self.block_len == BLOCK_SIZE {
                self.roll_block();
            }

            let space = BLOCK_SIZE - self.block_len;
            let take = space.min(input.len());
            self.block.update(&input[..take]);
            self.block_len += take;
            input = &input[take..];
        }
    }

    /// Consumes the hasher and returns the final content hash
    ///
    /// Zero input bytes produce the SHA-256 of the empty string (no
    /// blocks), matching the provider's value for empty files.
    #[must_use]
    pub fn finalize(mut self) -> ContentHash {
        if self.block_len > 0 {
            self.roll_block();
        }

        let digest: [u8; 32] = self.overall.finalize().into();
        ContentHash::from_digest(&digest)
    }

    /// Convenience wrapper hashing a complete in-memory buffer
    #[must_use]
    pub fn hash_bytes(data: &[u8]) -> ContentHash {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }

    /// Finishes the current block and folds its digest into the overall hash
    fn roll_block(&mut self) {
        let block = std::mem::take(&mut self.block);
        let digest: [u8; 32] = block.finalize().into();
        self.overall.update(digest);
        self.block_len = 0;
    }
}

impl Default for BlockContentHasher {
    fn default() -> Self {
        Self::new()
    }
}
