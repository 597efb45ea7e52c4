//! dropmirror sync - the synchronizer engine and its local adapters
//!
//! This crate contains:
//! - [`engine::Synchronizer`] - the sequential fetch-verify-write loop with
//!   per-entry retry and backoff
//! - [`hasher::BlockContentHasher`] - the Dropbox-compatible block content
//!   hash used for integrity checks
//! - [`store::LocalStoreAdapter`] - the `ILocalStore` implementation over
//!   the real filesystem (atomic writes, streaming hashing)

pub mod engine;
pub mod hasher;
pub mod store;
