//! dropmirror core - domain logic and port definitions
//!
//! This crate contains the hexagonal core of dropmirror:
//! - **Domain types** - `SharedLink`, `ContentHash`, `AccessToken`, `Credential`
//! - **Port definitions** - Traits for adapters: `ISharedFolderProvider`, `ILocalStore`
//! - **Configuration** - Typed config with YAML loading and defaults
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure validation logic with no I/O.
//! Ports define trait interfaces that the adapter crates
//! (`dropmirror-dropbox`, `dropmirror-sync`) implement.

pub mod config;
pub mod domain;
pub mod ports;
