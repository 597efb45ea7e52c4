//! Dropbox adapter for dropmirror
//!
//! Implements the `ISharedFolderProvider` port against the Dropbox HTTP
//! API: RPC endpoints on `api.dropboxapi.com` (account validation, token
//! exchange, shared-link folder listing) and content endpoints on
//! `content.dropboxapi.com` (shared-link file download).

pub mod client;
pub mod provider;

pub(crate) mod auth;
pub(crate) mod list;
