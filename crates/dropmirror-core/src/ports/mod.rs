//! Port definitions (trait interfaces for adapters)

pub mod local_store;
pub mod shared_folder;
