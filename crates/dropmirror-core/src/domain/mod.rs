//! Domain types for dropmirror
//!
//! Pure validation logic with no I/O: validated newtypes, the credential
//! model, and the domain error type.

pub mod credential;
pub mod errors;
pub mod newtypes;
