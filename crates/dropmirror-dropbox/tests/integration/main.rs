//! Integration tests for dropmirror-dropbox
//!
//! Uses wiremock to simulate the Dropbox API and verifies end-to-end
//! behavior of authentication, shared-link listing, and content download.

mod common;

mod test_auth;
mod test_download;
mod test_list;
