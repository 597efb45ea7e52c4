//! Shared test helpers for Dropbox API integration tests
//!
//! Provides wiremock-based mock server setup for the Dropbox endpoints.
//! Dropbox uses separate RPC and content hosts in production; the tests
//! point both base URLs at the same mock server.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dropmirror_core::domain::credential::Credential;
use dropmirror_core::domain::newtypes::{AccessToken, SharedLink};
use dropmirror_dropbox::client::DropboxClient;
use dropmirror_dropbox::provider::DropboxSharedFolderProvider;

/// Starts a mock server and returns it with a provider pointed at it.
pub async fn setup() -> (MockServer, DropboxSharedFolderProvider) {
    let server = MockServer::start().await;
    let client = DropboxClient::with_base_urls(server.uri(), server.uri());
    (server, DropboxSharedFolderProvider::new(client))
}

/// A valid shared link for test calls.
pub fn shared_link() -> SharedLink {
    SharedLink::new("https://www.dropbox.com/sh/test123/AADtest?dl=0".to_string()).unwrap()
}

/// A token credential for test calls.
pub fn token_credential() -> Credential {
    Credential::Token(AccessToken::new("test-access-token".to_string()).unwrap())
}

/// Mounts a successful `/2/users/get_current_account` endpoint.
pub async fn mount_account_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/2/users/get_current_account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "account_id": "dbid:AAAtest",
            "email": "test@example.com",
            "name": {"display_name": "Test User"}
        })))
        .mount(server)
        .await;
}

/// Mounts a `/2/files/list_folder` endpoint returning a single page.
#[allow(dead_code)]
pub async fn mount_list_single_page(server: &MockServer, entries: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entries": entries,
            "cursor": "cursor-final",
            "has_more": false
        })))
        .mount(server)
        .await;
}

/// Mounts a `/2/sharing/get_shared_link_file` endpoint serving `content`.
#[allow(dead_code)]
pub async fn mount_download(server: &MockServer, content: &[u8]) {
    Mock::given(method("POST"))
        .and(path("/2/sharing/get_shared_link_file"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}
