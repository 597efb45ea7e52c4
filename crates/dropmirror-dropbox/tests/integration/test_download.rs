//! Shared-link content download integration tests

use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, ResponseTemplate};

use dropmirror_core::ports::shared_folder::{ISharedFolderProvider, ProviderError};

use crate::common::{mount_download, setup, shared_link};

#[tokio::test]
async fn test_download_returns_raw_bytes() {
    let (server, provider) = setup().await;
    let content = b"the quick brown fox\x00\x01\x02 binary tail";
    mount_download(&server, content).await;

    let bytes = provider
        .fetch_content(&shared_link(), "fox.bin")
        .await
        .unwrap();
    assert_eq!(bytes, content);
}

#[tokio::test]
async fn test_download_sends_api_arg_header() {
    let (server, provider) = setup().await;

    // The entry address travels in the Dropbox-API-Arg header, not the body.
    Mock::given(method("POST"))
        .and(path("/2/sharing/get_shared_link_file"))
        .and(header_exists("Dropbox-API-Arg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let bytes = provider
        .fetch_content(&shared_link(), "a.txt")
        .await
        .unwrap();
    assert_eq!(bytes, b"ok");
}

#[tokio::test]
async fn test_vanished_entry_maps_to_entry_error() {
    let (server, provider) = setup().await;

    Mock::given(method("POST"))
        .and(path("/2/sharing/get_shared_link_file"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "error_summary": "path/not_found/",
            "error": {".tag": "path", "path": {".tag": "not_found"}}
        })))
        .mount(&server)
        .await;

    let err = provider
        .fetch_content(&shared_link(), "gone.txt")
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Entry(_)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, provider) = setup().await;

    Mock::given(method("POST"))
        .and(path("/2/sharing/get_shared_link_file"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = provider
        .fetch_content(&shared_link(), "a.txt")
        .await
        .unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_empty_file_downloads_as_empty_bytes() {
    let (server, provider) = setup().await;
    mount_download(&server, b"").await;

    let bytes = provider
        .fetch_content(&shared_link(), "empty.txt")
        .await
        .unwrap();
    assert!(bytes.is_empty());
}
