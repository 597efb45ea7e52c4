//! Shared-link listing integration tests

use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use dropmirror_core::ports::shared_folder::{ISharedFolderProvider, ProviderError};

use crate::common::{mount_list_single_page, setup, shared_link};

const HASH_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const HASH_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

#[tokio::test]
async fn test_single_page_listing_preserves_order() {
    let (server, provider) = setup().await;
    mount_list_single_page(
        &server,
        serde_json::json!([
            {".tag": "file", "name": "b.txt", "size": 2, "content_hash": HASH_B},
            {".tag": "file", "name": "a.txt", "size": 1, "content_hash": HASH_A},
            {".tag": "folder", "name": "photos"}
        ]),
    )
    .await;

    let entries = provider.list_entries(&shared_link()).await.unwrap();

    assert_eq!(entries.len(), 3);
    // Listing order, not alphabetical.
    assert_eq!(entries[0].path, "b.txt");
    assert_eq!(entries[1].path, "a.txt");
    assert_eq!(entries[0].content_hash.as_ref().unwrap().as_str(), HASH_B);
    assert!(entries[2].is_folder);
    assert!(entries[2].content_hash.is_none());
}

#[tokio::test]
async fn test_pagination_follows_cursor() {
    let (server, provider) = setup().await;

    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entries": [
                {".tag": "file", "name": "page1.txt", "size": 1, "content_hash": HASH_A}
            ],
            "cursor": "cursor-page-2",
            "has_more": true
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/2/files/list_folder/continue"))
        .and(body_json(serde_json::json!({"cursor": "cursor-page-2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entries": [
                {".tag": "file", "name": "page2.txt", "size": 2, "content_hash": HASH_B}
            ],
            "cursor": "cursor-final",
            "has_more": false
        })))
        .mount(&server)
        .await;

    let entries = provider.list_entries(&shared_link()).await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].path, "page1.txt");
    assert_eq!(entries[1].path, "page2.txt");
}

#[tokio::test]
async fn test_unknown_link_maps_to_link_error() {
    let (server, provider) = setup().await;

    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "error_summary": "shared_link_not_found/",
            "error": {".tag": "shared_link_not_found"}
        })))
        .mount(&server)
        .await;

    let err = provider.list_entries(&shared_link()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Link(_)));
}

#[tokio::test]
async fn test_rate_limited_listing_is_transient() {
    let (server, provider) = setup().await;

    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error_summary": "too_many_requests/",
            "error": {"reason": {".tag": "too_many_requests"}, "retry_after": 1}
        })))
        .mount(&server)
        .await;

    let err = provider.list_entries(&shared_link()).await.unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_unknown_entry_types_are_dropped() {
    let (server, provider) = setup().await;
    mount_list_single_page(
        &server,
        serde_json::json!([
            {".tag": "file", "name": "keep.txt", "size": 4, "content_hash": HASH_A},
            {".tag": "deleted", "name": "gone.txt"}
        ]),
    )
    .await;

    let entries = provider.list_entries(&shared_link()).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path, "keep.txt");
}
