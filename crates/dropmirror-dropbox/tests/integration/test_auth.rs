//! Authentication integration tests

use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, ResponseTemplate};

use dropmirror_core::domain::credential::Credential;
use dropmirror_core::ports::shared_folder::{ISharedFolderProvider, ProviderError};

use crate::common::{mount_account_ok, setup, token_credential};

#[tokio::test]
async fn test_token_credential_validates_successfully() {
    let (server, provider) = setup().await;
    mount_account_ok(&server).await;

    let token = provider.authenticate(&token_credential()).await.unwrap();
    assert_eq!(token.expose(), "test-access-token");
}

#[tokio::test]
async fn test_rejected_token_maps_to_auth_error() {
    let (server, provider) = setup().await;

    Mock::given(method("POST"))
        .and(path("/2/users/get_current_account"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error_summary": "invalid_access_token/",
            "error": {".tag": "invalid_access_token"}
        })))
        .mount(&server)
        .await;

    let err = provider.authenticate(&token_credential()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Auth(_)));
    assert!(err.to_string().contains("invalid_access_token"));
}

#[tokio::test]
async fn test_app_key_pair_is_exchanged_for_session_token() {
    let (server, provider) = setup().await;

    // Token exchange must carry HTTP basic auth with the key/secret pair.
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "sl.exchanged-token",
            "token_type": "bearer",
            "expires_in": 14400
        })))
        .mount(&server)
        .await;
    mount_account_ok(&server).await;

    let credential = Credential::AppKeyPair {
        app_key: "app-key".to_string(),
        app_secret: "app-secret".to_string(),
    };

    let token = provider.authenticate(&credential).await.unwrap();
    assert_eq!(token.expose(), "sl.exchanged-token");
}

#[tokio::test]
async fn test_rejected_app_key_pair_maps_to_auth_error() {
    let (server, provider) = setup().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_client",
            "error_description": "invalid client_id or client_secret"
        })))
        .mount(&server)
        .await;

    let credential = Credential::AppKeyPair {
        app_key: "bad-key".to_string(),
        app_secret: "bad-secret".to_string(),
    };

    let err = provider.authenticate(&credential).await.unwrap_err();
    assert!(matches!(err, ProviderError::Auth(_)));
}

#[tokio::test]
async fn test_server_error_during_validation_is_transient() {
    let (server, provider) = setup().await;

    Mock::given(method("POST"))
        .and(path("/2/users/get_current_account"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = provider.authenticate(&token_credential()).await.unwrap_err();
    assert!(err.is_transient());
}
