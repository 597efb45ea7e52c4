//! Credential authentication
//!
//! Turns a [`Credential`] into a working session on a [`DropboxClient`].
//! A pre-obtained token is installed and validated with a round-trip to
//! `/2/users/get_current_account`; an app key/secret pair is first
//! exchanged for a session token at `/oauth2/token`. Nothing here is
//! refreshed or persisted: the session lives exactly as long as the run.

use dropmirror_core::domain::credential::Credential;
use dropmirror_core::domain::newtypes::AccessToken;
use dropmirror_core::ports::shared_folder::ProviderError;
use serde::Deserialize;
use tracing::{debug, info};

use crate::client::DropboxClient;

/// Response from the `/oauth2/token` endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    /// Bearer token for subsequent API requests
    access_token: String,
}

/// Account summary returned by `/2/users/get_current_account`
///
/// Only the fields the validation round-trip logs are parsed.
#[derive(Debug, Deserialize)]
struct AccountResponse {
    /// Account identifier
    account_id: Option<String>,
    /// E-mail on the account
    email: Option<String>,
}

/// Authenticates the client with the given credential
///
/// On success the session token is installed on `client` and also
/// returned to the caller.
pub(crate) async fn authenticate(
    client: &mut DropboxClient,
    credential: &Credential,
) -> Result<AccessToken, ProviderError> {
    let token = match credential {
        Credential::Token(token) => token.clone(),
        Credential::AppKeyPair {
            app_key,
            app_secret,
        } => exchange_app_key_pair(client, app_key, app_secret).await?,
    };

    client.set_access_token(token.clone());
    validate_session(client).await?;

    Ok(token)
}

/// Exchanges an app key/secret pair for a session token
async fn exchange_app_key_pair(
    client: &DropboxClient,
    app_key: &str,
    app_secret: &str,
) -> Result<AccessToken, ProviderError> {
    let url = format!("{}/oauth2/token", client.api_base_url());
    debug!("Exchanging app key pair for session token");

    let response = client
        .http_client()
        .post(&url)
        .basic_auth(app_key, Some(app_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|e| ProviderError::Transient(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        // The token endpoint reports bad credentials as 400/401 with an
        // OAuth error body; both mean the pair was rejected.
        if status.is_client_error() {
            return Err(ProviderError::Auth(format!(
                "app key pair rejected: {}",
                body.trim()
            )));
        }
        return Err(ProviderError::Transient(format!("{status}: {}", body.trim())));
    }

    let token_response: TokenResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::Auth(format!("unexpected token response: {e}")))?;

    AccessToken::new(token_response.access_token)
        .map_err(|e| ProviderError::Auth(e.to_string()))
}

/// Validates the installed token with an account round-trip
async fn validate_session(client: &DropboxClient) -> Result<(), ProviderError> {
    let account: AccountResponse = client
        .rpc("/2/users/get_current_account", &serde_json::Value::Null)
        .await?;

    info!(
        account_id = account.account_id.as_deref().unwrap_or("unknown"),
        email = account.email.as_deref().unwrap_or("unknown"),
        "Authenticated"
    );
    Ok(())
}
