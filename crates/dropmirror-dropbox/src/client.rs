//! Dropbox API client
//!
//! Provides a typed HTTP client for the Dropbox API. Dropbox splits its
//! surface across two hosts: RPC endpoints (`api.dropboxapi.com`) take a
//! JSON body and return JSON; content endpoints (`content.dropboxapi.com`)
//! take their JSON argument in the `Dropbox-API-Arg` header and return the
//! raw bytes in the response body.
//!
//! All failures are classified into the [`ProviderError`] taxonomy here,
//! at the adapter boundary, so the synchronizer never inspects HTTP
//! details.

use dropmirror_core::config::HttpConfig;
use dropmirror_core::domain::newtypes::AccessToken;
use dropmirror_core::ports::shared_folder::ProviderError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Base URL for Dropbox RPC endpoints
const API_BASE_URL: &str = "https://api.dropboxapi.com";

/// Base URL for Dropbox content endpoints
const CONTENT_BASE_URL: &str = "https://content.dropboxapi.com";

/// Longest error-body excerpt carried into an error message
const ERROR_BODY_EXCERPT: usize = 200;

// ============================================================================
// Error classification
// ============================================================================

/// Error body shape returned by Dropbox API endpoints
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    /// Machine-readable summary, e.g. "shared_link_not_found/"
    error_summary: String,
}

/// Extracts the `error_summary` from an error body, falling back to a
/// trimmed excerpt of the raw body.
fn error_summary(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return parsed.error_summary;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no error detail".to_string()
    } else {
        trimmed.chars().take(ERROR_BODY_EXCERPT).collect()
    }
}

/// Maps an HTTP status plus error summary onto the provider taxonomy
///
/// - 401: the token is invalid or expired
/// - 429 / 5xx: worth retrying
/// - 409: Dropbox's "endpoint-specific error"; shared-link summaries mean
///   the link itself is bad, everything else is a per-entry failure
/// - remaining 4xx (400 malformed argument included): the link or the
///   request built from it is unusable
fn classify_status(status: StatusCode, summary: &str) -> ProviderError {
    if status == StatusCode::UNAUTHORIZED {
        return ProviderError::Auth(summary.to_string());
    }

    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return ProviderError::Transient(format!("{status}: {summary}"));
    }

    if status == StatusCode::CONFLICT {
        if summary.contains("shared_link") || summary.contains("malformed") {
            return ProviderError::Link(summary.to_string());
        }
        return ProviderError::Entry(summary.to_string());
    }

    if status == StatusCode::BAD_REQUEST {
        return ProviderError::Link(summary.to_string());
    }

    ProviderError::Entry(format!("{status}: {summary}"))
}

/// Maps reqwest transport failures (timeouts, connection errors) to
/// transient provider errors.
fn transport_error(err: reqwest::Error) -> ProviderError {
    ProviderError::Transient(format!("request failed: {err}"))
}

// ============================================================================
// DropboxClient
// ============================================================================

/// HTTP client for Dropbox API calls
///
/// Holds the session token once [`set_access_token`](Self::set_access_token)
/// has been called; both base URLs are overridable for tests.
pub struct DropboxClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for RPC endpoints
    api_base_url: String,
    /// Base URL for content endpoints
    content_base_url: String,
    /// Session token, absent until authentication completes
    access_token: Option<AccessToken>,
}

impl DropboxClient {
    /// Creates a new DropboxClient with the configured timeouts
    pub fn new(http: &HttpConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(http.connect_timeout())
            .timeout(http.request_timeout())
            .build()?;

        Ok(Self {
            client,
            api_base_url: API_BASE_URL.to_string(),
            content_base_url: CONTENT_BASE_URL.to_string(),
            access_token: None,
        })
    }

    /// Creates a DropboxClient with custom base URLs (useful for testing)
    pub fn with_base_urls(
        api_base_url: impl Into<String>,
        content_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base_url: api_base_url.into(),
            content_base_url: content_base_url.into(),
            access_token: None,
        }
    }

    /// Installs the session token used for subsequent requests
    pub fn set_access_token(&mut self, token: AccessToken) {
        self.access_token = Some(token);
        debug!("Session token installed");
    }

    /// Returns the current session token, if any
    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    /// Returns the base URL for RPC endpoints
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Returns a reference to the underlying HTTP client
    ///
    /// Used by the auth module for the token-exchange form POST, which is
    /// the one request that doesn't fit the RPC/content split.
    pub(crate) fn http_client(&self) -> &Client {
        &self.client
    }

    /// Creates a request builder for an RPC endpoint
    fn rpc_request(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_base_url, path);
        let builder = self.client.post(&url);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    /// Calls an RPC endpoint with a JSON body and parses the JSON response
    ///
    /// # Errors
    /// Transport failures map to [`ProviderError::Transient`]; non-success
    /// statuses are classified via the taxonomy; an unparseable success
    /// body maps to [`ProviderError::Entry`].
    pub async fn rpc<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ProviderError> {
        debug!(path, "RPC call");

        let response = self
            .rpc_request(path)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let response = Self::check_status(response).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Entry(format!("unexpected response from {path}: {e}")))
    }

    /// Calls a content endpoint and returns the raw response bytes
    ///
    /// The JSON argument travels in the `Dropbox-API-Arg` header; the
    /// request body is empty and the response body is the file content.
    pub async fn content_download(
        &self,
        path: &str,
        arg: &serde_json::Value,
    ) -> Result<Vec<u8>, ProviderError> {
        let url = format!("{}{}", self.content_base_url, path);
        debug!(path, "Content download");

        let builder = self.client.post(&url).header("Dropbox-API-Arg", arg.to_string());
        let builder = match &self.access_token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        };

        let response = builder.send().await.map_err(transport_error)?;
        let response = Self::check_status(response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Transient(format!("failed to read content body: {e}")))?;

        debug!(bytes = bytes.len(), "Content received");
        Ok(bytes.to_vec())
    }

    /// Passes successful responses through; classifies everything else
    async fn check_status(response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let summary = error_summary(&body);
        Err(classify_status(status, &summary))
    }
}
