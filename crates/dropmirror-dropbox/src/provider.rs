//! DropboxSharedFolderProvider - ISharedFolderProvider implementation
//!
//! Wraps the [`DropboxClient`] and delegates to the auth and list modules
//! to fulfil the port contract.
//!
//! ## Design Notes
//!
//! - Uses `tokio::sync::Mutex` because the port methods take `&self`
//!   while authentication needs `&mut DropboxClient` to install the
//!   session token.
//! - Content is fetched through `/2/sharing/get_shared_link_file`, which
//!   addresses an entry by shared link plus a root-relative path.

use dropmirror_core::domain::credential::Credential;
use dropmirror_core::domain::newtypes::{AccessToken, SharedLink};
use dropmirror_core::ports::shared_folder::{ISharedFolderProvider, ProviderError, RemoteEntry};
use tokio::sync::Mutex;
use tracing::debug;

use crate::auth;
use crate::client::DropboxClient;
use crate::list;

/// Shared-folder provider implementation backed by the Dropbox API
pub struct DropboxSharedFolderProvider {
    /// The underlying API client, protected by a mutex
    client: Mutex<DropboxClient>,
}

impl DropboxSharedFolderProvider {
    /// Creates a new provider wrapping the given [`DropboxClient`]
    pub fn new(client: DropboxClient) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }
}

#[async_trait::async_trait]
impl ISharedFolderProvider for DropboxSharedFolderProvider {
    async fn authenticate(&self, credential: &Credential) -> Result<AccessToken, ProviderError> {
        let mut client = self.client.lock().await;
        auth::authenticate(&mut client, credential).await
    }

    async fn list_entries(&self, link: &SharedLink) -> Result<Vec<RemoteEntry>, ProviderError> {
        let client = self.client.lock().await;
        list::list_all(&client, link).await
    }

    async fn fetch_content(
        &self,
        link: &SharedLink,
        path: &str,
    ) -> Result<Vec<u8>, ProviderError> {
        let client = self.client.lock().await;
        let arg = serde_json::json!({
            "url": link.as_str(),
            "path": format!("/{path}")
        });

        debug!(path, "Fetching shared-link file");
        client
            .content_download("/2/sharing/get_shared_link_file", &arg)
            .await
    }
}
