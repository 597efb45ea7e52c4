//! Shared-link folder listing
//!
//! Wraps `/2/files/list_folder` (+ `/continue`) called with a shared link
//! instead of a path, following the cursor until the listing is
//! exhausted, and maps the wire entries onto the port-level
//! [`RemoteEntry`] DTO.

use dropmirror_core::domain::newtypes::{ContentHash, SharedLink};
use dropmirror_core::ports::shared_folder::{ProviderError, RemoteEntry};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::client::DropboxClient;

/// One page of a folder listing
#[derive(Debug, Deserialize)]
struct ListFolderResponse {
    /// Entries on this page, in listing order
    entries: Vec<ListFolderEntry>,
    /// Continuation cursor for the next page
    cursor: String,
    /// Whether another page exists
    has_more: bool,
}

/// Wire representation of a single listing entry
#[derive(Debug, Deserialize)]
struct ListFolderEntry {
    /// Entry kind: "file", "folder", or "deleted"
    #[serde(rename = ".tag")]
    tag: String,
    /// Entry name
    name: String,
    /// File size in bytes (absent for folders)
    #[serde(default)]
    size: Option<u64>,
    /// Dropbox content hash (absent for folders)
    #[serde(default)]
    content_hash: Option<String>,
}

/// Maps a wire entry to a [`RemoteEntry`]; unknown tags are dropped
///
/// Entries come from a shared-link listing of the folder root, so the
/// name is the path relative to the shared folder.
fn to_remote_entry(entry: ListFolderEntry) -> Option<RemoteEntry> {
    match entry.tag.as_str() {
        "file" => {
            let content_hash = entry.content_hash.and_then(|h| match ContentHash::new(h) {
                Ok(hash) => Some(hash),
                Err(e) => {
                    warn!(entry = %entry.name, error = %e, "Ignoring unparseable content hash");
                    None
                }
            });

            Some(RemoteEntry {
                path: entry.name.clone(),
                name: entry.name,
                size: entry.size.unwrap_or(0),
                content_hash,
                is_folder: false,
            })
        }
        "folder" => Some(RemoteEntry {
            path: entry.name.clone(),
            name: entry.name,
            size: 0,
            content_hash: None,
            is_folder: true,
        }),
        other => {
            warn!(tag = other, entry = %entry.name, "Ignoring unknown entry type");
            None
        }
    }
}

/// Lists all entries directly under the shared link
///
/// Follows `has_more`/`cursor` pagination until the listing is complete.
pub(crate) async fn list_all(
    client: &DropboxClient,
    link: &SharedLink,
) -> Result<Vec<RemoteEntry>, ProviderError> {
    let body = serde_json::json!({
        "path": "",
        "shared_link": {"url": link.as_str()}
    });

    let mut response: ListFolderResponse = client.rpc("/2/files/list_folder", &body).await?;
    let mut out = Vec::new();
    let mut pages = 1u32;

    loop {
        let ListFolderResponse {
            entries,
            cursor,
            has_more,
        } = response;

        for entry in entries {
            if let Some(remote) = to_remote_entry(entry) {
                out.push(remote);
            }
        }

        if !has_more {
            break;
        }

        response = client
            .rpc(
                "/2/files/list_folder/continue",
                &serde_json::json!({"cursor": cursor}),
            )
            .await?;
        pages += 1;
    }

    debug!(entries = out.len(), pages, "Listing complete");
    Ok(out)
}
