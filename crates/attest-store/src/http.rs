//! HTTP blob store
//!
//! Uploads each blob with `PUT {base_url}/{key}` and uses the request URL as
//! the retrieval URL. Key segments are percent-encoded so hierarchical keys
//! (which contain spaces and `#` disambiguation suffixes) survive as URL path
//! segments.

use async_trait::async_trait;
use attest_core::{AttestError, Result};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::BlobStore;

/// Blob store backed by an HTTP object-storage endpoint
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// URL a key will be stored under
    fn blob_url(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.base_url, encoded.join("/"))
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String> {
        let url = self.blob_url(key);

        let response = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| AttestError::BlobStore(format!("PUT {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttestError::BlobStore(format!(
                "store returned {} for {}",
                status, url
            )));
        }

        debug!("Uploaded blob {} ({} bytes)", url, bytes.len());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_url_encodes_segments() {
        let store = HttpBlobStore::new("https://blobs.example/run/");
        let url = store.blob_url("Login/finds patient/attempt-0/shot.png#2");
        assert_eq!(
            url,
            "https://blobs.example/run/Login/finds%20patient/attempt-0/shot.png%232"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let store = HttpBlobStore::new("https://blobs.example///");
        assert_eq!(store.blob_url("k"), "https://blobs.example/k");
    }
}
