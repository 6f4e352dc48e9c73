use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use std::path::Path;
use url::Url;

use crate::{MediaError, MediaHost, MediaKind, UploadedMedia};

/// A media host reached over HTTP, in the manner of cloudinary-style
/// asset services: multipart upload in, key/url/duration out.
pub struct HttpMediaHost {
    client: Client,
    base_url: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    key: String,
    url: String,
    duration: Option<f64>,
}

impl HttpMediaHost {
    pub fn new(base_url: Url, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, MediaError> {
        self.base_url
            .join(path)
            .map_err(|e| MediaError::FetchError(e.to_string()))
    }
}

#[async_trait]
impl MediaHost for HttpMediaHost {
    async fn upload(&self, path: &Path, kind: MediaKind) -> Result<UploadedMedia, MediaError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| MediaError::FileError(e.to_string()))?;

        let form = multipart::Form::new()
            .text("kind", kind.as_str())
            .part("file", multipart::Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(self.endpoint("upload")?)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            let reason = response.text().await.unwrap_or_default();
            return Err(MediaError::UploadRejected(reason));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::ParseError(e.to_string()))?;

        Ok(UploadedMedia {
            key: uploaded.key,
            url: uploaded.url,
            duration: uploaded.duration,
        })
    }

    async fn delete(&self, key: &str, kind: MediaKind) -> Result<(), MediaError> {
        let mut endpoint = self.endpoint(&format!("media/{key}"))?;
        endpoint
            .query_pairs_mut()
            .append_pair("kind", kind.as_str());

        let response = self
            .client
            .delete(endpoint)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| MediaError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MediaError::UploadRejected(format!(
                "delete failed with status {}",
                response.status()
            )));
        }

        Ok(())
    }
}
