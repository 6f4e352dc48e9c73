use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

mod http;
pub use http::*;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Media host refused the upload: {0}")]
    UploadRejected(String),
    #[error("Failed to reach media host: {0}")]
    FetchError(String),
    #[error("Failed to parse media host response: {0}")]
    ParseError(String),
    #[error("Local file is missing or unreadable: {0}")]
    FileError(String),
}

/// What kind of asset a key refers to on the host.
/// Deletion requires the kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
        }
    }
}

/// A successfully hosted asset
#[derive(Debug, Clone)]
pub struct UploadedMedia {
    /// The host-side key, needed later for deletion
    pub key: String,
    pub url: String,
    /// Duration in seconds, reported for video assets
    pub duration: Option<f64>,
}

/// Represents the external host that stores uploaded media
#[async_trait]
pub trait MediaHost: Send + Sync + 'static {
    /// Uploads a local file, returning its hosted key and URL
    async fn upload(&self, path: &Path, kind: MediaKind) -> Result<UploadedMedia, MediaError>;

    /// Deletes a hosted asset by key
    async fn delete(&self, key: &str, kind: MediaKind) -> Result<(), MediaError>;
}
