use super::types::{ByteStream, DownloadOptions, VideoMetadata};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Extractor: Send + Sync {
    /// Human-readable name of the extractor
    fn name(&self) -> &'static str;

    /// Resolve a video page URL to its metadata
    async fn get_info(&self, url: &str) -> Result<VideoMetadata>;

    /// Start a download and hand back its bytes as they are produced.
    /// Dropping the stream stops the download.
    async fn download(&self, url: &str, options: &DownloadOptions) -> Result<ByteStream>;

    /// Test if this extractor is available on the system
    async fn test_availability(&self) -> bool;
}
