use bytes::Bytes;
use futures::stream::BoxStream;

/// Lazy, non-restartable byte output of a download.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

#[derive(Debug, Clone, Default)]
pub struct VideoMetadata {
    pub title: String,
    pub duration: u64,
    pub view_count: u64,
    /// Ordered from lowest to highest resolution.
    pub thumbnails: Vec<String>,
    pub author: String,
    pub formats: Vec<FormatInfo>,
}

#[derive(Debug, Clone, Default)]
pub struct FormatInfo {
    /// Display label such as `720p` or `1080p60`, video formats only.
    pub quality_label: Option<String>,
    /// Coarse label used when there is no display label.
    pub quality: String,
    pub has_video: bool,
    pub has_audio: bool,
    pub content_length: Option<u64>,
}

impl FormatInfo {
    pub fn is_audio_only(&self) -> bool {
        self.has_audio && !self.has_video
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualitySelector {
    Highest,
    Lowest,
    /// Upper bound on the video height, parsed from labels like `720p`.
    Height(u32),
    FormatId(String),
}

impl QualitySelector {
    pub fn parse(quality: &str) -> Self {
        match quality {
            "" | "highest" => Self::Highest,
            "lowest" => Self::Lowest,
            other => match parse_height(other) {
                Some(height) => Self::Height(height),
                None => Self::FormatId(other.to_string()),
            },
        }
    }
}

fn parse_height(label: &str) -> Option<u32> {
    let end = label.find('p')?;
    label[..end].parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFilter {
    AudioOnly,
    AudioAndVideo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub quality: QualitySelector,
    pub filter: StreamFilter,
}

impl DownloadOptions {
    pub fn new(quality: &str, audio_only: bool) -> Self {
        let filter = if audio_only {
            StreamFilter::AudioOnly
        } else {
            StreamFilter::AudioAndVideo
        };

        Self {
            quality: QualitySelector::parse(quality),
            filter,
        }
    }
}
