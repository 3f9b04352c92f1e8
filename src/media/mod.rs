mod extractor;
mod types;
mod ytdlp;

pub use extractor::Extractor;
pub use types::{
    ByteStream, DownloadOptions, FormatInfo, QualitySelector, StreamFilter, VideoMetadata,
};
pub use ytdlp::YtDlpExtractor;
