use super::{
    extractor::Extractor,
    types::{
        ByteStream, DownloadOptions, FormatInfo, QualitySelector, StreamFilter, VideoMetadata,
    },
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use std::process::{ExitStatus, Stdio};
use tokio::{
    io::AsyncReadExt,
    process::{Child, ChildStdout, Command},
    task::JoinHandle,
};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

const MUXED: &str = "[vcodec!=none][acodec!=none]";

#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    title: Option<String>,
    duration: Option<f64>,
    view_count: Option<Value>,
    thumbnail: Option<String>,
    #[serde(default)]
    thumbnails: Vec<YtDlpThumbnail>,
    uploader: Option<String>,
    channel: Option<String>,
    #[serde(default)]
    formats: Vec<YtDlpFormat>,
}

#[derive(Debug, Deserialize)]
struct YtDlpThumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct YtDlpFormat {
    format_id: String,
    vcodec: Option<String>,
    acodec: Option<String>,
    height: Option<u32>,
    fps: Option<f64>,
    format_note: Option<String>,
    filesize: Option<f64>,
    filesize_approx: Option<f64>,
}

impl From<YtDlpFormat> for FormatInfo {
    fn from(format: YtDlpFormat) -> Self {
        let has_video = match format.vcodec.as_deref() {
            Some(codec) => codec != "none",
            None => format.height.is_some(),
        };
        let has_audio = format.acodec.as_deref().is_some_and(|codec| codec != "none");

        let quality_label = format.height.filter(|_| has_video).map(|height| {
            match format.fps.map(|fps| fps.round() as u32) {
                Some(fps) if fps > 30 => format!("{height}p{fps}"),
                _ => format!("{height}p"),
            }
        });

        FormatInfo {
            quality: format.format_note.unwrap_or(format.format_id),
            quality_label,
            has_video,
            has_audio,
            content_length: format
                .filesize
                .or(format.filesize_approx)
                .map(|size| size as u64),
        }
    }
}

/// Accepts the view count as a number or as text with leading digits.
fn parse_view_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let digits: String = s.trim().chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        }
        _ => 0,
    }
}

fn parse_metadata(json_str: &str) -> Result<VideoMetadata> {
    let info: YtDlpInfo =
        serde_json::from_str(json_str).context("Failed to parse media metadata")?;

    let mut thumbnails: Vec<String> = info.thumbnails.into_iter().map(|t| t.url).collect();
    if thumbnails.is_empty() {
        thumbnails.extend(info.thumbnail);
    }

    Ok(VideoMetadata {
        title: info.title.unwrap_or_else(|| "Unknown Title".to_string()),
        duration: info.duration.map(|d| d.max(0.0) as u64).unwrap_or(0),
        view_count: parse_view_count(info.view_count.as_ref()),
        thumbnails,
        author: info.uploader.or(info.channel).unwrap_or_default(),
        formats: info.formats.into_iter().map(FormatInfo::from).collect(),
    })
}

/// Builds the yt-dlp `--format` expression for a download.
fn format_selector(options: &DownloadOptions) -> String {
    match options.filter {
        StreamFilter::AudioOnly => match options.quality {
            QualitySelector::Lowest => "worstaudio/worst".to_string(),
            _ => "bestaudio/best".to_string(),
        },
        StreamFilter::AudioAndVideo => match &options.quality {
            QualitySelector::Highest => format!("best{MUXED}/best"),
            QualitySelector::Lowest => format!("worst{MUXED}/worst"),
            QualitySelector::Height(height) => {
                format!("best[height<={height}]{MUXED}/best{MUXED}/best")
            }
            QualitySelector::FormatId(id) => format!("{id}/best{MUXED}/best"),
        },
    }
}

fn failure_message(stderr: &str, status: ExitStatus) -> anyhow::Error {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        anyhow::anyhow!("yt-dlp exited with {}", status)
    } else {
        anyhow::anyhow!("{}", stderr)
    }
}

fn collect_stderr(child: &mut Child) -> Option<JoinHandle<String>> {
    let mut stderr = child.stderr.take()?;
    Some(tokio::spawn(async move {
        let mut buffer = Vec::new();
        if let Err(e) = stderr.read_to_end(&mut buffer).await {
            debug!("Failed to read yt-dlp stderr: {}", e);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }))
}

/// Owns the running yt-dlp process for as long as its output is consumed.
struct DownloadState {
    reader: ReaderStream<ChildStdout>,
    child: Child,
    pending: Option<Bytes>,
    finished: bool,
}

impl DownloadState {
    async fn next_chunk(mut self) -> Option<(std::io::Result<Bytes>, Self)> {
        if self.finished {
            return None;
        }

        if let Some(chunk) = self.pending.take() {
            return Some((Ok(chunk), self));
        }

        if let Some(item) = self.reader.next().await {
            return Some((item, self));
        }

        self.finished = true;
        match self.child.wait().await {
            Ok(status) if status.success() => {
                debug!("yt-dlp finished streaming");
                None
            }
            Ok(status) => {
                warn!("yt-dlp exited mid-stream with {}", status);
                let error = std::io::Error::other(format!("yt-dlp exited with {status}"));
                Some((Err(error), self))
            }
            Err(e) => Some((Err(e), self)),
        }
    }
}

pub struct YtDlpExtractor {
    binary: String,
}

impl YtDlpExtractor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command.kill_on_drop(true);
        command
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn get_info(&self, url: &str) -> Result<VideoMetadata> {
        debug!("Extracting metadata with yt-dlp for: {}", url);

        let output = self
            .command()
            .arg("--dump-json")
            .arg("--no-download")
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--")
            .arg(url)
            .output()
            .await
            .context("Failed to run yt-dlp")?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(failure_message(&error, output.status));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        parse_metadata(&json_str)
    }

    async fn download(&self, url: &str, options: &DownloadOptions) -> Result<ByteStream> {
        let selector = format_selector(options);
        info!("Streaming {} with yt-dlp format {}", url, selector);

        let mut child = self
            .command()
            .arg("--format")
            .arg(&selector)
            .arg("--output")
            .arg("-")
            .arg("--no-part")
            .arg("--no-progress")
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn yt-dlp")?;

        let stdout = child.stdout.take().context("Failed to get yt-dlp stdout")?;
        let stderr_task = collect_stderr(&mut child);
        let mut reader = ReaderStream::new(stdout);

        // Nothing has been sent to the client yet, so a failure here can
        // still become a proper error response.
        let first = match reader.next().await {
            Some(chunk) => chunk.context("Failed to read yt-dlp output")?,
            None => {
                let status = child.wait().await.context("Failed to wait for yt-dlp")?;
                let stderr = match stderr_task {
                    Some(task) => task.await.unwrap_or_default(),
                    None => String::new(),
                };
                return Err(failure_message(&stderr, status));
            }
        };

        let state = DownloadState {
            reader,
            child,
            pending: Some(first),
            finished: false,
        };

        Ok(stream::unfold(state, DownloadState::next_chunk).boxed())
    }

    async fn test_availability(&self) -> bool {
        match self.command().arg("--version").output().await {
            Ok(output) => {
                if output.status.success() {
                    let version = String::from_utf8_lossy(&output.stdout);
                    info!("✅ yt-dlp is available, version: {}", version.trim());
                    true
                } else {
                    warn!("❌ yt-dlp command failed");
                    false
                }
            }
            Err(e) => {
                warn!("❌ yt-dlp not found at {}: {}", self.binary, e);
                false
            }
        }
    }
}
