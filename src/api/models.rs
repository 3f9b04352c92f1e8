use crate::{
    media::{FormatInfo, VideoMetadata},
    utils::{format_duration, format_views},
};
use serde::Serialize;
use std::collections::HashSet;
use url::form_urlencoded;

const MIB: u64 = 1024 * 1024;

// Repeated keys keep their first value.
fn first_value(query: Option<&str>, key: &str) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

/// Query parameters for `/api/info`
#[derive(Debug, PartialEq, Eq)]
pub struct InfoQuery {
    pub url: Option<String>,
}

impl InfoQuery {
    pub fn parse(query: Option<&str>) -> Self {
        Self {
            url: first_value(query, "url"),
        }
    }
}

/// Query parameters for `/api/download`
#[derive(Debug, PartialEq, Eq)]
pub struct DownloadQuery {
    pub url: Option<String>,
    pub quality: Option<String>,
}

impl DownloadQuery {
    pub fn parse(query: Option<&str>) -> Self {
        Self {
            url: first_value(query, "url"),
            quality: first_value(query, "quality"),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FormatSummary {
    pub quality: String,
    pub size: String,
}

impl From<&FormatInfo> for FormatSummary {
    fn from(format: &FormatInfo) -> Self {
        let quality = match format.quality_label.as_deref() {
            Some(label) if !label.is_empty() => label.to_string(),
            _ if format.is_audio_only() => "Audio".to_string(),
            _ => format.quality.clone(),
        };

        Self {
            quality,
            size: format_size(format.content_length),
        }
    }
}

fn format_size(content_length: Option<u64>) -> String {
    match content_length {
        Some(bytes) => format!("{} MB", (bytes + MIB / 2) / MIB),
        None => "Unknown".to_string(),
    }
}

/// Keeps formats carrying audio or video, one per quality label, in source
/// order.
pub fn summarize_formats(formats: &[FormatInfo]) -> Vec<FormatSummary> {
    let mut seen = HashSet::new();
    formats
        .iter()
        .filter(|f| f.has_video || f.has_audio)
        .map(FormatSummary::from)
        .filter(|summary| seen.insert(summary.quality.clone()))
        .collect()
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub success: bool,
    pub title: String,
    pub duration: String,
    pub views: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub author: String,
    pub formats: Vec<FormatSummary>,
}

impl From<VideoMetadata> for InfoResponse {
    fn from(metadata: VideoMetadata) -> Self {
        Self {
            success: true,
            duration: format_duration(metadata.duration),
            views: format_views(metadata.view_count),
            formats: summarize_formats(&metadata.formats),
            thumbnail: metadata.thumbnails.into_iter().last(),
            title: metadata.title,
            author: metadata.author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(label: Option<&str>, video: bool, audio: bool, size: Option<u64>) -> FormatInfo {
        FormatInfo {
            quality_label: label.map(str::to_string),
            quality: "medium".to_string(),
            has_video: video,
            has_audio: audio,
            content_length: size,
        }
    }

    #[test]
    fn test_query_parse() {
        assert_eq!(InfoQuery::parse(None), InfoQuery { url: None });
        assert_eq!(InfoQuery::parse(Some("")), InfoQuery { url: None });
        assert_eq!(
            InfoQuery::parse(Some("url=https%3A%2F%2Fyoutu.be%2Fabc&extra=1")).url,
            Some("https://youtu.be/abc".to_string())
        );
        assert_eq!(
            InfoQuery::parse(Some("url=a&url=b")).url,
            Some("a".to_string())
        );
        assert_eq!(
            DownloadQuery::parse(Some("quality=Audio&url=x&quality=720p")),
            DownloadQuery {
                url: Some("x".to_string()),
                quality: Some("Audio".to_string()),
            }
        );
        assert_eq!(InfoQuery::parse(Some("url")).url, Some(String::new()));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(None), "Unknown");
        assert_eq!(format_size(Some(0)), "0 MB");
        assert_eq!(format_size(Some(MIB)), "1 MB");
        assert_eq!(format_size(Some(MIB + MIB / 2)), "2 MB");
        assert_eq!(format_size(Some(MIB + MIB / 2 - 1)), "1 MB");
        assert_eq!(format_size(Some(1000)), "0 MB");
    }

    #[test]
    fn test_summary_quality_fallbacks() {
        let audio = FormatSummary::from(&format(None, false, true, None));
        assert_eq!(audio.quality, "Audio");

        let video_only = FormatSummary::from(&format(None, true, false, None));
        assert_eq!(video_only.quality, "medium");

        let labelled = FormatSummary::from(&format(Some("720p"), true, true, Some(5 * MIB)));
        assert_eq!(
            labelled,
            FormatSummary {
                quality: "720p".to_string(),
                size: "5 MB".to_string(),
            }
        );
    }

    #[test]
    fn test_summarize_formats_dedup() {
        let formats = vec![
            format(None, false, false, None),
            format(Some("360p"), true, true, Some(10 * MIB)),
            format(None, false, true, Some(3 * MIB)),
            format(Some("720p"), true, false, None),
            format(Some("360p"), true, false, Some(20 * MIB)),
            format(None, false, true, Some(4 * MIB)),
        ];

        let summaries = summarize_formats(&formats);
        let qualities: Vec<&str> = summaries.iter().map(|s| s.quality.as_str()).collect();
        assert_eq!(qualities, vec!["360p", "Audio", "720p"]);
        assert_eq!(summaries[0].size, "10 MB");
        assert_eq!(summaries[1].size, "3 MB");
    }

    #[test]
    fn test_info_response() {
        let metadata = VideoMetadata {
            title: "Title".to_string(),
            duration: 125,
            view_count: 1500000,
            thumbnails: vec!["small.jpg".to_string(), "large.jpg".to_string()],
            author: "Author".to_string(),
            formats: vec![],
        };

        let response = InfoResponse::from(metadata);
        assert!(response.success);
        assert_eq!(response.duration, "2:05");
        assert_eq!(response.views, "1.5M views");
        assert_eq!(response.thumbnail.as_deref(), Some("large.jpg"));
    }

    #[test]
    fn test_info_response_without_thumbnail() {
        let response = InfoResponse::from(VideoMetadata::default());
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("thumbnail").is_none());
        assert_eq!(json["views"], "0 views");
        assert_eq!(json["duration"], "0:00");
    }
}
