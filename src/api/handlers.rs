use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::info;

use super::{
    error::{ApiError, ApiResult},
    models::{DownloadQuery, InfoQuery, InfoResponse},
    AppState,
};
use crate::{media::DownloadOptions, utils::clean_filename};

const DEFAULT_QUALITY: &str = "highest";
const FALLBACK_FILENAME: &str = "download";

fn required_url(url: Option<String>) -> ApiResult<String> {
    url.filter(|url| !url.is_empty())
        .ok_or(ApiError::MissingParameter)
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "YouTube Downloader API is Working!",
        "status": "active",
        "endpoints": {
            "info": "/api/info?url=YOUTUBE_URL",
            "download": "/api/download?url=YOUTUBE_URL&quality=QUALITY",
        },
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// GET /api/info?url=
pub async fn info(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<InfoResponse>> {
    let query = InfoQuery::parse(query.as_deref());
    let url = required_url(query.url)?;
    info!("Fetching info for {}", url);

    let metadata = state.extractor.get_info(&url).await?;
    Ok(Json(InfoResponse::from(metadata)))
}

/// GET /api/download?url=&quality=
pub async fn download(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<Response> {
    let query = DownloadQuery::parse(query.as_deref());
    let url = required_url(query.url)?;
    let quality = query
        .quality
        .filter(|quality| !quality.is_empty())
        .unwrap_or_else(|| DEFAULT_QUALITY.to_string());

    let metadata = state.extractor.get_info(&url).await?;
    let mut title = clean_filename(&metadata.title);
    if title.is_empty() {
        title = FALLBACK_FILENAME.to_string();
    }

    let is_audio = quality.contains("Audio");
    let (extension, content_type) = if is_audio {
        ("mp3", "audio/mpeg")
    } else {
        ("mp4", "video/mp4")
    };
    let filename = format!("{title}.{extension}");

    let options = DownloadOptions::new(&quality, is_audio);
    let stream = state.extractor.download(&url, &options).await?;
    info!(
        "Streaming {} as {} via {}",
        url,
        filename,
        state.extractor.name()
    );

    let headers = [
        (CONTENT_TYPE, content_type.to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, Body::from_stream(stream)).into_response())
}
