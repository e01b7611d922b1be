use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode, header},
    routing::post,
};
use chrono::Utc;
use serde::Deserialize;

use super::{Admin, Params, RawBody, TextPath};
use crate::{
    error::{ApiError, Error, Result},
    media::{Bucket, StoredObject, Upload, object_path},
    state::{AppState, Media},
};

/// 请求体上限，与最大的存储桶一致
const BODY_LIMIT: usize = 50 * 1024 * 1024;

/// `POST /media/{bucket}?name=<文件名>`，请求体为文件原始内容
pub fn setup_route() -> Router<AppState> {
    Router::new().route(
        "/media/{bucket}",
        post(upload).layer(DefaultBodyLimit::max(BODY_LIMIT)),
    )
}

#[derive(Debug, Deserialize)]
struct UploadParams {
    name: String,
}

async fn upload(
    _: Admin,
    State(Media(media)): State<Media>,
    TextPath(bucket): TextPath,
    Params(params): Params<UploadParams>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> Result<(StatusCode, Json<StoredObject>)> {
    let bucket: Bucket = bucket.parse()?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::validation("Content-Type header is required"))?;
    bucket.check(content_type, body.len())?;

    let media = media.ok_or(ApiError::MediaUnavailable)?;

    let stored = media
        .upload(Upload {
            bucket,
            path: object_path(&params.name, Utc::now()),
            content_type: content_type.to_string(),
            bytes: body,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(stored)))
}
