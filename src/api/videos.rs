use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use super::{Admin, IdPath, Payload};
use crate::{
    content::{NewVideo, Video, VideoPatch},
    error::{Error, Result},
    state::AppState,
    storage::SharedStore,
};

const NOT_FOUND: &str = "Video not found";

/// 视频路由，结构与文章相同
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/videos", get(list).post(create))
        .route("/videos/{id}", get(detail).patch(update).delete(remove))
}

async fn list(State(store): State<SharedStore>) -> Result<Json<Vec<Video>>> {
    Ok(Json(store.videos().await?))
}

async fn detail(State(store): State<SharedStore>, IdPath(id): IdPath) -> Result<Json<Video>> {
    store
        .video(id)
        .await?
        .map(Json)
        .ok_or(Error::not_found(NOT_FOUND))
}

async fn create(
    _: Admin,
    State(store): State<SharedStore>,
    Payload(new): Payload<NewVideo>,
) -> Result<(StatusCode, Json<Video>)> {
    let video = store.create_video(new).await?;
    tracing::info!(id = video.id, youtube_id = %video.youtube_id, "video created");
    Ok((StatusCode::CREATED, Json(video)))
}

async fn update(
    _: Admin,
    State(store): State<SharedStore>,
    IdPath(id): IdPath,
    Payload(patch): Payload<VideoPatch>,
) -> Result<Json<Video>> {
    store
        .update_video(id, patch)
        .await?
        .map(Json)
        .ok_or(Error::not_found(NOT_FOUND))
}

async fn remove(
    _: Admin,
    State(store): State<SharedStore>,
    IdPath(id): IdPath,
) -> Result<StatusCode> {
    if store.delete_video(id).await? {
        tracing::info!(id, "video deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::not_found(NOT_FOUND))
    }
}
