use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};

use super::{Admin, IdPath, Payload};
use crate::{
    content::{AudioContent, AudioPatch, NewAudio},
    error::{Error, Result},
    state::AppState,
    storage::SharedStore,
};

const NOT_FOUND: &str = "Audio not found";

/// 配置音频相关路由。
///
/// `/audio/current` 必须先于 `/audio/{id}` 匹配，axum 的静态段优先级保证了这一点。
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/audio", get(list).post(create))
        .route("/audio/current", get(current))
        .route("/audio/{id}", get(detail).patch(update).delete(remove))
        .route(
            "/audio/{id}/current",
            put(set_current).delete(clear_current),
        )
}

async fn list(State(store): State<SharedStore>) -> Result<Json<Vec<AudioContent>>> {
    Ok(Json(store.audio_list().await?))
}

async fn current(State(store): State<SharedStore>) -> Result<Json<AudioContent>> {
    store
        .current_audio()
        .await?
        .map(Json)
        .ok_or(Error::not_found("No current audio found"))
}

async fn detail(
    State(store): State<SharedStore>,
    IdPath(id): IdPath,
) -> Result<Json<AudioContent>> {
    store
        .audio(id)
        .await?
        .map(Json)
        .ok_or(Error::not_found(NOT_FOUND))
}

async fn create(
    _: Admin,
    State(store): State<SharedStore>,
    Payload(new): Payload<NewAudio>,
) -> Result<(StatusCode, Json<AudioContent>)> {
    let audio = store.create_audio(new).await?;
    tracing::info!(id = audio.id, playing = audio.is_currently_playing, "audio created");
    Ok((StatusCode::CREATED, Json(audio)))
}

async fn update(
    _: Admin,
    State(store): State<SharedStore>,
    IdPath(id): IdPath,
    Payload(patch): Payload<AudioPatch>,
) -> Result<Json<AudioContent>> {
    store
        .update_audio(id, patch)
        .await?
        .map(Json)
        .ok_or(Error::not_found(NOT_FOUND))
}

async fn remove(
    _: Admin,
    State(store): State<SharedStore>,
    IdPath(id): IdPath,
) -> Result<StatusCode> {
    if store.delete_audio(id).await? {
        tracing::info!(id, "audio deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::not_found(NOT_FOUND))
    }
}

async fn set_current(
    _: Admin,
    State(store): State<SharedStore>,
    IdPath(id): IdPath,
) -> Result<Json<AudioContent>> {
    let audio = store
        .set_current_audio(id)
        .await?
        .ok_or(Error::not_found(NOT_FOUND))?;
    tracing::info!(id, "current audio changed");
    Ok(Json(audio))
}

/// 停止播放，返回更新后的音频
async fn clear_current(
    _: Admin,
    State(store): State<SharedStore>,
    IdPath(id): IdPath,
) -> Result<Json<AudioContent>> {
    let audio = store
        .clear_current_audio(id)
        .await?
        .ok_or(Error::not_found(NOT_FOUND))?;
    tracing::info!(id, "audio stopped");
    Ok(Json(audio))
}
