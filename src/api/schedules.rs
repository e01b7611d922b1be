use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use super::{Admin, IdPath, Payload, TextPath};
use crate::{
    content::{NewSchedule, Schedule, SchedulePatch},
    error::{Error, Result},
    state::AppState,
    storage::SharedStore,
};

const NOT_FOUND: &str = "Schedule not found";

/// 配置讲座安排路由。
///
/// `/schedules/{key}` 上 GET 按清真寺名称查询，PATCH 和 DELETE 按 id 操作。
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/schedules", get(list).post(create))
        .route(
            "/schedules/{key}",
            get(by_mosque).patch(update).delete(remove),
        )
}

async fn list(State(store): State<SharedStore>) -> Result<Json<Vec<Schedule>>> {
    Ok(Json(store.schedules().await?))
}

/// 名称精确匹配，没有结果时返回空列表
async fn by_mosque(
    State(store): State<SharedStore>,
    TextPath(mosque_name): TextPath,
) -> Result<Json<Vec<Schedule>>> {
    Ok(Json(store.schedules_by_mosque(&mosque_name).await?))
}

async fn create(
    _: Admin,
    State(store): State<SharedStore>,
    Payload(new): Payload<NewSchedule>,
) -> Result<(StatusCode, Json<Schedule>)> {
    let schedule = store.create_schedule(new).await?;
    tracing::info!(id = schedule.id, mosque = %schedule.mosque_name, "schedule created");
    Ok((StatusCode::CREATED, Json(schedule)))
}

async fn update(
    _: Admin,
    State(store): State<SharedStore>,
    IdPath(id): IdPath,
    Payload(patch): Payload<SchedulePatch>,
) -> Result<Json<Schedule>> {
    store
        .update_schedule(id, patch)
        .await?
        .map(Json)
        .ok_or(Error::not_found(NOT_FOUND))
}

async fn remove(
    _: Admin,
    State(store): State<SharedStore>,
    IdPath(id): IdPath,
) -> Result<StatusCode> {
    if store.delete_schedule(id).await? {
        tracing::info!(id, "schedule deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::not_found(NOT_FOUND))
    }
}
