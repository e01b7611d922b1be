use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use super::{Admin, IdPath, Params, Payload};
use crate::{
    content::{Article, ArticlePatch, NewArticle},
    error::{Error, Result},
    state::AppState,
    storage::SharedStore,
};

const NOT_FOUND: &str = "Article not found";

/// 配置文章相关路由。
///
/// 路由包括：
/// - `GET /articles`：文章列表，可按 `category` 过滤
/// - `POST /articles`：创建文章
/// - `GET /articles/{id}`：获取单篇文章
/// - `PATCH /articles/{id}`：修改文章
/// - `DELETE /articles/{id}`：删除文章
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list).post(create))
        .route("/articles/{id}", get(detail).patch(update).delete(remove))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListParams {
    category: Option<String>,
}

async fn list(
    State(store): State<SharedStore>,
    Params(params): Params<ListParams>,
) -> Result<Json<Vec<Article>>> {
    let category = params.category.as_deref().filter(|c| !c.is_empty());
    Ok(Json(store.articles(category).await?))
}

async fn detail(State(store): State<SharedStore>, IdPath(id): IdPath) -> Result<Json<Article>> {
    store
        .article(id)
        .await?
        .map(Json)
        .ok_or(Error::not_found(NOT_FOUND))
}

async fn create(
    _: Admin,
    State(store): State<SharedStore>,
    Payload(new): Payload<NewArticle>,
) -> Result<(StatusCode, Json<Article>)> {
    let article = store.create_article(new).await?;
    tracing::info!(id = article.id, "article created");
    Ok((StatusCode::CREATED, Json(article)))
}

async fn update(
    _: Admin,
    State(store): State<SharedStore>,
    IdPath(id): IdPath,
    Payload(patch): Payload<ArticlePatch>,
) -> Result<Json<Article>> {
    store
        .update_article(id, patch)
        .await?
        .map(Json)
        .ok_or(Error::not_found(NOT_FOUND))
}

async fn remove(
    _: Admin,
    State(store): State<SharedStore>,
    IdPath(id): IdPath,
) -> Result<StatusCode> {
    if store.delete_article(id).await? {
        tracing::info!(id, "article deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::not_found(NOT_FOUND))
    }
}
