mod articles;
mod audio;
mod extract;
mod health;
mod media;
mod mosques;
mod schedules;
mod videos;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::instrument;

use crate::{error::Result, state::AppState};

pub use extract::{Admin, IdPath, Params, Payload, RawBody, TextPath};

/// 设置应用的路由。
///
/// 所有接口挂在 `/api` 下，并绑定应用状态。
pub fn setup_route(app: AppState) -> Router {
    let api = Router::new()
        .merge(health::setup_route())
        .merge(articles::setup_route())
        .merge(audio::setup_route())
        .merge(videos::setup_route())
        .merge(schedules::setup_route())
        .merge(mosques::setup_route())
        .merge(media::setup_route());

    Router::new().nest("/api", api).with_state(app)
}

/// 启动 HTTP 服务，并使用给定的路由处理请求。
#[instrument(name = "http server", skip_all)]
pub async fn run_server_with_router(router: Router, listen: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;
    Ok(())
}

/// 启动 HTTP 服务，自动设置路由和中间件。
///
/// 1. 生成路由
/// 2. 添加日志和追踪中间件
/// 3. 启动服务器
pub async fn run_server(app: AppState, listen: &str) -> Result<()> {
    let router = setup_route(app);
    let router = add_middlewares(router);
    run_server_with_router(router, listen).await
}

/// 为路由添加中间件，包括请求追踪和失败日志记录。
///
/// 日志记录会在请求失败时输出错误信息。
fn add_middlewares(router: Router) -> Router {
    fn log_failure(
        err: tower_http::classify::ServerErrorsFailureClass,
        _latency: std::time::Duration,
        _span: &tracing::Span,
    ) {
        tracing::error!(error = %err, "request failed");
    }

    router.layer(
        TraceLayer::new_for_http()
            .on_failure(log_failure)
            .on_request(|_req: &_, _span: &tracing::Span| {
                // 空实现，关闭请求日志
            }),
    )
}
