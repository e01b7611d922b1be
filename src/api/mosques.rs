use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};

use super::Params;
use crate::{
    content::{Carousel, MosqueGroup, group_by_mosque, slides_per_view},
    error::Result,
    state::AppState,
    storage::SharedStore,
};

/// 配置清真寺轮播路由。
///
/// - `GET /mosques`：按清真寺分组的启用讲座安排
/// - `GET /mosques/slide?index=&width=`：轮播当前屏的分组
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/mosques", get(groups))
        .route("/mosques/slide", get(slide))
}

async fn groups(State(store): State<SharedStore>) -> Result<Json<Vec<MosqueGroup>>> {
    Ok(Json(group_by_mosque(store.schedules().await?)))
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SlideParams {
    index: usize,
    /// 视口宽度（像素）
    width: u32,
}

impl Default for SlideParams {
    fn default() -> Self {
        Self {
            index: 0,
            width: 1024,
        }
    }
}

#[derive(Debug, Serialize)]
struct Slide {
    index: usize,
    total: usize,
    mosques: Vec<MosqueGroup>,
}

async fn slide(
    State(store): State<SharedStore>,
    Params(params): Params<SlideParams>,
) -> Result<Json<Slide>> {
    let groups = group_by_mosque(store.schedules().await?);
    let carousel = Carousel::at(params.index, groups.len());

    let mosques = carousel
        .visible(slides_per_view(params.width))
        .into_iter()
        .map(|i| groups[i].clone())
        .collect();

    Ok(Json(Slide {
        index: carousel.index(),
        total: carousel.len(),
        mosques,
    }))
}
