use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    content::{
        Article, ArticlePatch, AudioContent, AudioPatch, NewArticle, NewAudio, NewSchedule,
        NewVideo, Schedule, SchedulePatch, Video, VideoPatch,
    },
    error::Result,
};

pub type SharedStore = Arc<dyn ContentStore>;

/// 内容存储
///
/// 内存和 Postgres 两种实现行为一致：
///
/// - 列表按 `published_at` 倒序，讲座安排按 `mosque_name` 排序且只含启用的行
/// - 单条查询不存在时返回 `None`
/// - 创建时由存储分配 id 和 `published_at`
/// - 更新不存在的 id 返回 `None`，删除不存在的 id 返回 `false`
/// - 任何底层失败都作为错误返回，不会被吞掉变成空结果
#[async_trait]
pub trait ContentStore: Send + Sync + 'static {
    /// 存储实现名称，用于日志和健康检查
    fn backend(&self) -> &'static str;

    /// 文章列表，可按分类精确过滤
    async fn articles(&self, category: Option<&str>) -> Result<Vec<Article>>;
    async fn article(&self, id: i32) -> Result<Option<Article>>;
    async fn create_article(&self, new: NewArticle) -> Result<Article>;
    async fn update_article(&self, id: i32, patch: ArticlePatch) -> Result<Option<Article>>;
    async fn delete_article(&self, id: i32) -> Result<bool>;

    async fn audio_list(&self) -> Result<Vec<AudioContent>>;
    async fn audio(&self, id: i32) -> Result<Option<AudioContent>>;
    /// 当前播放的音频
    ///
    /// 恰好一条时返回该条；没有或多于一条时返回 `None`。
    async fn current_audio(&self) -> Result<Option<AudioContent>>;
    /// 创建音频；若新音频标记为播放中，同时清除其他音频的播放标记
    async fn create_audio(&self, new: NewAudio) -> Result<AudioContent>;
    async fn update_audio(&self, id: i32, patch: AudioPatch) -> Result<Option<AudioContent>>;
    async fn delete_audio(&self, id: i32) -> Result<bool>;
    /// 把指定音频设为唯一的播放中音频
    async fn set_current_audio(&self, id: i32) -> Result<Option<AudioContent>>;
    /// 清除指定音频的播放标记，其他音频不受影响
    async fn clear_current_audio(&self, id: i32) -> Result<Option<AudioContent>>;

    async fn videos(&self) -> Result<Vec<Video>>;
    async fn video(&self, id: i32) -> Result<Option<Video>>;
    async fn create_video(&self, new: NewVideo) -> Result<Video>;
    async fn update_video(&self, id: i32, patch: VideoPatch) -> Result<Option<Video>>;
    async fn delete_video(&self, id: i32) -> Result<bool>;

    /// 启用中的讲座安排
    async fn schedules(&self) -> Result<Vec<Schedule>>;
    /// 指定清真寺启用中的讲座安排，名称区分大小写
    async fn schedules_by_mosque(&self, mosque_name: &str) -> Result<Vec<Schedule>>;
    /// 单条讲座安排，包含已停用的
    async fn schedule(&self, id: i32) -> Result<Option<Schedule>>;
    async fn create_schedule(&self, new: NewSchedule) -> Result<Schedule>;
    async fn update_schedule(&self, id: i32, patch: SchedulePatch) -> Result<Option<Schedule>>;
    async fn delete_schedule(&self, id: i32) -> Result<bool>;
}
