use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{ContentStore, Seed};
use crate::{
    content::{
        Article, ArticlePatch, AudioContent, AudioPatch, NewArticle, NewAudio, NewSchedule,
        NewVideo, Schedule, SchedulePatch, Table, Video, VideoPatch,
    },
    error::Result,
};

/// 新记录的起始 id，高于示例数据的范围
const FIRST_ID: i32 = 100;

/// 进程内的内容存储
///
/// 所有表和 id 计数器由同一把 [`RwLock`] 保护，多线程并发创建不会拿到重复 id。
/// 数据只在进程生命周期内有效。
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    next_id: i32,
    articles: BTreeMap<i32, Article>,
    audio: BTreeMap<i32, AudioContent>,
    videos: BTreeMap<i32, Video>,
    schedules: BTreeMap<i32, Schedule>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            next_id: FIRST_ID,
            articles: Default::default(),
            audio: Default::default(),
            videos: Default::default(),
            schedules: Default::default(),
        }
    }
}

impl Inner {
    fn allocate_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn clear_playing_except(&mut self, id: i32) {
        self.audio
            .values_mut()
            .filter(|a| a.id != id)
            .for_each(|a| a.is_currently_playing = false);
    }
}

fn by_id<T: Table>(rows: impl IntoIterator<Item = T>) -> BTreeMap<i32, T> {
    rows.into_iter().map(|row| (row.id(), row)).collect()
}

impl MemoryStore {
    /// 空存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 带内置示例数据的存储
    pub fn seeded() -> Result<Self> {
        Ok(Self::from_seed(Seed::sample()?))
    }

    pub fn from_seed(seed: Seed) -> Self {
        let next_id = FIRST_ID.max(seed.max_id() + 1);
        Self {
            inner: RwLock::new(Inner {
                next_id,
                articles: by_id(seed.articles),
                audio: by_id(seed.audio),
                videos: by_id(seed.videos),
                schedules: by_id(seed.schedules),
            }),
        }
    }
}

/// 按发布时间倒序，同一时间按 id 倒序
macro_rules! newest_first {
    ($rows:expr) => {{
        let mut rows: Vec<_> = $rows.cloned().collect();
        rows.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        rows
    }};
}

fn active_by_mosque<'a>(rows: impl Iterator<Item = &'a Schedule>) -> Vec<Schedule> {
    let mut rows: Vec<_> = rows.filter(|s| s.is_active).cloned().collect();
    rows.sort_by(|a, b| {
        a.mosque_name
            .cmp(&b.mosque_name)
            .then_with(|| a.id.cmp(&b.id))
    });
    rows
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn articles(&self, category: Option<&str>) -> Result<Vec<Article>> {
        let inner = self.inner.read().await;
        Ok(newest_first!(
            inner
                .articles
                .values()
                .filter(|a| category.is_none_or(|c| a.category == c))
        ))
    }

    async fn article(&self, id: i32) -> Result<Option<Article>> {
        Ok(self.inner.read().await.articles.get(&id).cloned())
    }

    async fn create_article(&self, new: NewArticle) -> Result<Article> {
        let mut inner = self.inner.write().await;
        let id = inner.allocate_id();
        let article = new.into_record(id, Utc::now());
        inner.articles.insert(id, article.clone());
        tracing::debug!(id, "article created");
        Ok(article)
    }

    async fn update_article(&self, id: i32, patch: ArticlePatch) -> Result<Option<Article>> {
        let mut inner = self.inner.write().await;
        Ok(inner.articles.get_mut(&id).map(|article| {
            patch.apply(article);
            article.clone()
        }))
    }

    async fn delete_article(&self, id: i32) -> Result<bool> {
        Ok(self.inner.write().await.articles.remove(&id).is_some())
    }

    async fn audio_list(&self) -> Result<Vec<AudioContent>> {
        let inner = self.inner.read().await;
        Ok(newest_first!(inner.audio.values()))
    }

    async fn audio(&self, id: i32) -> Result<Option<AudioContent>> {
        Ok(self.inner.read().await.audio.get(&id).cloned())
    }

    async fn current_audio(&self) -> Result<Option<AudioContent>> {
        let inner = self.inner.read().await;
        let mut playing = inner.audio.values().filter(|a| a.is_currently_playing);
        match (playing.next(), playing.next()) {
            (Some(audio), None) => Ok(Some(audio.clone())),
            _ => Ok(None),
        }
    }

    async fn create_audio(&self, new: NewAudio) -> Result<AudioContent> {
        let mut inner = self.inner.write().await;
        let id = inner.allocate_id();
        let audio = new.into_record(id, Utc::now());
        if audio.is_currently_playing {
            inner.clear_playing_except(id);
        }
        inner.audio.insert(id, audio.clone());
        tracing::debug!(id, "audio created");
        Ok(audio)
    }

    async fn update_audio(&self, id: i32, patch: AudioPatch) -> Result<Option<AudioContent>> {
        let mut inner = self.inner.write().await;
        Ok(inner.audio.get_mut(&id).map(|audio| {
            patch.apply(audio);
            audio.clone()
        }))
    }

    async fn delete_audio(&self, id: i32) -> Result<bool> {
        Ok(self.inner.write().await.audio.remove(&id).is_some())
    }

    async fn set_current_audio(&self, id: i32) -> Result<Option<AudioContent>> {
        let mut inner = self.inner.write().await;
        if !inner.audio.contains_key(&id) {
            return Ok(None);
        }
        inner.clear_playing_except(id);
        Ok(inner.audio.get_mut(&id).map(|audio| {
            audio.is_currently_playing = true;
            audio.clone()
        }))
    }

    async fn clear_current_audio(&self, id: i32) -> Result<Option<AudioContent>> {
        let mut inner = self.inner.write().await;
        Ok(inner.audio.get_mut(&id).map(|audio| {
            audio.is_currently_playing = false;
            audio.clone()
        }))
    }

    async fn videos(&self) -> Result<Vec<Video>> {
        let inner = self.inner.read().await;
        Ok(newest_first!(inner.videos.values()))
    }

    async fn video(&self, id: i32) -> Result<Option<Video>> {
        Ok(self.inner.read().await.videos.get(&id).cloned())
    }

    async fn create_video(&self, new: NewVideo) -> Result<Video> {
        let mut inner = self.inner.write().await;
        let id = inner.allocate_id();
        let video = new.into_record(id, Utc::now());
        inner.videos.insert(id, video.clone());
        tracing::debug!(id, "video created");
        Ok(video)
    }

    async fn update_video(&self, id: i32, patch: VideoPatch) -> Result<Option<Video>> {
        let mut inner = self.inner.write().await;
        Ok(inner.videos.get_mut(&id).map(|video| {
            patch.apply(video);
            video.clone()
        }))
    }

    async fn delete_video(&self, id: i32) -> Result<bool> {
        Ok(self.inner.write().await.videos.remove(&id).is_some())
    }

    async fn schedules(&self) -> Result<Vec<Schedule>> {
        let inner = self.inner.read().await;
        Ok(active_by_mosque(inner.schedules.values()))
    }

    async fn schedules_by_mosque(&self, mosque_name: &str) -> Result<Vec<Schedule>> {
        let inner = self.inner.read().await;
        Ok(active_by_mosque(
            inner
                .schedules
                .values()
                .filter(|s| s.mosque_name == mosque_name),
        ))
    }

    async fn schedule(&self, id: i32) -> Result<Option<Schedule>> {
        Ok(self.inner.read().await.schedules.get(&id).cloned())
    }

    async fn create_schedule(&self, new: NewSchedule) -> Result<Schedule> {
        let mut inner = self.inner.write().await;
        let id = inner.allocate_id();
        let schedule = new.into_record(id);
        inner.schedules.insert(id, schedule.clone());
        tracing::debug!(id, "schedule created");
        Ok(schedule)
    }

    async fn update_schedule(&self, id: i32, patch: SchedulePatch) -> Result<Option<Schedule>> {
        let mut inner = self.inner.write().await;
        Ok(inner.schedules.get_mut(&id).map(|schedule| {
            patch.apply(schedule);
            schedule.clone()
        }))
    }

    async fn delete_schedule(&self, id: i32) -> Result<bool> {
        Ok(self.inner.write().await.schedules.remove(&id).is_some())
    }
}
