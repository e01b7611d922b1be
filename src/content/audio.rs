use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    Table,
    columns::{insert_columns, patch_columns},
    validate::{Validate, not_blank, required},
};
use crate::error::Result;

/// 音频课程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AudioContent {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub audio_url: String,
    pub cover_image: String,
    /// 展示用时长，如 `15:42`
    pub duration: String,
    pub published_at: DateTime<Utc>,
    /// 首页播放器当前播放的音频，同一时刻最多一条
    pub is_currently_playing: bool,
}

impl Table for AudioContent {
    const NAME: &'static str = "audio_content";

    fn id(&self) -> i32 {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewAudio {
    pub title: String,
    pub description: String,
    pub audio_url: String,
    pub cover_image: String,
    pub duration: String,
    #[serde(default)]
    pub is_currently_playing: bool,
}

impl NewAudio {
    pub fn into_record(self, id: i32, published_at: DateTime<Utc>) -> AudioContent {
        AudioContent {
            id,
            title: self.title,
            description: self.description,
            audio_url: self.audio_url,
            cover_image: self.cover_image,
            duration: self.duration,
            published_at,
            is_currently_playing: self.is_currently_playing,
        }
    }
}

insert_columns!(NewAudio {
    title,
    description,
    audio_url,
    cover_image,
    duration,
    is_currently_playing,
});

impl Validate for NewAudio {
    fn validate(&self) -> Result<()> {
        required("title", &self.title)?;
        required("description", &self.description)?;
        required("audioUrl", &self.audio_url)?;
        required("coverImage", &self.cover_image)?;
        required("duration", &self.duration)
    }
}

/// 音频的部分更新
///
/// 播放状态不在此处修改，通过 `PUT`/`DELETE /audio/{id}/current` 切换。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AudioPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub audio_url: Option<String>,
    pub cover_image: Option<String>,
    pub duration: Option<String>,
}

patch_columns!(AudioPatch => AudioContent {
    title,
    description,
    audio_url,
    cover_image,
    duration,
});

impl Validate for AudioPatch {
    fn validate(&self) -> Result<()> {
        not_blank("title", self.title.as_ref())?;
        not_blank("description", self.description.as_ref())?;
        not_blank("audioUrl", self.audio_url.as_ref())?;
        not_blank("coverImage", self.cover_image.as_ref())?;
        not_blank("duration", self.duration.as_ref())
    }
}
