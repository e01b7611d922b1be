use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    Table,
    columns::{insert_columns, patch_columns},
    validate::{Validate, not_blank, required, youtube_id},
};
use crate::error::Result;

/// YouTube 视频
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub youtube_id: String,
    pub thumbnail_url: String,
    pub duration: String,
    pub published_at: DateTime<Utc>,
}

impl Table for Video {
    const NAME: &'static str = "videos";

    fn id(&self) -> i32 {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub youtube_id: String,
    pub thumbnail_url: String,
    pub duration: String,
}

impl NewVideo {
    pub fn into_record(self, id: i32, published_at: DateTime<Utc>) -> Video {
        Video {
            id,
            title: self.title,
            description: self.description,
            youtube_id: self.youtube_id,
            thumbnail_url: self.thumbnail_url,
            duration: self.duration,
            published_at,
        }
    }
}

insert_columns!(NewVideo {
    title,
    description,
    youtube_id,
    thumbnail_url,
    duration,
});

impl Validate for NewVideo {
    fn validate(&self) -> Result<()> {
        required("title", &self.title)?;
        required("description", &self.description)?;
        youtube_id(&self.youtube_id)?;
        required("thumbnailUrl", &self.thumbnail_url)?;
        required("duration", &self.duration)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VideoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub youtube_id: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration: Option<String>,
}

patch_columns!(VideoPatch => Video {
    title,
    description,
    youtube_id,
    thumbnail_url,
    duration,
});

impl Validate for VideoPatch {
    fn validate(&self) -> Result<()> {
        not_blank("title", self.title.as_ref())?;
        not_blank("description", self.description.as_ref())?;
        if let Some(id) = &self.youtube_id {
            youtube_id(id)?;
        }
        not_blank("thumbnailUrl", self.thumbnail_url.as_ref())?;
        not_blank("duration", self.duration.as_ref())
    }
}
