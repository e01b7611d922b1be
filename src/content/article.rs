use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    Table,
    columns::{insert_columns, patch_columns},
    validate::{Validate, not_blank, positive, required},
};
use crate::error::Result;

/// 文章
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i32,
    pub title: String,
    pub content: String,
    /// 列表页展示的摘要
    pub excerpt: String,
    pub cover_image: String,
    /// 分类，如 Akidah、Fiqh、Maadili、Tarehe
    pub category: String,
    pub author: String,
    /// 创建时由服务端写入，不可修改
    pub published_at: DateTime<Utc>,
    /// 阅读时长（分钟）
    pub reading_time: i32,
}

impl Table for Article {
    const NAME: &'static str = "articles";

    fn id(&self) -> i32 {
        self.id
    }
}

/// 新建文章的请求体
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image: String,
    pub category: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "default_reading_time")]
    pub reading_time: i32,
}

fn default_author() -> String {
    "Sheikh Shahid".to_string()
}

fn default_reading_time() -> i32 {
    5
}

impl NewArticle {
    pub fn into_record(self, id: i32, published_at: DateTime<Utc>) -> Article {
        Article {
            id,
            title: self.title,
            content: self.content,
            excerpt: self.excerpt,
            cover_image: self.cover_image,
            category: self.category,
            author: self.author,
            published_at,
            reading_time: self.reading_time,
        }
    }
}

insert_columns!(NewArticle {
    title,
    content,
    excerpt,
    cover_image,
    category,
    author,
    reading_time,
});

impl Validate for NewArticle {
    fn validate(&self) -> Result<()> {
        required("title", &self.title)?;
        required("content", &self.content)?;
        required("excerpt", &self.excerpt)?;
        required("coverImage", &self.cover_image)?;
        required("category", &self.category)?;
        required("author", &self.author)?;
        positive("readingTime", self.reading_time)
    }
}

/// 文章的部分更新
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub reading_time: Option<i32>,
}

patch_columns!(ArticlePatch => Article {
    title,
    content,
    excerpt,
    cover_image,
    category,
    author,
    reading_time,
});

impl Validate for ArticlePatch {
    fn validate(&self) -> Result<()> {
        not_blank("title", self.title.as_ref())?;
        not_blank("content", self.content.as_ref())?;
        not_blank("excerpt", self.excerpt.as_ref())?;
        not_blank("coverImage", self.cover_image.as_ref())?;
        not_blank("category", self.category.as_ref())?;
        not_blank("author", self.author.as_ref())?;
        match self.reading_time {
            Some(minutes) => positive("readingTime", minutes),
            None => Ok(()),
        }
    }
}
