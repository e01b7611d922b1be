//! 媒体文件存储
//!
//! 图片和音频上传到对象存储的公开桶中，返回可直接访问的 URL。

mod supabase;

use std::{fmt, str::FromStr, sync::Arc};

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub use supabase::SupabaseStorage;

use crate::{
    config::Config,
    error::{Error, Result},
};

const MIB: usize = 1024 * 1024;

/// 存储桶
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Images,
    AudioFiles,
}

impl Bucket {
    pub const ALL: [Bucket; 2] = [Bucket::Images, Bucket::AudioFiles];

    pub fn id(&self) -> &'static str {
        match self {
            Bucket::Images => "images",
            Bucket::AudioFiles => "audio-files",
        }
    }

    pub fn allowed_mime_types(&self) -> &'static [&'static str] {
        match self {
            Bucket::Images => &["image/jpeg", "image/jpg", "image/png", "image/webp"],
            Bucket::AudioFiles => &["audio/mpeg", "audio/wav", "audio/mp3"],
        }
    }

    /// 单个文件大小上限（字节）
    pub fn size_limit(&self) -> usize {
        match self {
            Bucket::Images => 10 * MIB,
            Bucket::AudioFiles => 50 * MIB,
        }
    }

    /// 在访问对象存储之前检查类型和大小
    pub fn check(&self, content_type: &str, len: usize) -> Result<()> {
        // 忽略 `; charset=...` 之类的参数
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if !self.allowed_mime_types().contains(&mime.as_str()) {
            return Err(Error::validation(format!(
                "content type '{mime}' is not allowed in bucket '{self}'"
            )));
        }
        if len == 0 {
            return Err(Error::validation("file is empty"));
        }
        if len > self.size_limit() {
            return Err(Error::validation(format!(
                "file exceeds the {} MiB limit of bucket '{self}'",
                self.size_limit() / MIB
            )));
        }
        Ok(())
    }
}

impl FromStr for Bucket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Bucket::ALL
            .into_iter()
            .find(|b| b.id() == s)
            .ok_or_else(|| Error::validation(format!("unknown bucket '{s}'")))
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// 待上传的文件
#[derive(Debug, Clone)]
pub struct Upload {
    pub bucket: Bucket,
    pub path: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// 上传结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub bucket: String,
    pub path: String,
    pub public_url: String,
}

#[async_trait]
pub trait MediaStore: Send + Sync + 'static {
    /// 上传文件，返回对象路径和公开地址
    async fn upload(&self, upload: Upload) -> Result<StoredObject>;

    fn public_url(&self, bucket: Bucket, path: &str) -> String;

    /// 创建缺失的存储桶
    async fn ensure_buckets(&self) -> Result<()>;
}

pub type SharedMedia = Arc<dyn MediaStore>;

/// 对象路径：`<毫秒时间戳>-<清理后的文件名>`
pub fn object_path(name: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", now.timestamp_millis(), sanitize_file_name(name))
}

/// 只保留文件名部分，非 `[A-Za-z0-9._-]` 字符替换为 `-`
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// 根据配置创建媒体存储，并确保存储桶存在
///
/// 未配置对象存储时返回 `None`；建桶失败只记录日志。
pub async fn init_media(config: &Config) -> Result<Option<SharedMedia>> {
    let Some(supabase) = &config.supabase else {
        tracing::warn!("SUPABASE_URL or SUPABASE_SERVICE_ROLE_KEY not set, media upload disabled");
        return Ok(None);
    };

    let storage = SupabaseStorage::new(&supabase.url, &supabase.service_role_key)?;
    if let Err(e) = storage.ensure_buckets().await {
        tracing::error!(%e, "failed to ensure media buckets");
    }

    Ok(Some(Arc::new(storage)))
}
