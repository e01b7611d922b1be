use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    error::Result,
    media::{self, SharedMedia},
    storage::{self, SharedStore},
};

/// 媒体存储，未配置时为 `None`
#[derive(Clone, Default)]
pub struct Media(pub Option<SharedMedia>);

/// 写操作的管理密钥，未配置时所有写操作都被拒绝
#[derive(Clone, Default)]
pub struct AdminKey(pub Option<Arc<str>>);

impl AdminKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Some(Arc::from(key.as_ref())))
    }
}

/// 应用程序上下文
///
/// [`AppState`] 封装了内容存储、媒体存储和管理密钥，通过 [`FromRef`] 按需提取。
#[derive(Clone, FromRef)]
pub struct AppState {
    store: SharedStore,
    media: Media,
    admin_key: AdminKey,
}

impl AppState {
    pub fn new(store: SharedStore, media: Media, admin_key: AdminKey) -> Self {
        Self {
            store,
            media,
            admin_key,
        }
    }

    /// 按配置初始化所有依赖，进程启动时调用一次
    pub async fn init(config: &Config) -> Result<Self> {
        let store = storage::init_store(config).await?;
        let media = Media(media::init_media(config).await?);

        let admin_key = match config.admin_key.as_deref() {
            Some(key) => AdminKey::new(key),
            None => {
                tracing::warn!("DARSA_ADMIN_KEY not set, all write requests will be rejected");
                AdminKey::default()
            }
        };

        Ok(Self::new(store, media, admin_key))
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }
}
