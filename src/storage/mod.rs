mod memory;
mod postgres;
mod seed;
mod store;

use std::sync::Arc;

pub use self::{
    memory::MemoryStore,
    postgres::{DBPool, PgStore, migrate, new_db_pool},
    seed::Seed,
    store::{ContentStore, SharedStore},
};

use crate::{config::Config, error::Result};

/// 根据配置初始化内容存储，进程启动时调用一次
///
/// 配置了 `database_url` 时使用 Postgres，否则退回到带示例数据的内存存储。
pub async fn init_store(config: &Config) -> Result<SharedStore> {
    match config.database_url.as_deref() {
        Some(url) => {
            let pool = new_db_pool(url).await?;
            tracing::info!("content store: postgres");
            Ok(Arc::new(PgStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory content store");
            Ok(Arc::new(MemoryStore::seeded()?))
        }
    }
}
