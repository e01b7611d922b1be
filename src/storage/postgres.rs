use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgExecutor, Postgres, QueryBuilder, postgres::PgPoolOptions};

use super::ContentStore;
use crate::{
    content::{
        Article, ArticlePatch, AudioContent, AudioPatch, Columns, NewArticle, NewAudio,
        NewSchedule, NewVideo, Schedule, SchedulePatch, Table, Value, Video, VideoPatch,
    },
    error::Result,
};

/// 数据库连接池类型
pub type DBPool = sqlx::PgPool;

/// 根据连接 URL 创建新的数据库连接池
///
/// 连接池配置：
///
/// - 最大空闲时间 60 秒
/// - 最大生存时间 1500 秒（约 25 分钟）
/// - 最大连接数 10
/// - 获取连接超时 2 秒
/// - 获取前测试连接
/// - 最小连接数 2
pub async fn new_db_pool(conn_url: &str) -> Result<DBPool, sqlx::Error> {
    PgPoolOptions::new()
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(1500))
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(2))
        .test_before_acquire(true)
        .min_connections(2)
        .connect(conn_url)
        .await
}

/// 执行 SQL 文件中的迁移语句
///
/// 将文件内容按 `;` 分割，每条 SQL 单独执行
pub async fn migrate(db: &DBPool, file: &str) -> Result<(), sqlx::Error> {
    let content = std::fs::read_to_string(file)?;

    for sql in content.split(';') {
        if sql.trim().is_empty() {
            continue;
        }
        sqlx::query(sql).execute(db).await?;
    }
    Ok(())
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: Value) {
    match value {
        Value::Text(v) => builder.push_bind(v),
        Value::NullableText(v) => builder.push_bind(v),
        Value::Int(v) => builder.push_bind(v),
        Value::Bool(v) => builder.push_bind(v),
    };
}

/// `INSERT ... RETURNING *`
async fn insert_row<'e, T, E>(executor: E, new: &impl Columns) -> Result<T, sqlx::Error>
where
    T: Table,
    E: PgExecutor<'e>,
{
    let columns = new.columns();
    let mut builder = QueryBuilder::<Postgres>::new(format!("INSERT INTO {} (", T::NAME));

    let mut names = builder.separated(", ");
    for (name, _) in &columns {
        names.push(*name);
    }

    builder.push(") VALUES (");
    for (i, (_, value)) in columns.into_iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        push_value(&mut builder, value);
    }
    builder.push(") RETURNING *");

    builder.build_query_as::<T>().fetch_one(executor).await
}

async fn fetch_by_id<'e, T, E>(executor: E, id: i32) -> Result<Option<T>, sqlx::Error>
where
    T: Table,
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, T>(&format!("SELECT * FROM {} WHERE id = $1", T::NAME))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// `UPDATE ... RETURNING *`，没有要修改的列时直接返回当前行
async fn update_row<'e, T, E>(executor: E, id: i32, patch: &impl Columns) -> Result<Option<T>, sqlx::Error>
where
    T: Table,
    E: PgExecutor<'e>,
{
    let columns = patch.columns();
    if columns.is_empty() {
        return fetch_by_id(executor, id).await;
    }

    let mut builder = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", T::NAME));
    for (i, (name, value)) in columns.into_iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder.push(name).push(" = ");
        push_value(&mut builder, value);
    }
    builder.push(" WHERE id = ").push_bind(id);
    builder.push(" RETURNING *");

    builder.build_query_as::<T>().fetch_optional(executor).await
}

async fn delete_row<'e, T, E>(executor: E, id: i32) -> Result<bool, sqlx::Error>
where
    T: Table,
    E: PgExecutor<'e>,
{
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", T::NAME))
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// 基于 Postgres 的内容存储
///
/// 每个操作一次数据库往返，无缓存、无重试。
#[derive(Clone)]
pub struct PgStore {
    pool: DBPool,
}

impl PgStore {
    pub fn new(pool: DBPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DBPool {
        &self.pool
    }
}

#[async_trait]
impl ContentStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn articles(&self, category: Option<&str>) -> Result<Vec<Article>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM articles");
        if let Some(category) = category {
            builder.push(" WHERE category = ").push_bind(category);
        }
        builder.push(" ORDER BY published_at DESC, id DESC");

        Ok(builder
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn article(&self, id: i32) -> Result<Option<Article>> {
        Ok(fetch_by_id(&self.pool, id).await?)
    }

    async fn create_article(&self, new: NewArticle) -> Result<Article> {
        Ok(insert_row(&self.pool, &new).await?)
    }

    async fn update_article(&self, id: i32, patch: ArticlePatch) -> Result<Option<Article>> {
        Ok(update_row(&self.pool, id, &patch).await?)
    }

    async fn delete_article(&self, id: i32) -> Result<bool> {
        Ok(delete_row::<Article, _>(&self.pool, id).await?)
    }

    async fn audio_list(&self) -> Result<Vec<AudioContent>> {
        Ok(sqlx::query_as::<_, AudioContent>(
            "SELECT * FROM audio_content ORDER BY published_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn audio(&self, id: i32) -> Result<Option<AudioContent>> {
        Ok(fetch_by_id(&self.pool, id).await?)
    }

    async fn current_audio(&self) -> Result<Option<AudioContent>> {
        // 取两行即可区分“唯一”与“多条”
        let mut rows = sqlx::query_as::<_, AudioContent>(
            "SELECT * FROM audio_content WHERE is_currently_playing = TRUE LIMIT 2",
        )
        .fetch_all(&self.pool)
        .await?;

        if rows.len() == 1 {
            Ok(rows.pop())
        } else {
            if rows.len() > 1 {
                tracing::warn!("more than one audio marked as currently playing");
            }
            Ok(None)
        }
    }

    async fn create_audio(&self, new: NewAudio) -> Result<AudioContent> {
        let mut tx = self.pool.begin().await?;

        let audio: AudioContent = insert_row(tx.as_mut(), &new).await?;
        if audio.is_currently_playing {
            sqlx::query(
                "UPDATE audio_content SET is_currently_playing = FALSE
                 WHERE id <> $1 AND is_currently_playing = TRUE",
            )
            .bind(audio.id)
            .execute(tx.as_mut())
            .await?;
        }

        tx.commit().await?;
        Ok(audio)
    }

    async fn update_audio(&self, id: i32, patch: AudioPatch) -> Result<Option<AudioContent>> {
        Ok(update_row(&self.pool, id, &patch).await?)
    }

    async fn delete_audio(&self, id: i32) -> Result<bool> {
        Ok(delete_row::<AudioContent, _>(&self.pool, id).await?)
    }

    async fn set_current_audio(&self, id: i32) -> Result<Option<AudioContent>> {
        let mut tx = self.pool.begin().await?;

        let audio = sqlx::query_as::<_, AudioContent>(
            "UPDATE audio_content SET is_currently_playing = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(tx.as_mut())
        .await?;

        let Some(audio) = audio else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "UPDATE audio_content SET is_currently_playing = FALSE
             WHERE id <> $1 AND is_currently_playing = TRUE",
        )
        .bind(id)
        .execute(tx.as_mut())
        .await?;

        tx.commit().await?;
        Ok(Some(audio))
    }

    async fn clear_current_audio(&self, id: i32) -> Result<Option<AudioContent>> {
        Ok(sqlx::query_as::<_, AudioContent>(
            "UPDATE audio_content SET is_currently_playing = FALSE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn videos(&self) -> Result<Vec<Video>> {
        Ok(
            sqlx::query_as::<_, Video>("SELECT * FROM videos ORDER BY published_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn video(&self, id: i32) -> Result<Option<Video>> {
        Ok(fetch_by_id(&self.pool, id).await?)
    }

    async fn create_video(&self, new: NewVideo) -> Result<Video> {
        Ok(insert_row(&self.pool, &new).await?)
    }

    async fn update_video(&self, id: i32, patch: VideoPatch) -> Result<Option<Video>> {
        Ok(update_row(&self.pool, id, &patch).await?)
    }

    async fn delete_video(&self, id: i32) -> Result<bool> {
        Ok(delete_row::<Video, _>(&self.pool, id).await?)
    }

    async fn schedules(&self) -> Result<Vec<Schedule>> {
        Ok(sqlx::query_as::<_, Schedule>(
            "SELECT * FROM schedules WHERE is_active = TRUE ORDER BY mosque_name, id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn schedules_by_mosque(&self, mosque_name: &str) -> Result<Vec<Schedule>> {
        Ok(sqlx::query_as::<_, Schedule>(
            r#"
            SELECT * FROM schedules
            WHERE is_active = TRUE AND mosque_name = $1
            ORDER BY mosque_name, id
            "#,
        )
        .bind(mosque_name)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn schedule(&self, id: i32) -> Result<Option<Schedule>> {
        Ok(fetch_by_id(&self.pool, id).await?)
    }

    async fn create_schedule(&self, new: NewSchedule) -> Result<Schedule> {
        Ok(insert_row(&self.pool, &new).await?)
    }

    async fn update_schedule(&self, id: i32, patch: SchedulePatch) -> Result<Option<Schedule>> {
        Ok(update_row(&self.pool, id, &patch).await?)
    }

    async fn delete_schedule(&self, id: i32) -> Result<bool> {
        Ok(delete_row::<Schedule, _>(&self.pool, id).await?)
    }
}
