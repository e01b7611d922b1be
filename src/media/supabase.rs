use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{Bucket, MediaStore, StoredObject, Upload};
use crate::error::{Error, Result};

/// Supabase Storage 客户端
///
/// 使用 service role key 访问存储 REST 接口，所有桶均为公开桶。
#[derive(Clone)]
pub struct SupabaseStorage {
    client: reqwest::Client,
    base_url: String,
}

impl SupabaseStorage {
    /// 使用项目地址和 service role key 创建客户端
    ///
    /// ```ignore
    /// let storage = SupabaseStorage::new("https://xyz.supabase.co", "service-role-key")?;
    /// ```
    pub fn new(url: &str, service_role_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {service_role_key}"))?,
        );
        headers.insert("apikey", HeaderValue::from_str(service_role_key)?);

        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/storage/v1/{}", self.base_url, path)
    }

    async fn bucket_ids(&self) -> Result<Vec<String>> {
        #[derive(Deserialize)]
        struct BucketInfo {
            id: String,
        }

        let resp = check(self.client.get(self.endpoint("bucket")).send().await?).await?;
        let buckets: Vec<BucketInfo> = resp.json().await?;
        Ok(buckets.into_iter().map(|b| b.id).collect())
    }

    async fn create_bucket(&self, bucket: Bucket) -> Result<()> {
        #[derive(Serialize)]
        struct CreateBucket<'a> {
            id: &'a str,
            name: &'a str,
            public: bool,
            file_size_limit: usize,
            allowed_mime_types: &'a [&'a str],
        }

        check(
            self.client
                .post(self.endpoint("bucket"))
                .json(&CreateBucket {
                    id: bucket.id(),
                    name: bucket.id(),
                    public: true,
                    file_size_limit: bucket.size_limit(),
                    allowed_mime_types: bucket.allowed_mime_types(),
                })
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }
}

/// 非 2xx 响应转为 [`Error::Storage`]
async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = resp.text().await.unwrap_or_default();
    Err(Error::Storage {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl MediaStore for SupabaseStorage {
    async fn upload(&self, upload: Upload) -> Result<StoredObject> {
        let url = self.endpoint(&format!("object/{}/{}", upload.bucket, upload.path));

        check(
            self.client
                .post(url)
                .header(header::CONTENT_TYPE, upload.content_type)
                .header("x-upsert", "false")
                .body(upload.bytes)
                .send()
                .await?,
        )
        .await?;

        tracing::info!(bucket = %upload.bucket, path = %upload.path, "media uploaded");

        Ok(StoredObject {
            bucket: upload.bucket.to_string(),
            public_url: self.public_url(upload.bucket, &upload.path),
            path: upload.path,
        })
    }

    fn public_url(&self, bucket: Bucket, path: &str) -> String {
        self.endpoint(&format!("object/public/{bucket}/{path}"))
    }

    async fn ensure_buckets(&self) -> Result<()> {
        let existing = self.bucket_ids().await?;

        for bucket in Bucket::ALL {
            if existing.iter().any(|id| id == bucket.id()) {
                continue;
            }
            self.create_bucket(bucket).await?;
            tracing::info!(%bucket, "media bucket created");
        }
        Ok(())
    }
}
