use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    extract::Request,
    http::{Response, StatusCode, header},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use darsa::{
    api,
    error::Result,
    media::{Bucket, MediaStore, StoredObject, Upload},
    state::{AdminKey, AppState, Media},
    storage::MemoryStore,
};

const ADMIN_KEY: &str = "secret";

/// 记录上传请求的假媒体存储
#[derive(Default)]
struct FakeMedia {
    uploads: Mutex<Vec<(Bucket, String, usize)>>,
}

#[async_trait]
impl MediaStore for FakeMedia {
    async fn upload(&self, upload: Upload) -> Result<StoredObject> {
        self.uploads
            .lock()
            .unwrap()
            .push((upload.bucket, upload.path.clone(), upload.bytes.len()));
        Ok(StoredObject {
            bucket: upload.bucket.to_string(),
            public_url: self.public_url(upload.bucket, &upload.path),
            path: upload.path,
        })
    }

    fn public_url(&self, bucket: Bucket, path: &str) -> String {
        format!("https://media.test/{bucket}/{path}")
    }

    async fn ensure_buckets(&self) -> Result<()> {
        Ok(())
    }
}

struct TestApp {
    router: Router,
    media: Arc<FakeMedia>,
}

impl TestApp {
    fn new() -> Self {
        Self::with(AdminKey::new(ADMIN_KEY), true)
    }

    fn with(admin_key: AdminKey, with_media: bool) -> Self {
        let store = Arc::new(MemoryStore::seeded().expect("加载示例数据失败"));
        let media = Arc::new(FakeMedia::default());
        let shared: Option<darsa::media::SharedMedia> = if with_media {
            Some(media.clone())
        } else {
            None
        };

        let app = AppState::new(store, Media(shared), admin_key);
        Self {
            router: api::setup_route(app),
            media,
        }
    }

    async fn request(&self, req: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(req)
            .await
            .expect("oneshot fail")
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let req = Request::get(uri).body(Body::empty()).expect("请求失败");
        read(self.request(req).await).await
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {ADMIN_KEY}"));
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("请求失败");
        read(self.request(req).await).await
    }
}

async fn read(resp: Response<Body>) -> (StatusCode, Value) {
    let status = resp.status();
    let data = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("读取数据失败");
    let json = if data.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&data).expect("反序列化失败")
    };
    (status, json)
}

fn new_article() -> Value {
    json!({
        "title": "Nguzo za Imani",
        "content": "Maelezo kamili",
        "excerpt": "Muhtasari",
        "coverImage": "https://example.com/cover.jpg",
        "category": "Akidah"
    })
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
}

#[tokio::test]
async fn test_article_lifecycle() {
    let app = TestApp::new();

    let (status, created) = app.send("POST", "/api/articles", Some(new_article())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["author"], "Sheikh Shahid");
    assert_eq!(created["readingTime"], 5);
    let id = created["id"].as_i64().unwrap();
    assert!(id >= 100, "新 id 不应与示例数据冲突");

    let (status, fetched) = app.get(&format!("/api/articles/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (_, list) = app.get("/api/articles").await;
    assert_eq!(list.as_array().unwrap().len(), 4);
    assert_eq!(list[0]["id"], id, "最新的文章排在最前");

    let (status, patched) = app
        .send(
            "PATCH",
            &format!("/api/articles/{id}"),
            Some(json!({ "title": "Nguzo Sita za Imani" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["title"], "Nguzo Sita za Imani");
    assert_eq!(patched["publishedAt"], created["publishedAt"]);

    let (status, _) = app.send("DELETE", &format!("/api/articles/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get(&format!("/api/articles/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Article not found");

    let (status, _) = app.send("DELETE", &format!("/api/articles/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_article_category_filter() {
    let app = TestApp::new();

    let (status, list) = app.get("/api/articles?category=Fiqh").await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["category"], "Fiqh");

    let (_, list) = app.get("/api/articles?category=fiqh").await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_requests_are_bad_request() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/articles/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let mut article = new_article();
    article["title"] = json!("   ");
    let (status, _) = app.send("POST", "/api/articles", Some(article)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut article = new_article();
    article["id"] = json!(7);
    let (status, _) = app.send("POST", "/api/articles", Some(article)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "不允许客户端指定 id");

    let (status, _) = app
        .send(
            "POST",
            "/api/videos",
            Some(json!({
                "title": "Darsa",
                "description": "Maelezo",
                "youtubeId": "short",
                "thumbnailUrl": "https://example.com/t.jpg",
                "duration": "10:00"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_writes_require_admin_key() {
    let app = TestApp::new();

    let req = Request::post("/api/articles")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(new_article().to_string()))
        .unwrap();
    assert_eq!(app.request(req).await.status(), StatusCode::UNAUTHORIZED);

    let req = Request::delete("/api/articles/1")
        .header("x-api-key", "wrong")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.request(req).await.status(), StatusCode::UNAUTHORIZED);

    let req = Request::delete("/api/articles/1")
        .header("x-api-key", ADMIN_KEY)
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.request(req).await.status(), StatusCode::NO_CONTENT);

    // 读操作不受影响
    let (status, _) = app.get("/api/articles").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_writes_rejected_without_configured_key() {
    let app = TestApp::with(AdminKey::default(), true);
    let (status, _) = app.send("POST", "/api/articles", Some(new_article())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_current_audio() {
    let app = TestApp::new();

    let (status, current) = app.get("/api/audio/current").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["id"], 1);
    assert_eq!(current["isCurrentlyPlaying"], true);

    let (status, audio) = app.send("PUT", "/api/audio/2/current", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audio["id"], 2);

    let (_, current) = app.get("/api/audio/current").await;
    assert_eq!(current["id"], 2);

    let (_, list) = app.get("/api/audio").await;
    let playing = list
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["isCurrentlyPlaying"] == true)
        .count();
    assert_eq!(playing, 1);

    let (status, _) = app.send("PUT", "/api/audio/999/current", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("DELETE", "/api/audio/2", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = app.get("/api/audio/current").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No current audio found");
}

#[tokio::test]
async fn test_stop_current_audio() {
    let app = TestApp::new();

    let (status, audio) = app.send("DELETE", "/api/audio/1/current", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audio["isCurrentlyPlaying"], false);

    let (status, _) = app.get("/api/audio/current").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("DELETE", "/api/audio/999/current", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 停止后仍可重新设为当前
    let (status, _) = app.send("PUT", "/api/audio/1/current", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, current) = app.get("/api/audio/current").await;
    assert_eq!(current["id"], 1);

    let req = Request::delete("/api/audio/1/current")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.request(req).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_playing_audio_replaces_current() {
    let app = TestApp::new();

    let (status, created) = app
        .send(
            "POST",
            "/api/audio",
            Some(json!({
                "title": "Darsa ya Ijumaa",
                "description": "Maelezo",
                "audioUrl": "https://example.com/a.mp3",
                "coverImage": "https://example.com/c.jpg",
                "duration": "45:00",
                "isCurrentlyPlaying": true
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, current) = app.get("/api/audio/current").await;
    assert_eq!(current["id"], created["id"]);
    let (_, old) = app.get("/api/audio/1").await;
    assert_eq!(old["isCurrentlyPlaying"], false);
}

#[tokio::test]
async fn test_videos() {
    let app = TestApp::new();

    let (_, list) = app.get("/api/videos").await;
    assert_eq!(list.as_array().unwrap().len(), 4);

    let (status, body) = app.get("/api/videos/404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Video not found");

    let (status, created) = app
        .send(
            "POST",
            "/api/videos",
            Some(json!({
                "title": "Darsa",
                "description": "Maelezo",
                "youtubeId": "dQw4w9WgXcQ",
                "thumbnailUrl": "https://example.com/t.jpg",
                "duration": "10:00"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["youtubeId"], "dQw4w9WgXcQ");
}

#[tokio::test]
async fn test_schedules() {
    let app = TestApp::new();

    let (_, all) = app.get("/api/schedules").await;
    assert_eq!(all.as_array().unwrap().len(), 14);

    let (status, rows) = app.get("/api/schedules/Masjid%20Aisha%20Mombasa").await;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r["mosqueName"] == "Masjid Aisha Mombasa"));

    let (_, rows) = app.get("/api/schedules/Masjid%20Isiyojulikana").await;
    assert!(rows.as_array().unwrap().is_empty());

    let (status, _) = app
        .send("PATCH", "/api/schedules/1", Some(json!({ "isActive": false })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, all) = app.get("/api/schedules").await;
    assert_eq!(all.as_array().unwrap().len(), 13);

    let (status, _) = app
        .send(
            "POST",
            "/api/schedules",
            Some(json!({
                "mosqueName": "Masjid X",
                "mosqueLocation": "Malindi",
                "dayOfWeek": "Jumatano",
                "timeSlot": "Baada Ya Isha",
                "subject": "Tafseer",
                "teacher": "Ustadh Ali"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .send(
            "POST",
            "/api/schedules",
            Some(json!({
                "mosqueName": "Masjid X",
                "mosqueLocation": "Malindi",
                "dayOfWeek": "Monday",
                "timeSlot": "Baada Ya Isha",
                "subject": "Tafseer",
                "teacher": "Ustadh Ali"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send("DELETE", "/api/schedules/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_schedule_patch_null_clears_additional_info() {
    let app = TestApp::new();

    let (status, row) = app
        .send("PATCH", "/api/schedules/1", Some(json!({ "additionalInfo": null })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row["additionalInfo"], Value::Null);

    // 未出现的字段保持不变
    let (_, row) = app
        .send("PATCH", "/api/schedules/2", Some(json!({ "subject": "Tafseer" })))
        .await;
    assert_eq!(row["additionalInfo"], "Assaalllin");
}

#[tokio::test]
async fn test_path_and_body_errors_are_json() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/schedules/%FF").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let req = Request::post("/api/media/audio-files?name=a.mp3")
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_KEY}"))
        .header(header::CONTENT_TYPE, "audio/mpeg")
        .body(Body::from(vec![0u8; 50 * 1024 * 1024 + 1]))
        .unwrap();
    let (status, body) = read(app.request(req).await).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["message"].is_string());
    assert!(app.media.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_lowercase_bearer_scheme() {
    let app = TestApp::new();

    let req = Request::delete("/api/articles/1")
        .header(header::AUTHORIZATION, format!("bearer {ADMIN_KEY}"))
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.request(req).await.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_mosque_carousel() {
    let app = TestApp::new();

    let (_, groups) = app.get("/api/mosques").await;
    let groups = groups.as_array().unwrap();
    assert_eq!(groups.len(), 4);
    assert_eq!(groups[0]["mosqueName"], "Masjid Aisha Mombasa");
    assert_eq!(groups[0]["schedules"].as_array().unwrap().len(), 4);

    let (status, slide) = app.get("/api/mosques/slide?index=5&width=1280").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slide["index"], 1);
    assert_eq!(slide["total"], 4);
    let mosques = slide["mosques"].as_array().unwrap();
    assert_eq!(mosques.len(), 2);
    assert_eq!(mosques[0]["mosqueName"], groups[1]["mosqueName"]);

    let (_, slide) = app.get("/api/mosques/slide?index=3&width=375").await;
    let mosques = slide["mosques"].as_array().unwrap();
    assert_eq!(mosques.len(), 1);
    assert_eq!(mosques[0]["mosqueName"], groups[3]["mosqueName"]);

    let (status, _) = app.get("/api/mosques/slide?index=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_media_upload() {
    let app = TestApp::new();

    let upload = |bucket: &str, mime: &str, body: &'static [u8]| {
        Request::post(format!("/api/media/{bucket}?name=jalada%20jipya.png"))
            .header(header::AUTHORIZATION, format!("Bearer {ADMIN_KEY}"))
            .header(header::CONTENT_TYPE, mime)
            .body(Body::from(body))
            .unwrap()
    };

    let (status, body) = read(app.request(upload("images", "image/png", b"png")).await).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["bucket"], "images");
    let path = body["path"].as_str().unwrap();
    assert!(path.ends_with("-jalada-jipya.png"), "{path}");
    assert_eq!(body["publicUrl"], format!("https://media.test/images/{path}"));
    assert_eq!(app.media.uploads.lock().unwrap().len(), 1);

    let (status, _) = read(app.request(upload("images", "audio/mpeg", b"mp3")).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = read(app.request(upload("videos", "image/png", b"png")).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 校验失败的请求不会到达存储
    assert_eq!(app.media.uploads.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_media_unavailable_without_storage() {
    let app = TestApp::with(AdminKey::new(ADMIN_KEY), false);

    let req = Request::post("/api/media/images?name=a.png")
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_KEY}"))
        .header(header::CONTENT_TYPE, "image/png")
        .body(Body::from("png"))
        .unwrap();
    let (status, _) = read(app.request(req).await).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
