use std::io;

use axum::{
    Json,
    extract::rejection::{BytesRejection, JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// 面向调用方的错误
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Media storage is not configured")]
    MediaUnavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    /// 对象存储返回非成功状态码
    #[error("storage responded {status}: {message}")]
    Storage { status: u16, message: String },

    #[error(transparent)]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Seed(#[from] serde_yaml::Error),

    #[error(transparent)]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error(transparent)]
    ApiError(#[from] ApiError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn not_found(what: &'static str) -> Self {
        ApiError::NotFound(what).into()
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into()).into()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::validation(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::validation(rejection.body_text())
    }
}

impl From<BytesRejection> for Error {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text()).into()
        } else {
            Error::validation(rejection.body_text())
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            Error::ApiError(api_error) => match api_error {
                ApiError::NotFound(what) => (StatusCode::NOT_FOUND, what.to_string()),
                ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
                ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
                ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
                ApiError::MediaUnavailable => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Media storage is not configured".to_string(),
                ),
            },
            Error::Storage { status, message } => {
                tracing::error!(status, %message, "object storage error");
                (StatusCode::BAD_GATEWAY, "Bad Gateway".to_string())
            }
            Error::Reqwest(e) => {
                tracing::error!(%e, "object storage request failed");
                (StatusCode::BAD_GATEWAY, "Bad Gateway".to_string())
            }
            Error::Sqlx(e) => {
                tracing::error!(%e, "sqlx error");
                internal()
            }
            Error::Io(e) => {
                tracing::error!(%e, "io error");
                internal()
            }
            e @ (Error::Config(_) | Error::Seed(_) | Error::InvalidHeader(_)) => {
                tracing::error!(%e, "unexpected error");
                internal()
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error".to_string(),
    )
}
