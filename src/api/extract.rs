use axum::{
    Json,
    body::Bytes,
    extract::{FromRef, FromRequest, FromRequestParts, Path, Request},
    http::{HeaderMap, header, request::Parts},
};
use serde::de::DeserializeOwned;

use crate::{
    content::Validate,
    error::{ApiError, Error},
    state::AdminKey,
};

/// 经过校验的 JSON 请求体
///
/// 解析失败或校验失败都返回 400。
#[derive(Debug)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Payload(value))
    }
}

/// 原始请求体，超出长度限制时返回 413
#[derive(Debug)]
pub struct RawBody(pub Bytes);

impl<S> FromRequest<S> for RawBody
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Ok(RawBody(Bytes::from_request(req, state).await?))
    }
}

/// 路径中的单个文本参数
#[derive(Debug, Clone)]
pub struct TextPath(pub String);

impl<S> FromRequestParts<S> for TextPath
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<String>::from_request_parts(parts, state).await?;
        Ok(TextPath(value))
    }
}

/// 路径中的整数 id，无法解析时返回 400
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i32);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TextPath(raw) = TextPath::from_request_parts(parts, state).await?;
        raw.parse()
            .map(IdPath)
            .map_err(|_| Error::validation(format!("invalid id: {raw}")))
    }
}

/// 查询参数，解析失败时返回 400
#[derive(Debug)]
pub struct Params<T>(pub T);

impl<S, T> FromRequestParts<S> for Params<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum_extra::extract::Query(value) =
            axum_extra::extract::Query::<T>::from_request_parts(parts, state)
                .await
                .map_err(|e| Error::validation(e.to_string()))?;
        Ok(Params(value))
    }
}

/// 管理员身份
///
/// 从 `Authorization: Bearer <key>` 或 `x-api-key` 读取密钥。
/// 服务端未配置密钥时一律拒绝。
#[derive(Debug, Clone, Copy)]
pub struct Admin;

impl<S> FromRequestParts<S> for Admin
where
    AdminKey: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AdminKey(expected) = AdminKey::from_ref(state);

        let authorized = match (expected, presented_key(&parts.headers)) {
            (Some(expected), Some(given)) => key_matches(expected.as_bytes(), given.as_bytes()),
            _ => false,
        };

        if authorized {
            Ok(Admin)
        } else {
            Err(ApiError::Unauthorized.into())
        }
    }
}

fn presented_key(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            // 认证方案名不区分大小写
            let (scheme, token) = v.trim().split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then_some(token)
        })
        .map(str::trim);

    bearer.or_else(|| {
        headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
    })
}

/// 比较所有字节后才给出结果
fn key_matches(expected: &[u8], given: &[u8]) -> bool {
    if expected.len() != given.len() {
        return false;
    }
    expected
        .iter()
        .zip(given)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
