use crate::error::{Error, Result};

/// 写入载荷的字段校验，失败时返回 400
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub(crate) fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(())
}

/// 补丁字段：出现时不能为空
pub(crate) fn not_blank(field: &str, value: Option<&String>) -> Result<()> {
    match value {
        Some(v) => required(field, v),
        None => Ok(()),
    }
}

pub(crate) fn positive(field: &str, value: i32) -> Result<()> {
    if value <= 0 {
        return Err(Error::validation(format!("{field} must be greater than 0")));
    }
    Ok(())
}

/// YouTube 视频 id 固定为 11 位 `[A-Za-z0-9_-]`
pub(crate) fn youtube_id(value: &str) -> Result<()> {
    let valid = value.len() == 11
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if !valid {
        return Err(Error::validation(format!("invalid youtubeId: {value}")));
    }
    Ok(())
}
