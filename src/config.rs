use std::{env, fs, io, path::Path};

use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_FILE: &str = "darsa.toml";

/// 运行配置
///
/// 先读取 TOML 文件（`DARSA_CONFIG` 指定，或当前目录下可选的 `darsa.toml`），
/// 再用环境变量覆盖。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 监听地址
    pub listen: String,
    /// 设置后使用 Postgres 存储，否则使用内存存储
    pub database_url: Option<String>,
    pub supabase: Option<SupabaseConfig>,
    /// 写操作所需的管理密钥
    pub admin_key: Option<String>,
}

/// 对象存储凭据，url 和 key 必须同时存在
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_role_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
            database_url: None,
            supabase: None,
            admin_key: None,
        }
    }
}

impl Config {
    /// 从配置文件和进程环境变量加载
    pub fn load() -> Result<Self> {
        let content = match env::var("DARSA_CONFIG") {
            Ok(path) => Some(fs::read_to_string(path)?),
            Err(_) => read_optional(DEFAULT_CONFIG_FILE)?,
        };

        Self::from_sources(content.as_deref(), |key| env::var(key).ok())
    }

    /// 用给定的 TOML 内容和变量查找函数构造配置
    pub fn from_sources(
        toml_content: Option<&str>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config: Config = match toml_content {
            Some(content) => toml::from_str(content)?,
            None => Config::default(),
        };

        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(listen) = var("DARSA_LISTEN") {
            config.listen = listen;
        }
        if let Some(url) = var("DATABASE_URL") {
            config.database_url = Some(url);
        }
        if let Some(key) = var("DARSA_ADMIN_KEY") {
            config.admin_key = Some(key);
        }

        let mut supabase = config.supabase.take().unwrap_or_default();
        if let Some(url) = var("SUPABASE_URL") {
            supabase.url = url;
        }
        if let Some(key) = var("SUPABASE_SERVICE_ROLE_KEY") {
            supabase.service_role_key = key;
        }
        if !supabase.url.is_empty() && !supabase.service_role_key.is_empty() {
            config.supabase = Some(supabase);
        }

        Ok(config)
    }
}

fn read_optional(path: impl AsRef<Path>) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
