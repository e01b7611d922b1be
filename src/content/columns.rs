use serde::{Deserialize, Deserializer};
use sqlx::postgres::PgRow;

/// 可空列的补丁字段：缺省为 `None`，显式的 `null` 为 `Some(None)`
///
/// 需配合 `#[serde(default)]` 使用。
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// 写入数据库的单个列值
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    NullableText(Option<String>),
    Int(i32),
    Bool(bool),
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        Value::NullableText(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

/// 内容表
///
/// 结构体字段名即 snake_case 列名，JSON 名由 `serde(rename_all = "camelCase")` 决定，
/// 两种存储实现共用同一份映射。
pub trait Table: for<'r> sqlx::FromRow<'r, PgRow> + Clone + Send + Sync + Unpin + 'static {
    /// 表名
    const NAME: &'static str;

    fn id(&self) -> i32;
}

/// 插入或更新载荷中需要写入的列
pub trait Columns {
    /// 返回 `(列名, 值)` 列表，列名由字段名生成
    fn columns(&self) -> Vec<(&'static str, Value)>;
}

/// 为插入载荷实现 [`Columns`]，列出的每个字段都会写入。
macro_rules! insert_columns {
    ($new:ident { $($field:ident),+ $(,)? }) => {
        impl $crate::content::Columns for $new {
            fn columns(&self) -> Vec<(&'static str, $crate::content::Value)> {
                vec![$((stringify!($field), self.$field.clone().into())),+]
            }
        }
    };
}

/// 为补丁载荷实现 [`Columns`] 和 `apply`，只有 `Some` 的字段会被写入。
macro_rules! patch_columns {
    ($patch:ident => $record:ident { $($field:ident),+ $(,)? }) => {
        impl $patch {
            /// 把补丁写入已有记录
            pub fn apply(self, record: &mut $record) {
                $(
                    if let Some(value) = self.$field {
                        record.$field = value.into();
                    }
                )+
            }

            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())+
            }
        }

        impl $crate::content::Columns for $patch {
            fn columns(&self) -> Vec<(&'static str, $crate::content::Value)> {
                let mut columns = Vec::new();
                $(
                    if let Some(value) = &self.$field {
                        columns.push((stringify!($field), value.clone().into()));
                    }
                )+
                columns
            }
        }
    };
}

pub(crate) use {insert_columns, patch_columns};
