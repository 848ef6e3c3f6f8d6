//! 请求体字段提取
//!
//! 请求体按 JSON 对象读取，不要求 `Content-Type`。字段逐个映射为 [`RawField`]，
//! 类型错误与缺失一样进入违规列表，而不是在反序列化阶段直接失败。

use axum::body::Bytes;
use domain::RawField;
use serde_json::{Map, Value};

use crate::error::ApiError;

#[derive(Debug, Default)]
pub(crate) struct BodyFields(Map<String, Value>);

impl BodyFields {
    /// 空请求体视为空对象。
    pub(crate) fn parse(body: &Bytes) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) => Err(ApiError::validation(vec![
                "\"value\" must be of type object".to_string(),
            ])),
            Err(err) => {
                tracing::debug!(error = %err, "request body is not valid JSON");
                Err(ApiError::validation(vec![
                    "\"value\" must be valid JSON".to_string(),
                ]))
            }
        }
    }

    pub(crate) fn field(&self, key: &str) -> RawField {
        match self.0.get(key) {
            None => RawField::Missing,
            Some(Value::String(value)) => RawField::Text(value.clone()),
            Some(_) => RawField::NotText,
        }
    }

    /// 先取 `key`，缺失时再取 `alias`。
    pub(crate) fn field_or(&self, key: &str, alias: &str) -> RawField {
        match self.field(key) {
            RawField::Missing => self.field(alias),
            found => found,
        }
    }
}
