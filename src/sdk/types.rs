//! 各模块共用的 DTO 辅助

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 反序列化数组字段，处理 null 值
pub(crate) fn deserialize_vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// 取对象中的字符串字段；不是对象或不是字符串时为 None
pub(crate) fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// 只带提示信息的成功响应（`message` 或 `mensaje`）
///
/// 2xx 的 body 不一定是对象（`true`、`"ok"`、`[]` 都见过），
/// 取不到字符串提示时两者都是 None，不当作解码失败。
#[derive(Debug, Clone, Default)]
pub struct ServerMessage {
    pub message: Option<String>,
    pub mensaje: Option<String>,
}

impl<'de> Deserialize<'de> for ServerMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

impl ServerMessage {
    pub(crate) fn from_value(value: &Value) -> Self {
        Self {
            message: str_field(value, "message"),
            mensaje: str_field(value, "mensaje"),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.mensaje.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    /// 服务端提示优先，否则使用默认文案
    pub fn text_or(&self, fallback: &str) -> String {
        self.text().unwrap_or(fallback).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(default, deserialize_with = "deserialize_vec_or_null")]
        items: Vec<u32>,
    }

    #[test]
    fn null_and_missing_arrays_become_empty() {
        let w: Wrapper = serde_json::from_str(r#"{"items": null}"#).unwrap();
        assert!(w.items.is_empty());
        let w: Wrapper = serde_json::from_str(r#"{}"#).unwrap();
        assert!(w.items.is_empty());
        let w: Wrapper = serde_json::from_str(r#"{"items": [1, 2]}"#).unwrap();
        assert_eq!(w.items, vec![1, 2]);
    }

    #[test]
    fn server_message_prefers_message_field() {
        let m: ServerMessage =
            serde_json::from_str(r#"{"message":"ok","mensaje":"vale"}"#).unwrap();
        assert_eq!(m.text(), Some("ok"));
        let m: ServerMessage = serde_json::from_str(r#"{"mensaje":"Listo"}"#).unwrap();
        assert_eq!(m.text_or("x"), "Listo");
        assert_eq!(ServerMessage::default().text_or("Hecho"), "Hecho");
    }

    #[test]
    fn non_object_success_bodies_carry_no_message() {
        for body in [r#"true"#, r#""ok""#, r#"[]"#, r#"{"message":{"code":1}}"#, r#"{"mensaje":3}"#] {
            let m: ServerMessage = serde_json::from_str(body).unwrap();
            assert_eq!(m.text(), None, "body {body}");
        }
        let m: Option<ServerMessage> = serde_json::from_str("null").unwrap();
        assert!(m.is_none());
        let m: ServerMessage = serde_json::from_str(r#"{"message":{"x":1},"mensaje":"Hecho"}"#).unwrap();
        assert_eq!(m.text_or("x"), "Hecho");
    }
}
