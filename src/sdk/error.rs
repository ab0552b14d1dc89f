//! SDK 统一错误类型
//!
//! 服务层函数统一返回 `ApiError`，界面层（各 Screen）在调用处捕获并转换为 Toast。

use thiserror::Error;

/// 服务端未返回可读错误信息时使用的兜底文案
pub const GENERIC_ERROR_MESSAGE: &str = "Ocurrió un error inesperado";

#[derive(Error, Debug)]
pub enum ApiError {
    /// 401：本地 token 已被清除，需要重新登录
    #[error("Sesión expirada, inicia sesión de nuevo")]
    Unauthorized,

    /// 非 2xx 响应，`message` 已从响应体中归一化
    #[error("{message}")]
    Http { status: u16, message: String },

    /// 网络层失败（连接失败、超时等）
    #[error("Error de red: {0}")]
    Network(#[from] reqwest::Error),

    /// 响应体无法解析
    #[error("Respuesta inválida del servidor: {0}")]
    Decode(#[from] serde_json::Error),

    /// 客户端校验失败，请求未发出
    #[error("{0}")]
    Validation(String),

    /// 同一列表已有进行中的操作
    #[error("Ya hay una acción en curso")]
    Busy,

    /// 所属视图已关闭，结果被丢弃
    #[error("Operación cancelada")]
    Cancelled,

    #[error("Configuración inválida: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// 面向用户展示的文案
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { message, .. } if !message.trim().is_empty() => message.clone(),
            ApiError::Http { .. } => GENERIC_ERROR_MESSAGE.to_string(),
            ApiError::Network(_) | ApiError::Decode(_) => GENERIC_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            _ => None,
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// 从错误响应体中提取错误信息：依次尝试 `message`、`mensaje`、`error` 字段
pub fn extract_error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "mensaje", "error"].iter().find_map(|key| {
        value
            .get(*key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_message_fields_in_order() {
        assert_eq!(
            extract_error_message(br#"{"message":"uno","mensaje":"dos"}"#).as_deref(),
            Some("uno")
        );
        assert_eq!(
            extract_error_message(br#"{"mensaje":"Usuario no encontrado"}"#).as_deref(),
            Some("Usuario no encontrado")
        );
        assert_eq!(
            extract_error_message(br#"{"error":"Forbidden"}"#).as_deref(),
            Some("Forbidden")
        );
    }

    #[test]
    fn blank_or_invalid_bodies_have_no_message() {
        assert_eq!(extract_error_message(br#"{"message":"   "}"#), None);
        assert_eq!(extract_error_message(b"<html>502</html>"), None);
        assert_eq!(extract_error_message(br#"{"error":{"code":1}}"#), None);
    }

    #[test]
    fn user_message_falls_back_to_generic_text() {
        let err = ApiError::Http {
            status: 500,
            message: String::new(),
        };
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
        assert_eq!(err.status(), Some(500));

        let err = ApiError::Validation("El motivo es obligatorio".into());
        assert_eq!(err.user_message(), "El motivo es obligatorio");
    }
}
