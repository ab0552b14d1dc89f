//! 歌单与个人资料图片模型

use crate::sdk::error::{ApiError, ApiResult};
use crate::sdk::friend::models::UserSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 歌单
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub es_publica: bool,
    #[serde(default)]
    pub portada_url: Option<String>,
    #[serde(default)]
    pub propietario: Option<UserSummary>,
    #[serde(default)]
    pub total_canciones: u32,
    #[serde(default)]
    pub fecha_actualizacion: Option<DateTime<Utc>>,
}

/// 编辑中的歌单字段，`PUT /playlists/:id` 的请求体
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDraft {
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub es_publica: bool,
}

impl PlaylistDraft {
    /// 名称必填
    pub fn validate(&self) -> ApiResult<()> {
        if self.nombre.trim().is_empty() {
            return Err(ApiError::Validation(
                "El nombre de la playlist es obligatorio".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn normalized(&self) -> Self {
        Self {
            nombre: self.nombre.trim().to_string(),
            descripcion: self.descripcion.trim().to_string(),
            es_publica: self.es_publica,
        }
    }
}

impl From<&Playlist> for PlaylistDraft {
    fn from(p: &Playlist) -> Self {
        Self {
            nombre: p.nombre.clone(),
            descripcion: p.descripcion.clone().unwrap_or_default(),
            es_publica: p.es_publica,
        }
    }
}

/// 个人资料图片位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileImage {
    Avatar,
    Banner,
}

impl ProfileImage {
    /// multipart 字段名，同时也是路径的最后一段
    pub fn field(&self) -> &'static str {
        match self {
            ProfileImage::Avatar => "avatar",
            ProfileImage::Banner => "banner",
        }
    }
}

/// 待上传的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// 从本地文件读取，MIME 类型按扩展名判断
    pub async fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("无效的文件名: {}", path.display()))?
            .to_string();
        let mime = mime_for(&file_name)
            .ok_or_else(|| anyhow::anyhow!("不支持的图片格式: {}", file_name))?;
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(file_name, mime, bytes))
    }

    pub fn validate(&self) -> ApiResult<()> {
        if self.bytes.is_empty() {
            return Err(ApiError::Validation("El archivo está vacío".into()));
        }
        Ok(())
    }

    pub(crate) fn into_part(self) -> ApiResult<reqwest::multipart::Part> {
        let part = reqwest::multipart::Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)?;
        Ok(part)
    }
}

fn mime_for(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_requires_name() {
        let draft = PlaylistDraft {
            nombre: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(draft.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn draft_serializes_camel_case() {
        let draft = PlaylistDraft {
            nombre: "Viaje".into(),
            descripcion: "Para la carretera".into(),
            es_publica: true,
        };
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            serde_json::json!({"nombre": "Viaje", "descripcion": "Para la carretera", "esPublica": true})
        );
    }

    #[test]
    fn mime_by_extension() {
        assert_eq!(mime_for("foto.JPG"), Some("image/jpeg"));
        assert_eq!(mime_for("banner.webp"), Some("image/webp"));
        assert_eq!(mime_for("notas.txt"), None);
        assert_eq!(mime_for("sin_extension"), None);
    }

    #[tokio::test]
    async fn from_path_reads_file() {
        let path = std::env::temp_dir().join(format!("portada-{}.png", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, b"\x89PNG").await.unwrap();

        let upload = ImageUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.mime, "image/png");
        assert_eq!(upload.bytes, b"\x89PNG");
        assert!(upload.validate().is_ok());

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
