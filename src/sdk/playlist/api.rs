//! 歌单编辑与图片上传 API

use crate::sdk::error::{ApiError, ApiResult};
use crate::sdk::http::ApiClient;
use crate::sdk::playlist::models::{ImageUpload, Playlist, PlaylistDraft, ProfileImage};
use reqwest::multipart::Form;
use crate::sdk::types::str_field;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, info};

/// 更新歌单的响应，服务端可能只返回提示信息，也可能只返回 `true`
#[derive(Debug, Clone, Default)]
pub struct PlaylistResp {
    pub playlist: Option<Playlist>,
    pub message: Option<String>,
    pub mensaje: Option<String>,
}

impl<'de> Deserialize<'de> for PlaylistResp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        // 请求已经成功，歌单字段解析不了时只是拿不到新数据
        let playlist = value
            .get("playlist")
            .filter(|p| !p.is_null())
            .and_then(|p| match serde_json::from_value(p.clone()) {
                Ok(p) => Some(p),
                Err(e) => {
                    debug!("[PlaylistAPI] 响应中的 playlist 无法解析: {}", e);
                    None
                }
            });
        Ok(Self {
            playlist,
            message: str_field(&value, "message"),
            mensaje: str_field(&value, "mensaje"),
        })
    }
}

/// 上传后服务端返回的图片地址
#[derive(Debug, Clone, Default)]
pub struct UploadResp {
    pub url: Option<String>,
    pub message: Option<String>,
}

impl<'de> Deserialize<'de> for UploadResp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let url = ["url", "portadaUrl", "avatarUrl", "bannerUrl"]
            .into_iter()
            .find_map(|key| str_field(&value, key));
        Ok(Self {
            url,
            message: str_field(&value, "message"),
        })
    }
}

#[derive(Clone)]
pub struct PlaylistApi {
    http: ApiClient,
}

impl PlaylistApi {
    pub fn new(http: ApiClient) -> Self {
        Self { http }
    }

    /// 更新歌单基本信息，名称为空时不发请求
    pub async fn update_playlist(
        &self,
        playlist_id: &str,
        draft: &PlaylistDraft,
    ) -> ApiResult<PlaylistResp> {
        if playlist_id.trim().is_empty() {
            return Err(ApiError::Validation("Identificador de playlist vacío".into()));
        }
        draft.validate()?;
        info!("[PlaylistAPI] ✏️ 更新歌单 {}", playlist_id);
        let resp: Option<PlaylistResp> = self
            .http
            .put_json(
                &format!("/playlists/{playlist_id}"),
                &draft.normalized(),
                "更新歌单",
            )
            .await?;
        Ok(resp.unwrap_or_default())
    }

    /// 上传歌单封面（multipart 字段 `portada`）
    pub async fn upload_cover(&self, playlist_id: &str, image: ImageUpload) -> ApiResult<UploadResp> {
        if playlist_id.trim().is_empty() {
            return Err(ApiError::Validation("Identificador de playlist vacío".into()));
        }
        self.upload(&format!("/playlists/{playlist_id}/portada"), "portada", image, "上传歌单封面")
            .await
    }

    /// 上传头像或横幅
    pub async fn upload_profile_image(
        &self,
        kind: ProfileImage,
        image: ImageUpload,
    ) -> ApiResult<UploadResp> {
        self.upload(
            &format!("/usuarios/perfil/{}", kind.field()),
            kind.field(),
            image,
            "上传个人资料图片",
        )
        .await
    }

    async fn upload(
        &self,
        path: &str,
        field: &'static str,
        image: ImageUpload,
        operation_name: &str,
    ) -> ApiResult<UploadResp> {
        image.validate()?;
        info!(
            "[PlaylistAPI] 📤 上传 {} ({} 字节) -> {}",
            image.file_name,
            image.bytes.len(),
            path
        );
        let form = Form::new().part(field, image.into_part()?);
        let resp: Option<UploadResp> = self.http.post_multipart(path, form, operation_name).await?;
        Ok(resp.unwrap_or_default())
    }
}
