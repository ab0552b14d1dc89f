//! 歌单编辑弹窗的状态层

use crate::sdk::error::{ApiError, ApiResult};
use crate::sdk::playlist::api::PlaylistApi;
use crate::sdk::playlist::models::{ImageUpload, Playlist, PlaylistDraft};
use crate::sdk::toast::ToastCenter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{debug, info};

/// 持有期间 `saving=true`；保存的 future 中途被丢弃时也会复位
struct SavingGuard<'a>(&'a AtomicBool);

impl<'a> SavingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct PlaylistEditor {
    api: PlaylistApi,
    toasts: ToastCenter,
    original: Mutex<Playlist>,
    draft: Mutex<PlaylistDraft>,
    saving: AtomicBool,
}

impl PlaylistEditor {
    pub fn new(api: PlaylistApi, toasts: ToastCenter, playlist: Playlist) -> Self {
        let draft = PlaylistDraft::from(&playlist);
        Self {
            api,
            toasts,
            original: Mutex::new(playlist),
            draft: Mutex::new(draft),
            saving: AtomicBool::new(false),
        }
    }

    pub fn playlist(&self) -> Option<Playlist> {
        self.original.lock().ok().map(|p| p.clone())
    }

    pub fn draft(&self) -> PlaylistDraft {
        self.draft.lock().map(|d| d.clone()).unwrap_or_default()
    }

    pub fn edit(&self, f: impl FnOnce(&mut PlaylistDraft)) {
        if let Ok(mut draft) = self.draft.lock() {
            f(&mut draft);
        }
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    /// 草稿与服务端数据是否不同
    pub fn is_dirty(&self) -> bool {
        match self.playlist() {
            Some(p) => PlaylistDraft::from(&p) != self.draft().normalized(),
            None => false,
        }
    }

    /// 保存草稿；名称为空时给出警告且不发请求
    pub async fn save(&self) -> ApiResult<()> {
        let Some(current) = self.playlist() else {
            return Err(ApiError::Cancelled);
        };
        let Some(guard) = SavingGuard::acquire(&self.saving) else {
            debug!("[PlaylistEditor] 已有保存请求在进行中");
            return Err(ApiError::Busy);
        };
        let draft = self.draft();
        let res = self.api.update_playlist(&current.id, &draft).await;
        drop(guard);

        match res {
            Ok(resp) => {
                let updated = resp.playlist.unwrap_or_else(|| {
                    let normalized = draft.normalized();
                    Playlist {
                        nombre: normalized.nombre,
                        descripcion: Some(normalized.descripcion).filter(|d| !d.is_empty()),
                        es_publica: normalized.es_publica,
                        ..current.clone()
                    }
                });
                info!("[PlaylistEditor] 歌单 {} 已保存", updated.id);
                self.replace(updated);
                let text = resp
                    .message
                    .or(resp.mensaje)
                    .unwrap_or_else(|| "Playlist actualizada".to_string());
                self.toasts.success(text).await;
                Ok(())
            }
            Err(e) => {
                self.toasts.report("PlaylistEditor", &e).await;
                Err(e)
            }
        }
    }

    /// 上传封面，成功后更新本地封面地址
    pub async fn upload_cover(&self, image: ImageUpload) -> ApiResult<()> {
        let Some(current) = self.playlist() else {
            return Err(ApiError::Cancelled);
        };
        match self.api.upload_cover(&current.id, image).await {
            Ok(resp) => {
                if let Some(url) = resp.url {
                    if let Ok(mut original) = self.original.lock() {
                        original.portada_url = Some(url);
                    }
                }
                self.toasts
                    .success(resp.message.unwrap_or_else(|| "Portada actualizada".to_string()))
                    .await;
                Ok(())
            }
            Err(e) => {
                self.toasts.report("PlaylistEditor", &e).await;
                Err(e)
            }
        }
    }

    fn replace(&self, playlist: Playlist) {
        let draft = PlaylistDraft::from(&playlist);
        if let Ok(mut original) = self.original.lock() {
            *original = playlist;
        }
        if let Ok(mut d) = self.draft.lock() {
            *d = draft;
        }
    }
}
