//! 歌单模块：歌单编辑、封面与个人资料图片上传

pub mod api;
pub mod editor;
pub mod models;

pub use api::{PlaylistApi, PlaylistResp, UploadResp};
pub use editor::PlaylistEditor;
pub use models::{ImageUpload, Playlist, PlaylistDraft, ProfileImage};
