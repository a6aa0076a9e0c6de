//! Picture proxy
//!
//! Avatars and product photos live on Telegram's servers. The API streams
//! them through so the storefront never sees the bot token.

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::stream::BoxStream;
use std::sync::Arc;

use super::ApiState;
use crate::core::error::{AppError, AppResult};

/// Byte stream of a remote picture
pub type MediaStream = BoxStream<'static, Result<Bytes, AppError>>;

/// Source of Telegram-hosted pictures
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Latest profile photo of a user.
    ///
    /// `NotFound` when the user has none, `Internal` when the file cannot be
    /// resolved, `Upstream` when the download fails.
    async fn avatar(&self, user_id: i64) -> AppResult<MediaStream>;

    /// A photo previously sent to the bot, by file id.
    async fn image(&self, file_id: &str) -> AppResult<MediaStream>;
}

/// Media source for deployments without a bot token.
pub struct UnavailableMedia;

#[async_trait]
impl MediaSource for UnavailableMedia {
    async fn avatar(&self, _user_id: i64) -> AppResult<MediaStream> {
        Err(AppError::NotFound("Avatar not found".to_string()))
    }

    async fn image(&self, _file_id: &str) -> AppResult<MediaStream> {
        Err(AppError::NotFound("Image not found".to_string()))
    }
}

fn jpeg_response(stream: MediaStream) -> Response {
    ([(header::CONTENT_TYPE, "image/jpeg")], Body::from_stream(stream)).into_response()
}

/// GET /avatar/{user_id}
pub async fn get_avatar(State(state): State<Arc<ApiState>>, Path(user_id): Path<i64>) -> AppResult<Response> {
    let stream = state.media.avatar(user_id).await?;
    Ok(jpeg_response(stream))
}

/// GET /images/{file_id}
pub async fn get_image(State(state): State<Arc<ApiState>>, Path(file_id): Path<String>) -> AppResult<Response> {
    let stream = state.media.image(&file_id).await?;
    Ok(jpeg_response(stream))
}
