//! Picture source backed by the Bot API
//!
//! Resolves file ids with `getFile` and streams the bytes from the Bot API
//! file endpoint, so the storefront never needs the bot token.

use async_trait::async_trait;
use futures_util::StreamExt;
use teloxide::prelude::*;
use teloxide::types::{FileId, UserId};

use shopcore::api::{MediaSource, MediaStream};
use shopcore::{config, AppError, AppResult};

pub struct TelegramMedia {
    bot: Bot,
    http: reqwest::Client,
    file_base_url: String,
}

impl TelegramMedia {
    pub fn new(bot: Bot) -> AppResult<Self> {
        let http = reqwest::Client::builder().timeout(config::network::timeout()).build()?;
        let file_base_url = file_base_url(&config::bot_api::base_url(), bot.token());
        Ok(Self {
            bot,
            http,
            file_base_url,
        })
    }

    async fn download(&self, file_path: &str, failure: &str) -> AppResult<MediaStream> {
        let url = format!("{}/{}", self.file_base_url, file_path);
        let response = match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                log::warn!("File download answered {} for {}", response.status(), file_path);
                return Err(AppError::Upstream(failure.to_string()));
            }
            Err(e) => {
                log::warn!("File download failed for {}: {}", file_path, e);
                return Err(AppError::Upstream(failure.to_string()));
            }
        };

        Ok(response.bytes_stream().map(|chunk| chunk.map_err(AppError::from)).boxed())
    }
}

/// `{api}/file/bot{token}` prefix for file downloads
pub fn file_base_url(api_base: &str, token: &str) -> String {
    format!("{}/file/bot{}", api_base.trim_end_matches('/'), token)
}

#[async_trait]
impl MediaSource for TelegramMedia {
    async fn avatar(&self, user_id: i64) -> AppResult<MediaStream> {
        let not_found = || AppError::NotFound("Avatar not found".to_string());
        let telegram_id = u64::try_from(user_id).map_err(|_| not_found())?;

        let photos = self
            .bot
            .get_user_profile_photos(UserId(telegram_id))
            .limit(1)
            .await
            .map_err(|e| {
                log::warn!("getUserProfilePhotos failed for {}: {}", user_id, e);
                not_found()
            })?;

        let file_id = photos
            .photos
            .first()
            .and_then(|sizes| sizes.first())
            .map(|size| size.file.id.clone())
            .ok_or_else(not_found)?;

        let file = self.bot.get_file(file_id).await.map_err(|e| {
            log::error!("getFile failed for avatar of {}: {}", user_id, e);
            AppError::Internal("Failed to get file info".to_string())
        })?;

        self.download(&file.path, "Failed to download avatar").await
    }

    async fn image(&self, file_id: &str) -> AppResult<MediaStream> {
        let file = self.bot.get_file(FileId(file_id.to_string())).await.map_err(|e| {
            log::warn!("getFile failed for image {}: {}", file_id, e);
            AppError::NotFound("Image not found".to_string())
        })?;

        self.download(&file.path, "Failed to download image").await
    }
}
