use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::FileId;

use shopcore::{config, AppResult};

use crate::wizard::PhotoResolver;

/// Confirms an uploaded photo with `getFile` and builds the reference stored
/// with the product: a `/images/{file_id}` URL on the public API when
/// PUBLIC_API_URL is set, the bare file id otherwise.
pub struct TelegramPhotoResolver {
    bot: Bot,
    public_url: Option<String>,
}

impl TelegramPhotoResolver {
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            public_url: config::api::PUBLIC_URL.clone(),
        }
    }
}

pub fn image_reference(public_url: Option<&str>, file_id: &str) -> String {
    match public_url {
        Some(base) => format!("{}/images/{}", base.trim_end_matches('/'), file_id),
        None => file_id.to_string(),
    }
}

#[async_trait]
impl PhotoResolver for TelegramPhotoResolver {
    async fn resolve(&self, file_id: &str) -> AppResult<String> {
        let file = self.bot.get_file(FileId(file_id.to_string())).await?;
        log::debug!("Photo {} stored at {}", file_id, file.path);
        Ok(image_reference(self.public_url.as_deref(), file_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_reference() {
        assert_eq!(
            image_reference(Some("https://shop.example.com/api/"), "AgAC"),
            "https://shop.example.com/api/images/AgAC"
        );
        assert_eq!(image_reference(None, "AgAC"), "AgAC");
    }
}
