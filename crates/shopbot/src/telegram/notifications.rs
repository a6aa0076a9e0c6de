use async_trait::async_trait;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use shopcore::notifications::{format_order_message, NoopNotifier, OrderNotifier};
use shopcore::storage::orders::OrderIn;
use shopcore::{config, AppResult};

/// Posts new orders to the operator chat.
pub struct TelegramOrderNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramOrderNotifier {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl OrderNotifier for TelegramOrderNotifier {
    async fn notify(&self, order_id: i64, order: &OrderIn) -> AppResult<()> {
        self.bot
            .send_message(self.chat_id, format_order_message(order))
            .parse_mode(ParseMode::Html)
            .await?;
        log::info!("Order {} sent to operator chat {}", order_id, self.chat_id);
        Ok(())
    }
}

/// Telegram notifier when ADMIN_CHAT_ID is set, no-op otherwise.
pub fn order_notifier(bot: Option<Bot>) -> Arc<dyn OrderNotifier> {
    match (bot, *config::admin::ADMIN_CHAT_ID) {
        (Some(bot), chat_id) if chat_id != 0 => Arc::new(TelegramOrderNotifier::new(bot, ChatId(chat_id))),
        _ => Arc::new(NoopNotifier),
    }
}
