//! Command handler implementations (/start)

use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{InputFile, Message, ParseMode};

use super::types::{HandlerDeps, HandlerError};
use crate::telegram::admin::is_admin;
use crate::telegram::captions::WELCOME_CAPTION;
use crate::telegram::keyboards::main_menu;
use shopcore::config;

/// Handle /start command
///
/// Sends the logo with the welcome caption and the main menu. The wizard
/// later edits this message in place, so any open session is dropped here.
pub(super) async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user_id = msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok()).unwrap_or(0);

    if deps.sessions.clear(user_id).await.is_some() {
        log::info!("User {} restarted, wizard session dropped", user_id);
    }

    let menu = main_menu(is_admin(user_id));
    let logo_path = config::LOGO_PATH.as_str();

    if Path::new(logo_path).exists() {
        bot.send_photo(msg.chat.id, InputFile::file(logo_path))
            .caption(WELCOME_CAPTION)
            .parse_mode(ParseMode::Html)
            .reply_markup(menu)
            .await?;
    } else {
        log::warn!("Logo {} not found, sending the menu as text", logo_path);
        bot.send_message(msg.chat.id, WELCOME_CAPTION)
            .parse_mode(ParseMode::Html)
            .reply_markup(menu)
            .await?;
    }

    Ok(())
}
