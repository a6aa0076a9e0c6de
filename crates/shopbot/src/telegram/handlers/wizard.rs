//! Telegram glue around the wizard state machine
//!
//! Every event loads the user's session, runs one transition, stores the
//! result and then renders it on the menu message.

use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{
    FileId, InlineKeyboardMarkup, InputFile, InputMedia, InputMediaPhoto, Message, MessageId, ParseMode,
};
use teloxide::{ApiError, RequestError};

use super::types::{HandlerDeps, HandlerError};
use crate::telegram::admin::is_admin;
use crate::telegram::captions::{prompt_caption, MENU_CAPTION};
use crate::telegram::keyboards;
use crate::wizard::{
    advance, finish, Prompt, Session, Transition, WizardAction, WizardCallback, WizardEffect, WizardInput, WizardStep,
};
use shopcore::config;

/// The message the wizard edits in place
#[derive(Debug, Clone, Copy)]
struct MenuMessage {
    chat_id: ChatId,
    message_id: MessageId,
    /// Sent as plain text when the logo was missing
    text_only: bool,
}

/// Which Bot API edit a menu update needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuEdit {
    Text,
    Caption,
    Photo,
}

/// Text menus can only be edited as text; the confirm preview swaps in the product photo.
fn prompt_edit(text_only: bool, prompt: &Prompt) -> MenuEdit {
    match (text_only, prompt) {
        (true, _) => MenuEdit::Text,
        (false, Prompt::Confirm(_)) => MenuEdit::Photo,
        (false, _) => MenuEdit::Caption,
    }
}

/// Putting the logo back needs the file on disk; without it the current picture stays.
fn restore_edit(text_only: bool, replace_media: bool, logo_available: bool) -> MenuEdit {
    match (text_only, replace_media, logo_available) {
        (true, _, _) => MenuEdit::Text,
        (false, true, true) => MenuEdit::Photo,
        (false, _, _) => MenuEdit::Caption,
    }
}

/// True when the menu message behind a button press has no picture
fn callback_on_text_menu(q: &CallbackQuery) -> bool {
    q.message
        .as_ref()
        .and_then(|m| m.regular_message())
        .is_some_and(|m| m.photo().is_none())
}

/// Maps a chat message onto wizard input. Photos win over captions.
pub fn message_input(msg: &Message) -> WizardInput {
    if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
        return WizardInput::Photo(photo.file.id.0.clone());
    }
    match msg.text() {
        Some(text) => WizardInput::Text(text.to_string()),
        None => WizardInput::Other,
    }
}

/// Editing a message to identical content is not an error for us
fn allow_not_modified<T>(result: Result<T, RequestError>) -> Result<(), RequestError> {
    match result {
        Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
        Err(e) => Err(e),
    }
}

pub(super) async fn handle_wizard_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(user_id) = msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok()) else {
        return Ok(());
    };
    // Outside the wizard chat messages are not ours to handle
    let Some(session) = deps.sessions.get(user_id).await else {
        return Ok(());
    };

    let input = message_input(msg);
    let was_confirming = session.step == WizardStep::Confirm;
    let menu = MenuMessage {
        chat_id: msg.chat.id,
        message_id: MessageId(session.message_id),
        text_only: session.text_menu,
    };
    if session.step == WizardStep::Photo && !matches!(input, WizardInput::Photo(_)) {
        log::debug!("User {} sent a non-photo message at the photo step", user_id);
    }

    let transition = advance(session, input);

    // The menu message is the only thing the wizard shows; consumed input goes away
    if let Err(e) = bot.delete_message(msg.chat.id, msg.id).await {
        log::debug!("Failed to delete wizard input message {}: {}", msg.id.0, e);
    }

    apply_transition(bot, menu, user_id, transition, None, was_confirming, deps).await
}

pub(super) async fn handle_wizard_callback(bot: &Bot, q: &CallbackQuery, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = q.message.as_ref().map(|m| m.chat().id);
    let message_id = q.message.as_ref().map(|m| m.id());
    let (Some(data), Some(chat_id), Some(message_id)) = (q.data.as_deref(), chat_id, message_id) else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };
    let user_id = i64::try_from(q.from.id.0).unwrap_or(0);
    let pressed_on = MenuMessage {
        chat_id,
        message_id,
        text_only: callback_on_text_menu(q),
    };

    if let Some(action) = WizardAction::from_callback(data) {
        if !is_admin(user_id) {
            log::warn!("User {} pressed {} without operator rights", user_id, data);
            bot.answer_callback_query(q.id.clone()).await?;
            return Ok(());
        }

        log::info!("User {} started the {:?} wizard", user_id, action);
        let session = Session::start(action, message_id.0).with_text_menu(pressed_on.text_only);
        deps.sessions.set(user_id, session).await;
        bot.answer_callback_query(q.id.clone()).await?;
        render_prompt(bot, pressed_on, &Prompt::Gender, deps).await?;
        return Ok(());
    }

    let Some(callback) = WizardCallback::parse(data) else {
        log::debug!("Unknown callback data '{}' from user {}", data, user_id);
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let session = match deps.sessions.get(user_id).await {
        Some(session) if is_admin(user_id) => session,
        _ => {
            // Keyboard of an expired or foreign session
            deps.sessions.clear(user_id).await;
            bot.answer_callback_query(q.id.clone()).text("This menu has expired").await?;
            restore_menu(bot, pressed_on, user_id, true).await?;
            return Ok(());
        }
    };

    let was_confirming = session.step == WizardStep::Confirm;
    let menu = MenuMessage {
        chat_id,
        message_id: MessageId(session.message_id),
        text_only: session.text_menu,
    };
    let transition = advance(session, WizardInput::Callback(callback));

    apply_transition(bot, menu, user_id, transition, Some(q), was_confirming, deps).await
}

async fn apply_transition(
    bot: &Bot,
    menu: MenuMessage,
    user_id: i64,
    transition: Transition,
    callback: Option<&CallbackQuery>,
    was_confirming: bool,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    let Transition { session, effect } = transition;
    deps.sessions.store(user_id, session).await;

    match finish(&effect, deps.catalog.as_ref(), deps.photos.as_ref()).await {
        Some(outcome) => {
            log::info!("Wizard of user {} finished: {:?}", user_id, outcome);
            if let Some(q) = callback {
                bot.answer_callback_query(q.id.clone()).text(outcome.answer_text()).await?;
            }
            restore_menu(bot, menu, user_id, was_confirming).await?;
        }
        None => {
            if let Some(q) = callback {
                bot.answer_callback_query(q.id.clone()).await?;
            }
            if let WizardEffect::Render(prompt) = &effect {
                render_prompt(bot, menu, prompt, deps).await?;
            }
        }
    }

    Ok(())
}

/// Applies `caption` and `markup` to the menu message with the given edit
async fn edit_menu(
    bot: &Bot,
    menu: MenuMessage,
    edit: MenuEdit,
    photo: InputFile,
    caption: String,
    markup: InlineKeyboardMarkup,
) -> Result<(), RequestError> {
    let result = match edit {
        MenuEdit::Text => bot
            .edit_message_text(menu.chat_id, menu.message_id, caption)
            .parse_mode(ParseMode::Html)
            .reply_markup(markup)
            .await
            .map(drop),
        MenuEdit::Caption => bot
            .edit_message_caption(menu.chat_id, menu.message_id)
            .caption(caption)
            .parse_mode(ParseMode::Html)
            .reply_markup(markup)
            .await
            .map(drop),
        MenuEdit::Photo => {
            let media = InputMedia::Photo(InputMediaPhoto::new(photo).caption(caption).parse_mode(ParseMode::Html));
            bot.edit_message_media(menu.chat_id, menu.message_id, media)
                .reply_markup(markup)
                .await
                .map(drop)
        }
    };
    allow_not_modified(result)
}

async fn render_prompt(bot: &Bot, menu: MenuMessage, prompt: &Prompt, deps: &HandlerDeps) -> Result<(), RequestError> {
    let markup = match prompt {
        Prompt::Gender => keyboards::gender_choice(),
        Prompt::Category => {
            let categories = deps.catalog.categories(None).await.unwrap_or_else(|e| {
                log::warn!("Failed to load categories for the wizard: {}", e);
                Vec::new()
            });
            keyboards::category_choice(&categories)
        }
        Prompt::ProductList { gender } => {
            let products = deps.catalog.products(*gender).await.unwrap_or_else(|e| {
                log::warn!("Failed to load {} products for the wizard: {}", gender, e);
                Vec::new()
            });
            keyboards::product_choice(&products)
        }
        Prompt::Confirm(_) => keyboards::confirmation(),
        Prompt::Title | Prompt::Photo | Prompt::Price { .. } => keyboards::cancel_only(),
    };

    // The preview shows the uploaded product photo when the menu can hold one
    let photo = match prompt {
        Prompt::Confirm(draft) => InputFile::file_id(FileId(draft.photo_file_id.clone())),
        _ => InputFile::file(config::LOGO_PATH.as_str()),
    };

    edit_menu(bot, menu, prompt_edit(menu.text_only, prompt), photo, prompt_caption(prompt), markup).await
}

/// Puts the menu message back into its main menu state
async fn restore_menu(bot: &Bot, menu: MenuMessage, user_id: i64, replace_media: bool) -> Result<(), RequestError> {
    let logo_path = config::LOGO_PATH.as_str();
    let logo_available = Path::new(logo_path).exists();
    if replace_media && !menu.text_only && !logo_available {
        log::warn!("Logo {} not found, the menu keeps its current picture", logo_path);
    }

    let edit = restore_edit(menu.text_only, replace_media, logo_available);
    let markup = keyboards::main_menu(is_admin(user_id));
    edit_menu(bot, menu, edit, InputFile::file(logo_path), MENU_CAPTION.to_string(), markup).await
}
