//! Inline keyboards of the menu message

use strum::IntoEnumIterator;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, WebAppInfo};

use shopcore::config;
use shopcore::core::types::Gender;
use shopcore::storage::catalog::{CategorySummary, Product};

use super::captions::product_button_label;
use crate::wizard::{WizardAction, WizardCallback};

/// Telegram rejects callback data longer than this
pub const MAX_CALLBACK_DATA_LEN: usize = 64;

fn callback_button(text: impl Into<String>, callback: &WizardCallback) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, callback.data())
}

fn cancel_row() -> Vec<InlineKeyboardButton> {
    vec![callback_button("✖️ Cancel", &WizardCallback::Cancel)]
}

/// Main menu: the storefront Web App for everyone, catalog editing for operators
pub fn main_menu(is_admin: bool) -> InlineKeyboardMarkup {
    main_menu_with_url(&config::WEB_APP_URL, is_admin)
}

pub fn main_menu_with_url(web_app_url: &str, is_admin: bool) -> InlineKeyboardMarkup {
    let mut rows = Vec::new();

    match url::Url::parse(web_app_url) {
        Ok(url) => rows.push(vec![InlineKeyboardButton::web_app("Open ✨", WebAppInfo { url })]),
        Err(e) => log::warn!("WEB_APP_URL is not a valid URL ({}), hiding the store button", e),
    }

    if is_admin {
        rows.push(vec![
            InlineKeyboardButton::callback("Add item", WizardAction::Add.callback_data()),
            InlineKeyboardButton::callback("Delete item", WizardAction::Delete.callback_data()),
        ]);
    }

    InlineKeyboardMarkup::new(rows)
}

pub fn gender_choice() -> InlineKeyboardMarkup {
    let genders: Vec<InlineKeyboardButton> = Gender::iter()
        .map(|gender| callback_button(gender.label(), &WizardCallback::Gender(gender)))
        .collect();

    InlineKeyboardMarkup::new(vec![genders, cancel_row()])
}

/// Existing categories, two per row. Names too long for callback data are
/// left out; the operator can still type them.
pub fn category_choice(categories: &[CategorySummary]) -> InlineKeyboardMarkup {
    let buttons: Vec<InlineKeyboardButton> = categories
        .iter()
        .filter_map(|category| {
            let callback = WizardCallback::Category(category.name.clone());
            if callback.data().len() > MAX_CALLBACK_DATA_LEN {
                log::debug!("Category '{}' does not fit in callback data", category.name);
                return None;
            }
            Some(callback_button(category.name.clone(), &callback))
        })
        .collect();

    let mut rows: Vec<Vec<InlineKeyboardButton>> = buttons.chunks(2).map(|chunk| chunk.to_vec()).collect();
    rows.push(cancel_row());
    InlineKeyboardMarkup::new(rows)
}

/// One product per row
pub fn product_choice(products: &[Product]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = products
        .iter()
        .map(|product| {
            vec![callback_button(
                product_button_label(&product.name, &product.category, product.price),
                &WizardCallback::Product(product.id),
            )]
        })
        .collect();
    rows.push(cancel_row());
    InlineKeyboardMarkup::new(rows)
}

pub fn confirmation() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            callback_button("Allow", &WizardCallback::Allow),
            callback_button("Deny", &WizardCallback::Deny),
        ],
        cancel_row(),
    ])
}

/// Only a cancel button, for the free-text and photo steps
pub fn cancel_only() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![cancel_row()])
}
