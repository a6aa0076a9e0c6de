//! Texts shown on the menu message (HTML parse mode)

use shopcore::core::types::format_eur;
use shopcore::notifications::escape_html;

use crate::wizard::{CompletedDraft, Prompt};

/// Caption of the /start message
pub const WELCOME_CAPTION: &str = "✨ <b>Welcome to our store!</b>\n\n\
    Here you will find your favorite brands at a price 4-5 times lower than on official websites.\n\n\
    🔂We work directly with original factories - no intermediaries and markups.\n\n\
    🔂We will deliver the goods to anywhere in the world for free.\n\n\
    🔂If you want, we will help you choose a model personally for you!";

/// Caption restored on the menu message when the wizard ends
pub const MENU_CAPTION: &str = "✨ <b>Welcome to our store!</b>\n\n\
    Here you will find your favorite brands at prices 4–5 times lower than on official websites.";

pub fn prompt_caption(prompt: &Prompt) -> String {
    match prompt {
        Prompt::Gender => "🧍 Choose gender:".to_string(),
        Prompt::Category => "📂 Select or enter a category:".to_string(),
        Prompt::Title => "📝 Enter item title:".to_string(),
        Prompt::Photo => "📸 Send a product photo:".to_string(),
        Prompt::Price { invalid: false } => "💶 Enter item price in EUR:".to_string(),
        Prompt::Price { invalid: true } => {
            "⚠️ The price must be a whole number greater than zero, e.g. <code>120</code>.\n\n💶 Enter item price in EUR:"
                .to_string()
        }
        Prompt::Confirm(draft) => preview_caption(draft),
        Prompt::ProductList { .. } => "📦 Select product to delete:".to_string(),
    }
}

pub fn preview_caption(draft: &CompletedDraft) -> String {
    format!(
        "📦 <b>Item Preview:</b>\n\n\
         📁 Category: <b>{}</b>\n\
         📝 Title: <b>{}</b>\n\
         💶 Price: <b>{} EUR</b>\n\
         🧍 Gender: <b>{}</b>\n\n\
         ✅ Confirm to proceed or ❌ cancel.",
        escape_html(&draft.category),
        escape_html(&draft.title),
        draft.price,
        draft.gender.label()
    )
}

/// Label of a product button in the delete list
pub fn product_button_label(name: &str, category: &str, price: i64) -> String {
    format!("{} · {} · {}", name, category, format_eur(price))
}
