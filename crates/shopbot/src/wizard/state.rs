//! Add/delete item state machine
//!
//! `advance` is pure: it takes the current session and one user input and
//! returns the next session (or `None` when the wizard is over) together with
//! the effect the Telegram layer must render or execute.

use shopcore::core::types::Gender;
use std::str::FromStr;

/// What the operator started the wizard for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardAction {
    Add,
    Delete,
}

impl WizardAction {
    pub fn callback_data(&self) -> &'static str {
        match self {
            WizardAction::Add => "menu:add_item",
            WizardAction::Delete => "menu:delete_item",
        }
    }

    /// Parses a main menu button press
    pub fn from_callback(data: &str) -> Option<Self> {
        match data {
            "menu:add_item" => Some(WizardAction::Add),
            "menu:delete_item" => Some(WizardAction::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Gender,
    Category,
    Title,
    Photo,
    Price,
    Confirm,
    /// Delete path: picking the product to remove
    Product,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub gender: Option<Gender>,
    pub category: Option<String>,
    pub title: Option<String>,
    pub photo_file_id: Option<String>,
    pub price: Option<i64>,
}

/// Draft with every field filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedDraft {
    pub gender: Gender,
    pub category: String,
    pub title: String,
    pub photo_file_id: String,
    pub price: i64,
}

impl ProductDraft {
    pub fn complete(&self) -> Option<CompletedDraft> {
        Some(CompletedDraft {
            gender: self.gender?,
            category: self.category.clone()?,
            title: self.title.clone()?,
            photo_file_id: self.photo_file_id.clone()?,
            price: self.price?,
        })
    }
}

/// Per-user wizard state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub action: WizardAction,
    pub step: WizardStep,
    pub draft: ProductDraft,
    /// Menu message that is edited in place while the wizard runs
    pub message_id: i32,
    /// The menu message was sent without the logo and has no media to edit
    pub text_menu: bool,
}

impl Session {
    pub fn start(action: WizardAction, message_id: i32) -> Self {
        Self {
            action,
            step: WizardStep::Gender,
            draft: ProductDraft::default(),
            message_id,
            text_menu: false,
        }
    }

    pub fn with_text_menu(mut self, text_menu: bool) -> Self {
        self.text_menu = text_menu;
        self
    }
}

/// Inline button presses understood by the wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardCallback {
    Gender(Gender),
    Category(String),
    Product(i64),
    Allow,
    Deny,
    Cancel,
}

impl WizardCallback {
    pub fn parse(data: &str) -> Option<Self> {
        let (prefix, value) = data.split_once(':')?;
        match (prefix, value) {
            ("gender", value) => Gender::from_str(value).ok().map(WizardCallback::Gender),
            ("category", value) if !value.is_empty() => Some(WizardCallback::Category(value.to_string())),
            ("product", value) => value.parse().ok().map(WizardCallback::Product),
            ("confirm", "allow") => Some(WizardCallback::Allow),
            ("confirm", "deny") => Some(WizardCallback::Deny),
            ("wizard", "cancel") => Some(WizardCallback::Cancel),
            _ => None,
        }
    }

    pub fn data(&self) -> String {
        match self {
            WizardCallback::Gender(gender) => format!("gender:{}", gender),
            WizardCallback::Category(name) => format!("category:{}", name),
            WizardCallback::Product(id) => format!("product:{}", id),
            WizardCallback::Allow => "confirm:allow".to_string(),
            WizardCallback::Deny => "confirm:deny".to_string(),
            WizardCallback::Cancel => "wizard:cancel".to_string(),
        }
    }
}

/// One event from the operator while a session is open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardInput {
    Callback(WizardCallback),
    Text(String),
    /// File id of the largest size of an attached photo
    Photo(String),
    /// Anything else (stickers, documents, ...)
    Other,
}

/// Screen the wizard message should show next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Gender,
    Category,
    Title,
    Photo,
    Price { invalid: bool },
    Confirm(CompletedDraft),
    ProductList { gender: Gender },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEffect {
    /// Session continues, show this prompt
    Render(Prompt),
    /// Input does not fit the current step, nothing changes
    Ignored,
    /// Terminal: create the product
    Create(CompletedDraft),
    /// Terminal: delete the product with this id
    Delete(i64),
    /// Terminal: deny or cancel
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// `None` once the wizard is over
    pub session: Option<Session>,
    pub effect: WizardEffect,
}

impl Transition {
    fn render(session: Session, prompt: Prompt) -> Self {
        Self {
            session: Some(session),
            effect: WizardEffect::Render(prompt),
        }
    }

    fn ignored(session: Session) -> Self {
        Self {
            session: Some(session),
            effect: WizardEffect::Ignored,
        }
    }

    fn finished(effect: WizardEffect) -> Self {
        Self { session: None, effect }
    }
}

/// Whole euros, strictly positive
pub fn parse_price(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok().filter(|price| *price > 0)
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn advance(mut session: Session, input: WizardInput) -> Transition {
    if input == WizardInput::Callback(WizardCallback::Cancel) {
        return Transition::finished(WizardEffect::Cancelled);
    }

    match (session.step, input) {
        (WizardStep::Gender, WizardInput::Callback(WizardCallback::Gender(gender))) => {
            session.draft.gender = Some(gender);
            match session.action {
                WizardAction::Add => {
                    session.step = WizardStep::Category;
                    Transition::render(session, Prompt::Category)
                }
                WizardAction::Delete => {
                    session.step = WizardStep::Product;
                    Transition::render(session, Prompt::ProductList { gender })
                }
            }
        }
        (WizardStep::Category, WizardInput::Callback(WizardCallback::Category(name)))
        | (WizardStep::Category, WizardInput::Text(name)) => match non_empty(&name) {
            Some(category) => {
                session.draft.category = Some(category);
                session.step = WizardStep::Title;
                Transition::render(session, Prompt::Title)
            }
            None => Transition::ignored(session),
        },
        (WizardStep::Title, WizardInput::Text(text)) => match non_empty(&text) {
            Some(title) => {
                session.draft.title = Some(title);
                session.step = WizardStep::Photo;
                Transition::render(session, Prompt::Photo)
            }
            None => Transition::ignored(session),
        },
        (WizardStep::Photo, WizardInput::Photo(file_id)) => {
            session.draft.photo_file_id = Some(file_id);
            session.step = WizardStep::Price;
            Transition::render(session, Prompt::Price { invalid: false })
        }
        (WizardStep::Price, WizardInput::Text(text)) => match parse_price(&text) {
            Some(price) => {
                session.draft.price = Some(price);
                match session.draft.complete() {
                    Some(draft) => {
                        session.step = WizardStep::Confirm;
                        Transition::render(session, Prompt::Confirm(draft))
                    }
                    None => {
                        log::warn!("Wizard reached price with an incomplete draft: {:?}", session.draft);
                        Transition::finished(WizardEffect::Cancelled)
                    }
                }
            }
            None => Transition::render(session, Prompt::Price { invalid: true }),
        },
        (WizardStep::Confirm, WizardInput::Callback(WizardCallback::Allow)) => match session.draft.complete() {
            Some(draft) => Transition::finished(WizardEffect::Create(draft)),
            None => Transition::finished(WizardEffect::Cancelled),
        },
        (WizardStep::Confirm, WizardInput::Callback(WizardCallback::Deny)) => {
            Transition::finished(WizardEffect::Cancelled)
        }
        (WizardStep::Product, WizardInput::Callback(WizardCallback::Product(product_id))) => {
            Transition::finished(WizardEffect::Delete(product_id))
        }
        (step, input) => {
            log::debug!("Wizard step {:?} ignores input {:?}", step, input);
            Transition::ignored(session)
        }
    }
}
