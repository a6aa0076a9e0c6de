//! Telegram integration
//!
//! Bot construction, keyboards and captions, the dispatcher schema, and the
//! Telegram-backed implementations of the notifier, media source and photo
//! resolver.

pub mod admin;
pub mod bot;
pub mod captions;
pub mod handlers;
pub mod keyboards;
pub mod media;
pub mod notifications;
pub mod photos;

pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use media::TelegramMedia;
pub use notifications::TelegramOrderNotifier;
pub use photos::TelegramPhotoResolver;
