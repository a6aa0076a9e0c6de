//! Operator notifications for new orders
//!
//! Delivery is best-effort: the order is already committed when the
//! notification is sent, a failed send is logged and never retried.

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::error::AppResult;
use crate::core::types::format_eur;
use crate::storage::orders::OrderIn;

/// Sink that tells an operator about a freshly placed order.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn notify(&self, order_id: i64, order: &OrderIn) -> AppResult<()>;
}

/// Used when no operator chat is configured.
pub struct NoopNotifier;

#[async_trait]
impl OrderNotifier for NoopNotifier {
    async fn notify(&self, order_id: i64, _order: &OrderIn) -> AppResult<()> {
        log::debug!("Order {}: operator notifications disabled", order_id);
        Ok(())
    }
}

/// Sends the notification on a background task.
///
/// The caller never waits for delivery; failures end up in the log at warn
/// level and leave the stored order untouched.
pub fn dispatch_order_notification(
    notifier: Arc<dyn OrderNotifier>,
    order_id: i64,
    order: OrderIn,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(order_id, &order).await {
            log::warn!("Failed to notify operator about order {}: {}", order_id, e);
        }
    })
}

/// Escapes text for Telegram HTML parse mode
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Renders the order summary sent to the operator chat (HTML parse mode).
pub fn format_order_message(order: &OrderIn) -> String {
    let items = order
        .items
        .iter()
        .map(|item| {
            format!(
                "- {} x{} = {}",
                escape_html(&item.name),
                item.quantity,
                format_eur(item.price.saturating_mul(item.quantity))
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<b>New order!</b>\n\
         Name: {}\n\
         Phone: {}\n\
         Country: {}\n\
         City: {}\n\
         Address: {}\n\
         Postal Code: {}\n\
         Items:\n{}\n\
         Total: {}",
        escape_html(&order.name),
        escape_html(&order.phone),
        escape_html(&order.country),
        escape_html(&order.city),
        escape_html(&order.address),
        escape_html(&order.postcode),
        items,
        format_eur(order.total)
    )
}
