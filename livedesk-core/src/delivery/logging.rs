use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use livedesk_common::models::OutboundView;

use crate::Error;
use crate::delivery::{Transport, VisitorNotifier};

/// Stand-in for both outbound directions when no adapter is configured.
/// New messages get a fresh uuid as id.
#[derive(Default)]
pub struct LoggingTransport;

#[async_trait]
impl Transport for LoggingTransport {
    async fn deliver(&self, view: &OutboundView) -> Result<Option<String>, Error> {
        let message_id = match &view.target_message_id {
            Some(id) => id.clone(),
            None => Uuid::new_v4().to_string(),
        };
        info!(
            message_id = %message_id,
            chat_id = ?view.target_chat_id,
            edit = view.is_edit(),
            buttons = view.all_buttons().count(),
            "outbound view:\n{}",
            view.text
        );
        Ok(Some(message_id))
    }
}

#[async_trait]
impl VisitorNotifier for LoggingTransport {
    async fn notify(&self, visitor_id: &str, text: &str) -> Result<(), Error> {
        info!(visitor_id = %visitor_id, "message for visitor: {}", text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_edit_keeps_message_id() {
        let view = OutboundView::text("hi").editing(Some("77".into()));
        let id = LoggingTransport.deliver(&view).await.unwrap();
        assert_eq!(id.as_deref(), Some("77"));

        let fresh = LoggingTransport.deliver(&OutboundView::text("hi")).await.unwrap();
        assert!(fresh.is_some_and(|id| id != "77"));
    }
}
