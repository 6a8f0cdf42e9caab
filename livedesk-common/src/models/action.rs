use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::visitor::{EventInput, LedgerUpdate, SenderType, TranscriptMessage};

/// Who triggered an admin action and on which message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionMetadata {
    pub sender_id: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Message whose button was pressed.
    #[serde(default)]
    pub callback_message_id: Option<String>,
    /// Message the admin replied to with free text.
    #[serde(default)]
    pub reply_to_message_id: Option<String>,
}

/// One inbound action from the dialogue engine: an intent plus its entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionInvocation {
    pub intent: String,
    #[serde(default)]
    pub entities: Map<String, Value>,
    #[serde(default)]
    pub metadata: ActionMetadata,
}

impl ActionInvocation {
    pub fn new(intent: &str, entities: Map<String, Value>, metadata: ActionMetadata) -> Self {
        Self {
            intent: intent.to_string(),
            entities,
            metadata,
        }
    }
}

/// Payload posted by the hosted widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetEvent {
    pub visitor_id: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub online: Option<bool>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub event: Option<EventInput>,
    /// Free text typed by the visitor.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<Map<String, Value>>,
}

impl WidgetEvent {
    pub fn into_update(self, now: chrono::DateTime<chrono::Utc>) -> (String, LedgerUpdate) {
        let update = LedgerUpdate {
            user_metadata: self.user_metadata,
            message: self
                .message
                .map(|text| TranscriptMessage::new(SenderType::User, &text, now)),
            event: self.event,
            enabled: self.enabled,
            online: self.online,
            visible: self.visible,
        };
        (self.visitor_id, update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_widget_event_maps_one_to_one() {
        let event: WidgetEvent = serde_json::from_value(json!({
            "visitor_id": "abc",
            "online": true,
            "visible": false,
            "event": {"label": "/pricing"},
            "message": "hello",
            "user_metadata": {"location_data": {"city": "Pune"}}
        }))
        .unwrap();

        let (id, update) = event.into_update(Utc::now());
        assert_eq!(id, "abc");
        assert_eq!(update.online, Some(true));
        assert_eq!(update.visible, Some(false));
        assert_eq!(update.enabled, None);
        assert_eq!(update.event.unwrap().label, "/pricing");
        let msg = update.message.unwrap();
        assert_eq!(msg.sender_type, SenderType::User);
        assert_eq!(msg.text, "hello");
        assert!(update.user_metadata.unwrap().contains_key("location_data"));
    }
}
