use serde::{Deserialize, Serialize};

use crate::models::context::MessageContext;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub title: String,
    pub payload: String,
}

impl Button {
    pub fn new(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            payload: payload.into(),
        }
    }
}

/// Platform-neutral message handed to a transport adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutboundView {
    pub text: String,
    /// Rows of buttons, already laid out.
    pub buttons: Vec<Vec<Button>>,
    /// Set when the view edits an existing message instead of posting a new one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_chat_id: Option<String>,
    /// Context to register for the message this view ends up in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
}

impl OutboundView {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<Button>>) -> Self {
        self.buttons = rows;
        self
    }

    pub fn push_row(&mut self, row: Vec<Button>) {
        if !row.is_empty() {
            self.buttons.push(row);
        }
    }

    pub fn editing(mut self, message_id: Option<String>) -> Self {
        self.target_message_id = message_id;
        self
    }

    pub fn in_chat(mut self, chat_id: impl Into<String>) -> Self {
        self.target_chat_id = Some(chat_id.into());
        self
    }

    pub fn is_edit(&self) -> bool {
        self.target_message_id.is_some()
    }

    pub fn all_buttons(&self) -> impl Iterator<Item = &Button> {
        self.buttons.iter().flatten()
    }
}
