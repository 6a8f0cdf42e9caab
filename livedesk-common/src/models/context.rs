use serde::{Deserialize, Serialize};

/// Where the back button of a rendered view should lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackTarget {
    pub title: String,
    pub payload: String,
}

/// UI state anchored to one outbound message id.
///
/// The transport cannot hold state, so everything a later button press needs
/// (where "back" goes, which visitor a card shows, how far the transcript is
/// scrolled) lives here. A `put` always replaces the whole record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<BackTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_offset: Option<usize>,
}

impl MessageContext {
    pub fn with_back(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            back: Some(BackTarget {
                title: title.into(),
                payload: payload.into(),
            }),
            ..Default::default()
        }
    }

    pub fn for_visitor(visitor_id: &str, transcript_offset: usize) -> Self {
        Self {
            visitor_id: Some(visitor_id.to_string()),
            transcript_offset: Some(transcript_offset),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.back.is_none() && self.visitor_id.is_none() && self.transcript_offset.is_none()
    }
}
