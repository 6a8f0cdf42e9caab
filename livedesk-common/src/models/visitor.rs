use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub const DEFAULT_LIFECYCLE_STAGE: &str = "subscriber";

/// Label of the synthetic event appended whenever `enabled` is set.
pub const ENABLE_LIVECHAT_LABEL: &str = "enable_livechat";

/// Label the widget reports when it is opened or closed.
pub const WIDGET_VISIBLE_LABEL: &str = "/livechat_visible";

/// Coarse visitor classification stored under `user_metadata.lifecycle_stage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStage {
    #[default]
    Subscriber,
    Lead,
    Unqualified,
}

impl LifecycleStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStage::Subscriber => "subscriber",
            LifecycleStage::Lead => "lead",
            LifecycleStage::Unqualified => "unqualified",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "subscriber" => Some(LifecycleStage::Subscriber),
            "lead" => Some(LifecycleStage::Lead),
            "unqualified" => Some(LifecycleStage::Unqualified),
            _ => None,
        }
    }
}

/// One contiguous online period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitorSession {
    pub index: usize,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_ts: DateTime<Utc>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_ts: Option<DateTime<Utc>>,
    /// Seconds between start and end; unset while the session is open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ts: Option<f64>,
}

impl VisitorSession {
    pub fn open(index: usize, now: DateTime<Utc>) -> Self {
        Self {
            index,
            start_ts: now,
            end_ts: None,
            duration_ts: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_ts.is_none()
    }

    pub fn close(&mut self, now: DateTime<Utc>) {
        let duration = now.signed_duration_since(self.start_ts).num_milliseconds() as f64 / 1000.0;
        self.end_ts = Some(now);
        self.duration_ts = Some(duration.max(0.0));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    User,
    Admin,
}

impl SenderType {
    pub fn label(&self) -> &'static str {
        match self {
            SenderType::User => "User",
            SenderType::Admin => "Admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub id: Uuid,
    pub sender_type: SenderType,
    pub text: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub sent_ts: DateTime<Utc>,
}

impl TranscriptMessage {
    pub fn new(sender_type: SenderType, text: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_type,
            text: text.to_string(),
            sent_ts: now,
        }
    }
}

/// Behavioral event as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitorEvent {
    pub category: String,
    pub action: String,
    pub label: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Index of the session that was current when the event was appended.
    pub session_index: usize,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ts: DateTime<Utc>,
}

impl VisitorEvent {
    pub fn enable_livechat(enabled: bool, session_index: usize, now: DateTime<Utc>) -> Self {
        Self {
            category: "user".to_string(),
            action: "update_livechat".to_string(),
            label: ENABLE_LIVECHAT_LABEL.to_string(),
            value: Value::Bool(enabled),
            metadata: None,
            session_index,
            ts: now,
        }
    }
}

/// Event as reported by the widget, before it is tagged with a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventInput {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub action: String,
    pub label: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl EventInput {
    pub fn labelled(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }

    pub fn into_event(self, session_index: usize, now: DateTime<Utc>) -> VisitorEvent {
        VisitorEvent {
            category: self.category,
            action: self.action,
            label: self.label,
            value: self.value,
            metadata: self.metadata,
            session_index,
            ts: now,
        }
    }
}

/// The requested changes for a single `update` call.
#[derive(Debug, Clone, Default)]
pub struct LedgerUpdate {
    pub user_metadata: Option<Map<String, Value>>,
    pub message: Option<TranscriptMessage>,
    pub event: Option<EventInput>,
    pub enabled: Option<bool>,
    pub online: Option<bool>,
    pub visible: Option<bool>,
}

impl LedgerUpdate {
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.user_metadata = Some(metadata);
        self
    }

    pub fn with_message(mut self, message: TranscriptMessage) -> Self {
        self.message = Some(message);
        self
    }

    pub fn with_event(mut self, event: EventInput) -> Self {
        self.event = Some(event);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn with_online(mut self, online: bool) -> Self {
        self.online = Some(online);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.user_metadata.is_none()
            && self.message.is_none()
            && self.event.is_none()
            && self.enabled.is_none()
            && self.online.is_none()
            && self.visible.is_none()
    }
}

/// The authoritative per-visitor record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitorRecord {
    pub visitor_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub enabled: bool,
    pub online: bool,
    pub visible: bool,
    pub user_metadata: Map<String, Value>,
    pub sessions: Vec<VisitorSession>,
    pub messages: Vec<TranscriptMessage>,
    pub events: Vec<VisitorEvent>,
    /// Bumped on every persisted write; used for compare-and-swap.
    pub version: i64,
}

impl VisitorRecord {
    pub fn new(visitor_id: &str, display_name: &str, now: DateTime<Utc>) -> Self {
        let mut user_metadata = Map::new();
        user_metadata.insert("user_name".into(), Value::String(display_name.to_string()));
        user_metadata.insert(
            "lifecycle_stage".into(),
            Value::String(DEFAULT_LIFECYCLE_STAGE.to_string()),
        );

        Self {
            visitor_id: visitor_id.to_string(),
            created_at: now,
            updated_at: now,
            enabled: false,
            online: false,
            visible: false,
            user_metadata,
            sessions: Vec::new(),
            messages: Vec::new(),
            events: Vec::new(),
            version: 0,
        }
    }

    pub fn display_name(&self) -> &str {
        self.metadata_str(&["user_name"]).unwrap_or(&self.visitor_id)
    }

    pub fn lifecycle_stage(&self) -> LifecycleStage {
        self.metadata_str(&["lifecycle_stage"])
            .and_then(LifecycleStage::parse)
            .unwrap_or_default()
    }

    /// Walks nested metadata objects, e.g. `["location_data", "city"]`.
    pub fn metadata_str(&self, path: &[&str]) -> Option<&str> {
        let (first, rest) = path.split_first()?;
        let mut current = self.user_metadata.get(*first)?;
        for key in rest {
            current = current.as_object()?.get(*key)?;
        }
        current.as_str()
    }

    pub fn open_session(&self) -> Option<&VisitorSession> {
        self.sessions.iter().rev().find(|s| s.is_open())
    }

    /// Stored index of the latest session, or 0 before the first one.
    pub fn current_session_index(&self) -> usize {
        self.sessions.last().map(|s| s.index).unwrap_or(0)
    }

    fn close_open_session(&mut self, now: DateTime<Utc>) {
        if let Some(session) = self.sessions.iter_mut().rev().find(|s| s.is_open()) {
            session.close(now);
        }
    }

    /// Applies one ledger update in place. Returns false when nothing changed.
    pub fn apply(&mut self, update: LedgerUpdate, now: DateTime<Utc>) -> bool {
        let mut touched = false;

        if let Some(online) = update.online {
            if online && self.open_session().is_some() {
                // repeated online ping: the running session continues
                touched |= !self.online;
            } else {
                self.close_open_session(now);
                if online {
                    let index = self.sessions.len();
                    self.sessions.push(VisitorSession::open(index, now));
                }
                touched = true;
            }
            self.online = online;
        }

        let session_index = self.current_session_index();

        if let Some(message) = update.message {
            self.messages.push(message);
            touched = true;
        }

        if let Some(event) = update.event {
            self.events.push(event.into_event(session_index, now));
            touched = true;
        }

        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
            self.events
                .push(VisitorEvent::enable_livechat(enabled, session_index, now));
            touched = true;
        }

        if let Some(visible) = update.visible {
            self.visible = visible;
            touched = true;
        }

        if let Some(metadata) = update.user_metadata {
            for (key, value) in metadata {
                self.user_metadata.insert(key, value);
            }
            touched = true;
        }

        if touched {
            self.updated_at = now;
        }
        touched
    }
}

/// Half-open `[from, to)` window; either bound may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl SessionWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_bounded(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| ts >= from) && self.to.is_none_or(|to| ts < to)
    }

    /// The immediately preceding window of identical length.
    pub fn previous(&self) -> Option<Self> {
        let (from, to) = (self.from?, self.to?);
        let length = to - from;
        Some(Self::new(from - length, from))
    }
}

#[derive(Debug, Clone, Default)]
pub struct VisitorFilter {
    pub enabled: Option<bool>,
    pub online: Option<bool>,
    pub visible: Option<bool>,
    pub lifecycle_stage: Option<LifecycleStage>,
    pub session_window: Option<SessionWindow>,
}

impl VisitorFilter {
    pub fn online() -> Self {
        Self {
            online: Some(true),
            ..Default::default()
        }
    }

    pub fn matches(&self, record: &VisitorRecord) -> bool {
        if self.enabled.is_some_and(|v| v != record.enabled) {
            return false;
        }
        if self.online.is_some_and(|v| v != record.online) {
            return false;
        }
        if self.visible.is_some_and(|v| v != record.visible) {
            return false;
        }
        if self
            .lifecycle_stage
            .is_some_and(|stage| stage != record.lifecycle_stage())
        {
            return false;
        }
        if let Some(window) = self.session_window.filter(|w| w.is_bounded()) {
            return record.sessions.iter().any(|s| window.contains(s.start_ts));
        }
        true
    }
}
