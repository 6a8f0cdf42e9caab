// File: livedesk-common/src/models/mod.rs
pub mod visitor;
pub mod context;
pub mod stats;
pub mod view;
pub mod action;

pub use visitor::{
    EventInput, LedgerUpdate, LifecycleStage, SenderType, SessionWindow, TranscriptMessage,
    VisitorEvent, VisitorFilter, VisitorRecord, VisitorSession,
};
pub use context::{BackTarget, MessageContext};
pub use stats::{Snapshot, SnapshotDiff};
pub use view::{Button, OutboundView};
pub use action::{ActionInvocation, ActionMetadata, WidgetEvent};
